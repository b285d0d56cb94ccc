//! Byte-count to block-order conversion and the pool size constants.

/// No block smaller than `2^SMALLEST_K` bytes is ever produced, even when a
/// request plus header would technically fit in less. Gives a 64-byte floor.
pub const SMALLEST_K: usize = 6;

/// Smallest admissible pool order.
pub const MIN_K: usize = 20;

/// Largest admissible pool order. Kept one larger than the true maximum so
/// `avail` can be indexed `0..=kval_m` without a separate off-by-one constant;
/// the usable maximum is `MAX_K - 1`.
pub const MAX_K: usize = 48;

/// Pool order used when the caller requests size `0`.
pub const DEFAULT_K: usize = 30;

/// Smallest `k` such that `2^k >= bytes`. Exact integer arithmetic, no
/// floating point. The contract is unspecified for `bytes == 0`; callers
/// reject the zero-byte case before this is ever called.
///
/// ## Parameters
///
/// - bytes `usize` The number of bytes needed
///
/// ## Returns
///
/// - k The smallest order with `2^k >= bytes`
pub fn order_of(bytes: usize) -> usize {
    let mut k = 0usize;
    while (1usize.checked_shl(k as u32).unwrap_or(usize::MAX)) < bytes {
        k += 1;
    }
    k
}

/// Clamps a requested pool size in bytes to an admissible order, defaulting
/// to [`DEFAULT_K`] when `size` is zero.
///
/// ## Parameters
///
/// - size `usize` The size of the pool in bytes requested by the caller (0 → default)
///
/// ## Returns
///
/// - k The pool order to use, clamped to `[MIN_K, MAX_K - 1]`
pub fn pool_order_of(size: usize) -> usize {
    let k = if size == 0 { DEFAULT_K } else { order_of(size) };
    k.clamp(MIN_K, MAX_K - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_of_matches_known_values() {
        assert_eq!(order_of(1), 0);
        assert_eq!(order_of(2), 1);
        assert_eq!(order_of(3), 2);
        assert_eq!(order_of(4), 2);
        assert_eq!(order_of(5), 3);
        assert_eq!(order_of(8), 3);
        assert_eq!(order_of(9), 4);
        assert_eq!(order_of(16), 4);
        assert_eq!(order_of(17), 5);
        assert_eq!(order_of(32), 5);
        assert_eq!(order_of(33), 6);
        assert_eq!(order_of(64), 6);
        assert_eq!(order_of(1024), 10);
        assert_eq!(order_of(1025), 11);
        assert_eq!(order_of(1099511627776), 40);
    }

    #[test]
    fn pool_order_defaults_on_zero() {
        assert_eq!(pool_order_of(0), DEFAULT_K);
    }

    #[test]
    fn pool_order_clamps_below_min() {
        assert_eq!(pool_order_of(1), MIN_K);
    }

    #[test]
    fn pool_order_clamps_above_max() {
        assert_eq!(pool_order_of(1usize << (MAX_K + 4)), MAX_K - 1);
    }
}
