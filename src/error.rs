//! Error type and the process-local out-of-memory compatibility shim.
//!
//! The raw C port communicates allocation failure solely through a null
//! pointer and a process-wide `errno` cell. This crate's primary channel is
//! [`BuddyError`] returned through a `Result`; the `errno`-style cell is kept
//! as a thin compatibility shim (see [`last_error`]) for callers migrating
//! from that convention, backed by a thread-local rather than a real global
//! so it cannot race across threads that each own their own pool.

use std::cell::Cell;

/// Failure modes this crate can report.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum BuddyError {
    /// The request was malformed: zero bytes, or (internally) a pointer that
    /// does not belong to the pool it was freed against.
    #[error("invalid allocation request")]
    InvalidRequest,

    /// No free block of sufficient order exists. The pool remains
    /// well-formed; a subsequent `free` may restore capacity.
    #[error("pool exhausted: no block large enough is available")]
    NoMemory,

    /// The OS refused to map the backing region for a new pool.
    #[error("failed to reserve backing memory from the OS")]
    MapFailed,

    /// The OS refused to unmap the backing region on pool destruction.
    #[error("failed to release backing memory to the OS")]
    UnmapFailed,
}

thread_local! {
    static LAST_ERROR: Cell<Option<BuddyError>> = const { Cell::new(None) };
}

/// Records `err` as the most recent error on this thread, mirroring the
/// errno-style signal described for `allocate`. Only exhaustion sets this;
/// programming errors (zero-byte requests, foreign pointers) deliberately do
/// not, matching the raw port's contract.
pub(crate) fn set_last_error(err: BuddyError) {
    LAST_ERROR.with(|cell| cell.set(Some(err)));
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|cell| cell.set(None));
}

/// Returns the last error recorded via [`set_last_error`] on this thread,
/// e.g. after an `allocate` call that returned `Err(BuddyError::NoMemory)`.
/// This is a compatibility shim for callers that prefer to probe a side
/// channel instead of matching on the `Result`; new code should just use the
/// `Result`.
pub fn last_error() -> Option<BuddyError> {
    LAST_ERROR.with(|cell| cell.get())
}
