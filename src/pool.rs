//! The allocation engine: the pool itself, and the split/coalesce state
//! machine that backs `allocate` and `free`.

use std::array;
use std::ffi::c_void;
use std::ptr;

use crate::block::{header_size, Avail, BLOCK_AVAIL, BLOCK_RESERVED, BLOCK_UNUSED};
use crate::buddy::buddy_of;
use crate::error::{self, BuddyError};
use crate::freelist;
use crate::size::{order_of, pool_order_of, MAX_K, SMALLEST_K};

/// A buddy-system memory pool managing a single `mmap`'d region.
///
/// `avail[k]` is the sentinel head of the circular doubly linked free list of
/// order-`k` blocks; `avail[kval_m]` seeds the whole region on creation.
/// `base` points at the raw backing memory obtained from the OS; every block
/// address used by the allocator is an offset from it.
pub struct BuddyPool {
    kval_m: usize,
    numbytes: usize,
    base: *mut u8,
    avail: [Avail; MAX_K],
}

// SAFETY: a BuddyPool is used by one logical actor at a time (see the
// concurrency non-goal); it is Send so that actor can be a different thread
// than the one that created the pool, but it is never Sync.
unsafe impl Send for BuddyPool {}

impl BuddyPool {
    /// Reserves `2^k` bytes of anonymous memory from the OS, where `k` is
    /// derived from `size` (0 defaults to [`crate::size::DEFAULT_K`], clamped
    /// to `[MIN_K, MAX_K - 1]`), and returns a pool seeded with a single
    /// AVAILABLE block spanning the whole region.
    ///
    /// The pool is heap-allocated (`Box`) rather than returned by value: its
    /// free lists are self-referential once initialized, so the struct must
    /// not move after that point, and a `Box` gives it a stable address for
    /// its lifetime without requiring callers to pin a local themselves.
    ///
    /// ## Parameters
    ///
    /// - size `usize` The size of the pool in bytes (0 → default)
    ///
    /// ## Returns
    ///
    /// - A pool seeded with a single AVAILABLE block spanning the whole
    ///   region, or `BuddyError::MapFailed` if the OS refused to reserve it
    pub fn new(size: usize) -> Result<Box<BuddyPool>, BuddyError> {
        let kval_m = pool_order_of(size);
        let numbytes = 1usize << kval_m;
        let base = map_region(numbytes)?;

        let mut pool = Box::new(BuddyPool {
            kval_m,
            numbytes,
            base,
            avail: array::from_fn::<_, MAX_K, _>(|i| Avail {
                tag: BLOCK_UNUSED,
                kval: i as u16,
                next: ptr::null_mut(),
                prev: ptr::null_mut(),
            }),
        });
        pool.seed_free_lists();

        tracing::debug!(kval_m, numbytes, "buddy pool created");
        Ok(pool)
    }

    /// Links every `avail[i]` sentinel to itself and places the single
    /// whole-pool block at `base` on `avail[kval_m]`. Called once from
    /// [`Self::new`], after the pool has its final (heap) address.
    fn seed_free_lists(&mut self) {
        for i in 0..=self.kval_m {
            let head = &mut self.avail[i] as *mut Avail;
            self.avail[i].next = head;
            self.avail[i].prev = head;
        }

        let whole_block = self.base as *mut Avail;
        unsafe {
            (*whole_block).tag = BLOCK_AVAIL;
            (*whole_block).kval = self.kval_m as u16;
            (*whole_block).next = whole_block;
            (*whole_block).prev = whole_block;
        }
        self.avail[self.kval_m].next = whole_block;
        self.avail[self.kval_m].prev = whole_block;
    }

    /// The order of the whole pool (`2^kval_m` total bytes).
    pub fn kval_m(&self) -> usize {
        self.kval_m
    }

    /// Total number of bytes backing this pool.
    pub fn capacity(&self) -> usize {
        self.numbytes
    }

    /// Finds a free block of the smallest sufficient order, splits it down to
    /// the target order (lower half keeps splitting, upper half becomes the
    /// new free buddy), marks it RESERVED, and returns a pointer just past
    /// its header.
    ///
    /// Returns `Err(BuddyError::InvalidRequest)` for a zero-byte request and
    /// `Err(BuddyError::NoMemory)` on exhaustion, setting the compatibility
    /// errno-style indicator in the latter case only (see
    /// [`crate::error::last_error`]).
    ///
    /// ## Parameters
    ///
    /// - bytes `usize` The size of the user requested memory block in bytes
    ///
    /// ## Returns
    ///
    /// - A pointer to the memory block, or `BuddyError::InvalidRequest` if
    ///   `bytes` is zero, or `BuddyError::NoMemory` if no block is large enough
    pub fn allocate(&mut self, bytes: usize) -> Result<*mut u8, BuddyError> {
        if bytes == 0 {
            return Err(BuddyError::InvalidRequest);
        }

        let target_k = order_of(bytes + header_size()).max(SMALLEST_K);

        let mut j = target_k;
        while j <= self.kval_m && unsafe { freelist::is_empty(&self.avail[j]) } {
            j += 1;
        }
        if j > self.kval_m {
            error::set_last_error(BuddyError::NoMemory);
            tracing::warn!(bytes, target_k, "allocation failed: pool exhausted");
            return Err(BuddyError::NoMemory);
        }

        let block = self.avail[j].next;
        unsafe { freelist::unlink(block) };

        while j > target_k {
            j -= 1;
            unsafe {
                (*block).kval = j as u16;
                let buddy = buddy_of(self.base, block, j as u16);
                (*buddy).kval = j as u16;
                freelist::insert_head(&mut self.avail[j], buddy);
            }
            tracing::trace!(order = j, "split block for allocation");
        }

        unsafe {
            (*block).tag = BLOCK_RESERVED;
            (*block).kval = target_k as u16;
        }
        error::clear_last_error();

        let user_ptr = unsafe { (block as *mut u8).add(header_size()) };
        Ok(user_ptr)
    }

    /// Releases a pointer previously returned by [`Self::allocate`] on this
    /// pool, coalescing upward with free buddies as far as possible. A null
    /// pointer is a no-op. Passing a pointer not produced by this pool's
    /// `allocate` is undefined behavior, matching the raw port's contract.
    ///
    /// ## Parameters
    ///
    /// - ptr `*mut u8` Pointer to the memory block to free, or null (no-op)
    ///
    /// ## Returns
    ///
    /// - Nothing
    pub fn free(&mut self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }

        unsafe {
            let mut block = ptr.sub(header_size()) as *mut Avail;
            (*block).tag = BLOCK_AVAIL;

            let mut k = (*block).kval as usize;
            while k < self.kval_m {
                let buddy = buddy_of(self.base, block, k as u16);
                if (*buddy).tag != BLOCK_AVAIL || (*buddy).kval as usize != k {
                    break;
                }
                freelist::unlink(buddy);
                if (buddy as usize) < (block as usize) {
                    block = buddy;
                }
                k += 1;
                (*block).kval = k as u16;
                tracing::trace!(order = k, "coalesced block on free");
            }

            freelist::insert_head(&mut self.avail[k], block);
        }
    }
}

impl Drop for BuddyPool {
    /// Returns the backing region to the OS. A destructor cannot return a
    /// `Result`, so a failed `munmap` is logged rather than propagated — the
    /// raw port's fatal-exit-on-unmap-failure is downgraded here per the
    /// re-architecture notes; see DESIGN.md for the recorded decision.
    fn drop(&mut self) {
        let res = unsafe { libc::munmap(self.base as *mut c_void, self.numbytes) };
        if res == -1 {
            tracing::error!(base = ?self.base, "failed to unmap buddy pool backing region");
        } else {
            tracing::debug!("buddy pool destroyed");
        }
    }
}

fn map_region(numbytes: usize) -> Result<*mut u8, BuddyError> {
    let base = unsafe {
        libc::mmap(
            ptr::null_mut(),
            numbytes,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if base == libc::MAP_FAILED {
        tracing::error!(numbytes, "mmap failed while creating buddy pool");
        return Err(BuddyError::MapFailed);
    }
    Ok(base as *mut u8)
}
