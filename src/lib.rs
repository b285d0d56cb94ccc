//! A buddy-system memory allocator over a single `mmap`'d region.
//!
//! The crate exposes four operations: create a pool ([`BuddyPool::new`]),
//! allocate from it ([`BuddyPool::allocate`]), release back to it
//! ([`BuddyPool::free`]), and destroy it (dropping the pool, which `munmap`s
//! the backing region). There is no higher-level allocator interface here —
//! no reallocation, no alignment control beyond what the block header
//! imposes, no thread-safe wrapper, no compaction. A pool is used by one
//! logical actor at a time; callers sharing a pool across actors running in
//! parallel must serialize externally.
//!
//! ```
//! use buddy_pool::BuddyPool;
//!
//! let mut pool = BuddyPool::new(1 << 20).unwrap();
//! let p = pool.allocate(128).unwrap();
//! unsafe { *p = 0xAB };
//! pool.free(p);
//! ```

mod block;
mod buddy;
mod error;
mod freelist;
mod pool;
mod size;

pub use error::{last_error, BuddyError};
pub use pool::BuddyPool;
pub use size::{order_of, DEFAULT_K, MAX_K, MIN_K, SMALLEST_K};
