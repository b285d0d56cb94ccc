//! The block header every free or reserved block carries, and the tag values
//! that distinguish the three states a block can be in.

/// Handed out to a caller; payload bytes belong to them until `free`.
pub const BLOCK_RESERVED: u16 = 0;
/// Sitting on a free list, available to satisfy a future allocation.
pub const BLOCK_AVAIL: u16 = 1;
/// A sentinel list head. Never a real block, never returned to a caller.
pub const BLOCK_UNUSED: u16 = 3;

/// Fixed-size metadata prefixed to every block, free or reserved. A block of
/// order `kval` occupies exactly `2^kval` bytes including this header; the
/// pointer returned to callers is the address immediately past it.
///
/// Field order matches the layout assumed by pointer arithmetic elsewhere in
/// this crate (`next`/`prev` double as list links when the block is
/// AVAILABLE or UNUSED, and are dead storage while RESERVED) — do not
/// reorder.
#[repr(C)]
#[derive(Debug)]
pub struct Avail {
    pub tag: u16,
    pub kval: u16,
    pub next: *mut Avail,
    pub prev: *mut Avail,
}

impl Avail {
    pub fn is_available(&self) -> bool {
        self.tag == BLOCK_AVAIL
    }
}

/// Size, in bytes, of the header every block carries.
pub fn header_size() -> usize {
    std::mem::size_of::<Avail>()
}
