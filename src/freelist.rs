//! The free-list registry: O(1) insert/unlink/is-empty over the circular
//! doubly linked lists threaded through block headers.
//!
//! Each list is headed by a sentinel [`Avail`] embedded in the pool (never
//! heap-allocated), so its address is stable for the pool's lifetime and
//! doubles as the list terminator. An empty list has
//! `head.next == head.prev == &head`.

use crate::block::{Avail, BLOCK_AVAIL};

/// Inserts `block` at the head of the list headed by `head`, tagging it
/// AVAILABLE. `block` must not already be linked into any list.
///
/// # Safety
/// `head` must point to a live sentinel (or list node) whose `next`/`prev`
/// form a valid circular list, and `block` must be valid for writes.
pub unsafe fn insert_head(head: *mut Avail, block: *mut Avail) {
    (*block).tag = BLOCK_AVAIL;
    (*block).next = (*head).next;
    (*block).prev = head;
    (*(*head).next).prev = block;
    (*head).next = block;
}

/// Removes `block` from whatever list it is currently linked into. Does not
/// change `block`'s tag — callers set `tag = RESERVED` themselves when
/// removal is in service of an allocation.
///
/// # Safety
/// `block` must be a currently-linked node (its `next`/`prev` valid).
pub unsafe fn unlink(block: *mut Avail) {
    (*(*block).prev).next = (*block).next;
    (*(*block).next).prev = (*block).prev;
}

/// Tests whether the list headed by `head` has no real nodes.
///
/// # Safety
/// `head` must point to a live sentinel.
pub unsafe fn is_empty(head: *const Avail) -> bool {
    (*head).next as *const Avail == head
}
