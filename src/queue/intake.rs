use std::sync::atomic::{AtomicPtr, Ordering};
use std::ptr;

use crate::platform::yield_now;

struct Node<T> {
    value: T,
    next: *mut Node<T>,
}

/// A lock-free singly-linked LIFO mailbox: producers `push`, a single flush
/// takes the whole chain atomically.
///
/// `push` never blocks and never allocates beyond the one node it boxes; it
/// retries a compare-and-swap against a single atomic head pointer until it
/// wins. `flush_all` atomically swaps the head with null and hands back
/// every pushed value in reverse-arrival order (newest first) — callers that
/// need arrival order reverse it themselves, same as the two-lock queue's
/// `flush` leaves ordering to its caller for its own reasons.
pub struct Intake<T> {
    head: AtomicPtr<Node<T>>,
}

unsafe impl<T: Send> Send for Intake<T> {}
unsafe impl<T: Send> Sync for Intake<T> {}

impl<T> Intake<T> {
    pub fn new() -> Self {
        Intake {
            head: AtomicPtr::new(ptr::null_mut()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire).is_null()
    }

    /// Push `value` onto the head of the chain.
    pub fn push(&self, value: T) {
        let node = Box::into_raw(Box::new(Node {
            value,
            next: ptr::null_mut(),
        }));

        loop {
            let current_head = self.head.load(Ordering::Acquire);
            // SAFETY: `node` was just allocated by us and not yet published.
            unsafe {
                (*node).next = current_head;
            }
            if self
                .head
                .compare_exchange_weak(
                    current_head,
                    node,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                return;
            }
            yield_now();
        }
    }

    /// Atomically detach the whole chain, returning its values newest-first.
    pub fn flush_all(&self) -> Vec<T> {
        let mut head = self.head.swap(ptr::null_mut(), Ordering::AcqRel);
        let mut values = Vec::new();
        while !head.is_null() {
            // SAFETY: `head` was built exclusively from nodes this intake
            // allocated via `push`, and we just removed the only live
            // reference to the chain by swapping the head pointer out.
            let node = unsafe { Box::from_raw(head) };
            head = node.next;
            values.push(node.value);
        }
        values
    }
}

impl<T> Default for Intake<T> {
    fn default() -> Self {
        Intake::new()
    }
}

impl<T> Drop for Intake<T> {
    fn drop(&mut self) {
        self.flush_all();
    }
}
