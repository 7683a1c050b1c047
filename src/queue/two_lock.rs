use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::Mutex;

struct Node<T> {
    value: UnsafeCell<Option<T>>,
    next: AtomicPtr<Node<T>>,
}

impl<T> Node<T> {
    fn sentinel() -> *mut Node<T> {
        Box::into_raw(Box::new(Node {
            value: UnsafeCell::new(None),
            next: AtomicPtr::new(ptr::null_mut()),
        }))
    }
}

/// A Michael–Scott style FIFO with independent head and tail locks, so a
/// producer pushing at the tail never contends with a consumer popping at
/// the head.
///
/// Built on a sentinel node: `head` always points at a node whose value has
/// already been consumed, and `pop` promotes `head.next` to be the new
/// sentinel, freeing the old one. A fresh queue's sentinel and tail are the
/// same node. Each node's `next` link is an atomic pointer rather than a
/// plain one: when the queue holds exactly one node, the head lock (reading
/// `sentinel.next`) and the tail lock (writing it) touch that same field
/// under two *different* locks, so the link itself needs its own
/// synchronization independent of either mutex.
pub struct TwoLockQueue<T> {
    head: Mutex<*mut Node<T>>,
    tail: Mutex<*mut Node<T>>,
}

unsafe impl<T: Send> Send for TwoLockQueue<T> {}
unsafe impl<T: Send> Sync for TwoLockQueue<T> {}

impl<T> TwoLockQueue<T> {
    pub fn new() -> Self {
        let sentinel = Node::sentinel();
        TwoLockQueue {
            head: Mutex::new(sentinel),
            tail: Mutex::new(sentinel),
        }
    }

    /// Append `value` at the tail.
    pub fn push(&self, value: T) {
        let node = Box::into_raw(Box::new(Node {
            value: UnsafeCell::new(Some(value)),
            next: AtomicPtr::new(ptr::null_mut()),
        }));

        let mut tail = self.tail.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: `*tail` is only ever written by a tail-lock holder, so it
        // is a valid, still-allocated node; `next` is atomic precisely so
        // that a concurrent pop reading this same node's `next` (possible
        // when the queue has one element) is a defined, synchronized access.
        unsafe {
            (**tail).next.store(node, Ordering::Release);
        }
        *tail = node;
    }

    /// Remove and return the value at the head, if any.
    pub fn pop(&self) -> Option<T> {
        let mut head = self.head.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: `*head` is only ever written by a head-lock holder and
        // freed only after being replaced here, so it is a valid node.
        let next = unsafe { (**head).next.load(Ordering::Acquire) };
        if next.is_null() {
            return None;
        }

        // SAFETY: `next` was linked by a `push` that fully initialized its
        // `value` before publishing the pointer via `Release`; we just
        // `Acquire`d it above. Nobody else observes `next` until we install
        // it as the new sentinel below, so taking its value is exclusive.
        let value = unsafe { (*next).value.get().as_mut().unwrap().take() };

        let old_head = *head;
        *head = next;
        // SAFETY: `old_head` was allocated by `Node::sentinel`/`push` and is
        // unreachable from any other thread now that `*head` points past it.
        unsafe {
            drop(Box::from_raw(old_head));
        }
        value
    }

    /// Take both locks and detach the entire chain, leaving the queue empty
    /// with a fresh sentinel.
    pub fn flush(&self) -> Vec<T> {
        let mut head = self.head.lock().unwrap_or_else(|e| e.into_inner());
        let mut tail = self.tail.lock().unwrap_or_else(|e| e.into_inner());

        let mut values = Vec::new();
        // SAFETY: holding both locks means no push or pop can observe or
        // mutate any node in the chain starting at `*head` concurrently.
        unsafe {
            let mut current = (**head).next.load(Ordering::Acquire);
            let old_head = *head;
            while !current.is_null() {
                let node = Box::from_raw(current);
                let next = node.next.load(Ordering::Acquire);
                if let Some(v) = (*node.value.get()).take() {
                    values.push(v);
                }
                current = next;
            }
            drop(Box::from_raw(old_head));
        }

        let sentinel = Node::sentinel();
        *head = sentinel;
        *tail = sentinel;

        values
    }
}

impl<T> Default for TwoLockQueue<T> {
    fn default() -> Self {
        TwoLockQueue::new()
    }
}

impl<T> Drop for TwoLockQueue<T> {
    fn drop(&mut self) {
        self.flush();
        // SAFETY: `flush` just installed a fresh, unshared sentinel and no
        // other reference to this queue can exist during `drop`.
        unsafe {
            drop(Box::from_raw(*self.head.get_mut().unwrap_or_else(|e| e.into_inner())));
        }
    }
}
