//! Lock-free intake and the two-lock FIFO queue the worker pool is built on.
//!
//! Both containers are node-based, each node an owned `Box` holding its own
//! payload, rather than an intrusive link embedded in caller-allocated
//! memory the way spec.md's C-shaped node description implies. That's a
//! student choice, not mio-derived (mio's own slab types go the other way:
//! `slab.rs` backs entries with a raw `heap::allocate`d arena and
//! `util/slab.rs` backs them inline in a `Vec<Entry<T>>` — neither boxes
//! individual entries). Owning the payload per-node trades the original's
//! zero-allocation-at-push property for one that is checkable by the borrow
//! checker instead of by hand.

mod intake;
mod two_lock;

pub use intake::Intake;
pub use two_lock::TwoLockQueue;
