//! Ownership-aware smart pointers.
//!
//! `Unique<T>` and `Shared<T>` are the vocabulary types the rest of the
//! crate uses to move polymorphic payloads (events, listeners, work-item
//! arguments) across threads without leaking them. Neither ever panics or
//! throws to report allocation failure: construction returns a
//! [`crate::error::CoreResult`] and callers are expected to check emptiness
//! before dereferencing.
//!
//! Both types are thin, safe wrappers over the standard library's
//! [`Box`]/[`std::sync::Arc`] rather than a hand-rolled allocation: a raw
//! refcount (like `FromRawArc` in mio's `sys/windows/from_raw_arc.rs`) only
//! earns its keep when it needs a layout guarantee `Arc` doesn't make (there,
//! that an `OVERLAPPED*` can be reinterpreted as the control block). Nothing
//! here has that constraint: `Arc<T>`'s control block is already allocated
//! contiguously with `T`, and `Arc`/`Box` already expose the downcast
//! machinery `Unique`/`Shared` need. Reimplementing that by hand would just
//! be a worse, unaudited copy of what the standard library already gives
//! for free.

mod shared;
mod unique;

pub use shared::Shared;
pub use unique::Unique;
