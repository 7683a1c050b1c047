//! A cross-platform concurrency substrate: ownership-aware smart pointers, a
//! rundown barrier, lock-free/lock-based intake queues, a worker pool and a
//! typed, in-process event bus built on top of it.
//!
//! The crate targets user-mode POSIX hosts, user-mode Windows hosts, and
//! (behind the `kernel` feature) a Windows kernel-mode host; every type here
//! behaves identically across all three with respect to its documented
//! contracts. Dependency order is leaves first:
//!
//! ```text
//! ptr -> signal -> rundown -> queue -> pool -> bus
//! ```
//!
//! None of these types throw to report failure. Fallible construction
//! returns a [`error::CoreResult`]; a violated invariant (release without a
//! matching acquire, dereferencing an empty smart pointer, ...) aborts the
//! process via [`core::programmer_error`] rather than returning — see
//! [`error`] for the full taxonomy.
//!
//! There is no file format, wire protocol, or CLI at this crate's boundary:
//! it is in-process only, and holds no global state of its own. Each
//! [`pool::Pool`] and each [`bus::Bus`] is an independent instance with its
//! own threads.

#![allow(dead_code)]

/// Documentation of the crate's Cargo features.
///
/// - **`log`** (default): enables `trace!`/`debug!` diagnostics on work-item
///   dispatch/cancel, pool state transitions, and bus register/dispatch.
///   Purely diagnostic — the core never logs on behalf of a caller's result
///   code; this is the only thing the feature gates.
/// - **`kernel`**: a stand-in for the Windows kernel-mode target.
///   Exposes [`kernel::init`]/[`kernel::shutdown`] for a driver entry/unload
///   routine to call instead of relying on process/CRT startup. Windows-only.
pub mod features {}

pub mod bus;
pub mod core;
pub mod error;
mod platform;
pub mod ptr;
pub mod pool;
pub mod queue;
pub mod rundown;
pub mod signal;

#[cfg(all(feature = "kernel", windows))]
pub use platform::kernel;

pub use bus::{Bus, BusHandle, DispatchPolicy, Event, EventId, Listener, ListenerId};
pub use core::Optional;
pub use error::{CoreError, CoreResult};
pub use pool::{Pool, PoolConfig};
pub use ptr::{Shared, Unique};
pub use queue::{Intake, TwoLockQueue};
pub use rundown::{RundownBarrier, RundownGuard};
pub use signal::Signal;
