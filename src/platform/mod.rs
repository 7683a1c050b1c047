//! Platform glue.
//!
//! Mirrors mio's `sys::unix` / `sys::windows` split (see `src/sys/mod.rs`),
//! but for this crate the only piece of behavior that is genuinely
//! platform-specific is yielding the processor during a bounded
//! compare-and-swap retry loop (the intake's `push`, the rundown barrier's
//! spin path). Everything else — `Signal`, `RundownBarrier`, `Intake`,
//! `TwoLockQueue`, `Pool`, `Bus` — is expressed purely in terms of
//! `std::sync` primitives, which already behave identically across POSIX and
//! Windows hosts; re-deriving that portability by hand would just be a
//! worse, less-audited copy of what the standard library gives for free.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub(crate) use self::unix::yield_now;
#[cfg(windows)]
pub(crate) use self::windows::yield_now;

#[cfg(not(any(unix, windows)))]
pub(crate) fn yield_now() {
    std::thread::yield_now();
}

/// The kernel-mode stand-in.
///
/// A true NT kernel-mode target has no `std`, no CRT-driven static
/// initializers, and no user-mode threads — none of which this crate can
/// honestly emulate from a hosted build. What a kernel host actually needs is
/// a single `init()`/`shutdown()` pair it calls from its own driver-entry and
/// driver-unload routines instead of relying on process startup; that
/// contract is platform-independent and lives in [`crate::core::init`] /
/// [`crate::core::shutdown`]. This module only exists so `feature = "kernel"`
/// has a place to hang future kernel-only wiring (e.g. a non-paged pool
/// allocator) without disturbing the portable API surface.
#[cfg(all(feature = "kernel", windows))]
pub mod kernel {
    /// Re-exported so kernel hosts have one obvious entry point to call
    /// from their driver-entry routine.
    pub use crate::core::init;
    /// Re-exported so kernel hosts have one obvious entry point to call
    /// from their driver-unload routine.
    pub use crate::core::shutdown;
}
