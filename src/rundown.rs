//! A recursive acquire/release barrier that can be run down exactly once.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::programmer_error;
use crate::signal::Signal;

/// A rundown protection counter is acquired once per outstanding use of a
/// resource and released when that use ends. `wait_for_release` closes the
/// barrier to new acquisitions and blocks until every outstanding one has
/// been released, giving callers a way to tear an object down while other
/// threads may still be using it.
///
/// Not a lock: many threads can hold acquisitions concurrently, and the same
/// thread can acquire it recursively. It only guarantees that once
/// `wait_for_release` returns, nobody still holds a reference.
pub struct RundownBarrier {
    // The low bit marks the barrier as run down; the remaining bits count
    // outstanding acquisitions. Mirrors a single-word "count | closed-flag"
    // scheme so acquire/release only ever need one atomic read-modify-write.
    state: AtomicUsize,
    released: Signal,
}

const RUNDOWN_ACTIVE_BIT: usize = 1;
const COUNT_SHIFT: u32 = 1;

impl RundownBarrier {
    /// A fresh barrier, open for acquisitions.
    pub fn new() -> Self {
        RundownBarrier {
            state: AtomicUsize::new(0),
            released: Signal::new(true).expect("manual-reset signal construction is infallible"),
        }
    }

    /// Attempt to acquire. Returns `false` once `wait_for_release` has been
    /// called, even if outstanding acquisitions still exist.
    pub fn acquire(&self) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current & RUNDOWN_ACTIVE_BIT != 0 {
                return false;
            }
            let next = current + (1 << COUNT_SHIFT);
            match self.state.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Release one previously acquired reference.
    ///
    /// # Panics
    ///
    /// Panics if there is no outstanding acquisition to release — releasing
    /// without a matching acquire is a programmer error, not a recoverable
    /// condition.
    pub fn release(&self) {
        let previous = self.state.fetch_sub(1 << COUNT_SHIFT, Ordering::AcqRel);
        if previous >> COUNT_SHIFT == 0 {
            programmer_error("RundownBarrier::release with no outstanding acquisition");
        }
        let after = previous - (1 << COUNT_SHIFT);
        if after & RUNDOWN_ACTIVE_BIT != 0 && after >> COUNT_SHIFT == 0 {
            self.released.set();
        }
    }

    /// Close the barrier to new acquisitions and block until every
    /// outstanding acquisition has been released.
    ///
    /// Idempotent: calling it again once already run down returns
    /// immediately. Calling it with zero outstanding acquisitions also
    /// returns immediately.
    pub fn wait_for_release(&self) {
        let previous = self.state.fetch_or(RUNDOWN_ACTIVE_BIT, Ordering::AcqRel);
        if previous & RUNDOWN_ACTIVE_BIT != 0 || previous >> COUNT_SHIFT == 0 {
            return;
        }
        self.released.wait();
    }

    /// Whether `wait_for_release` has been called.
    pub fn is_run_down(&self) -> bool {
        self.state.load(Ordering::Acquire) & RUNDOWN_ACTIVE_BIT != 0
    }
}

impl Default for RundownBarrier {
    fn default() -> Self {
        RundownBarrier::new()
    }
}

/// A scoped acquisition: holds the barrier acquired for as long as the guard
/// lives, releasing automatically on drop. Construction fails (by leaving
/// [`RundownGuard::is_acquired`] false) rather than panicking when the
/// barrier has already been run down.
pub struct RundownGuard<'a> {
    rundown: &'a RundownBarrier,
    acquired: bool,
}

impl<'a> RundownGuard<'a> {
    pub fn new(rundown: &'a RundownBarrier) -> Self {
        let acquired = rundown.acquire();
        RundownGuard { rundown, acquired }
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired
    }
}

impl Drop for RundownGuard<'_> {
    fn drop(&mut self) {
        if self.acquired {
            self.rundown.release();
        }
    }
}
