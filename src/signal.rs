//! A named waitable with manual- and auto-reset modes.

use std::sync::{Condvar, Mutex};

use crate::error::CoreResult;

/// State is {signalled, not-signalled}; `set`/`reset`/`wait` transition it.
/// Built on `Mutex` + `Condvar` rather than a raw futex: there is no fairness
/// guarantee to uphold among waiters, which a condvar already satisfies.
pub struct Signal {
    manual_reset: bool,
    state: Mutex<bool>,
    condvar: Condvar,
}

impl Signal {
    /// Create a signal in the not-signalled state.
    ///
    /// `manual_reset = true`: `Set` releases every blocked and future
    /// waiter until the next `Reset`. `manual_reset = false`: `Set` releases
    /// exactly one waiter and then returns to not-signalled on its own.
    pub fn new(manual_reset: bool) -> CoreResult<Self> {
        Ok(Signal {
            manual_reset,
            state: Mutex::new(false),
            condvar: Condvar::new(),
        })
    }

    /// Set the signal.
    ///
    /// Manual-reset: wakes every current and future waiter until `reset()`.
    /// Auto-reset: wakes at most one waiter, consuming the signalled state
    /// in the process — a `set()` with nobody waiting yet leaves the signal
    /// signalled for the next `wait()` to consume.
    pub fn set(&self) {
        let mut signalled = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *signalled = true;
        if self.manual_reset {
            self.condvar.notify_all();
        } else {
            self.condvar.notify_one();
        }
    }

    /// Clear the signal. A no-op for auto-reset mode: auto-reset clears
    /// itself the instant a waiter consumes it.
    pub fn reset(&self) {
        if !self.manual_reset {
            return;
        }
        let mut signalled = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *signalled = false;
    }

    /// Block until the signal is set.
    ///
    /// Manual-reset: returns as soon as the state is signalled, and every
    /// other concurrent waiter also returns. Auto-reset: returns once *this*
    /// caller is the one chosen to consume a `set()` — which waiter that is
    /// when several are blocked is unspecified.
    pub fn wait(&self) {
        let mut signalled = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if *signalled {
                if !self.manual_reset {
                    *signalled = false;
                }
                return;
            }
            signalled = self
                .condvar
                .wait(signalled)
                .unwrap_or_else(|e| e.into_inner());
        }
    }
}
