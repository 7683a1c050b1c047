//! Error taxonomy for the core.
//!
//! Every fallible operation in this crate returns a [`CoreError`] rather than
//! panicking or throwing: allocation failures, OS primitive creation
//! failures, and misuse that the caller can reasonably check for ahead of
//! time all round-trip through here. Bugs that indicate a broken invariant
//! (double-release of a rundown, a null work-item callback, dereferencing an
//! empty smart pointer) are not represented as error variants — they abort
//! the process instead; see [`crate::core::programmer_error`].

use std::error;
use std::fmt;

/// Result alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;

/// The kinds of recoverable failure a core operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Allocation failed, or the host refused to create an OS primitive
    /// (mutex, condition variable, thread).
    ResourceUnavailable,
    /// A required callback was null, or an unknown id was passed to
    /// `unregister`.
    InvalidArg,
    /// `Pool::submit` was called before `Pool::start`.
    PoolNotRunning,
    /// `Pool::submit` was called after `Pool::rundown` began.
    PoolRunningDown,
    /// `Bus::register` or `Bus::dispatch` was called after `Bus::rundown`
    /// began.
    BusRunningDown,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CoreError::ResourceUnavailable => "a required OS resource could not be allocated",
            CoreError::InvalidArg => "invalid argument",
            CoreError::PoolNotRunning => "pool has not been started",
            CoreError::PoolRunningDown => "pool is stopping or stopped",
            CoreError::BusRunningDown => "bus is running down",
        };
        f.write_str(msg)
    }
}

impl error::Error for CoreError {}
