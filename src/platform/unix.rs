//! POSIX-like backend: a thin wrapper over `sched_yield(2)`.

/// Yield the processor to another runnable thread.
///
/// Used as the backoff in the intake's push retry loop and in test
/// spin-waits; never on a path where correctness depends on it actually
/// yielding.
pub(crate) fn yield_now() {
    // SAFETY: sched_yield(2) takes no arguments and cannot fail in a way
    // that is meaningful to the caller; a spurious non-zero return (ENOSYS
    // on some embedded targets) just means the processor wasn't yielded,
    // which is always a legal outcome of calling this function.
    unsafe {
        libc::sched_yield();
    }
}
