//! Windows-like backend: a thin wrapper over `SwitchToThread`.

use windows_sys::Win32::System::Threading::SwitchToThread;

/// Yield the processor to another runnable thread.
///
/// `SwitchToThread` only yields to threads on the same processor; that is
/// sufficient for the backoff use since a losing CAS implies another thread
/// on that processor made progress.
pub(crate) fn yield_now() {
    // SAFETY: SwitchToThread takes no arguments and has no failure mode the
    // caller needs to observe (a zero return just means there was nothing
    // else to run).
    unsafe {
        SwitchToThread();
    }
}
