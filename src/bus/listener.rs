use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

use crate::error::{CoreError, CoreResult};

use super::event::Event;
use super::{BusCore, DispatchPolicy};

/// A listener's registration handle, minted fresh by [`super::Bus::register`].
///
/// Mirrors the original's dedicated `EVENT_LISTENER_ID` struct. Backed by a
/// monotonic counter rather than sourced entropy: uniqueness only needs to
/// hold for the lifetime of one bus instance, never across processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(super) u128);

pub(super) struct ListenerIdGenerator {
    next: AtomicU64,
}

impl ListenerIdGenerator {
    pub(super) const fn new() -> Self {
        ListenerIdGenerator {
            next: AtomicU64::new(1),
        }
    }

    pub(super) fn next(&self) -> ListenerId {
        ListenerId(self.next.fetch_add(1, Ordering::Relaxed) as u128)
    }
}

/// A registered event handler.
///
/// `on_event` must not be invoked after the matching
/// [`super::Bus::unregister`] call returns; it must filter itself by
/// [`Event::event_id`] since the bus dispatches every event to every
/// registered listener regardless of id.
pub trait Listener: Send + Sync {
    fn on_event(&self, event: &dyn Event, bus: &BusHandle);
}

/// A non-owning reference to the bus, handed to [`Listener::on_event`].
///
/// Deliberately holds a [`Weak`] rather than a `Shared`/`Arc` clone: a
/// listener that stored a strong reference to the bus that dispatched it
/// would create an ownership cycle (bus -> listener -> bus). A listener that
/// wants to re-dispatch from inside `on_event` uses this handle, never a
/// reference it stashed itself.
pub struct BusHandle {
    pub(super) core: Weak<BusCore>,
}

impl BusHandle {
    /// Re-dispatch through the same bus that invoked the listener, provided
    /// the bus is still alive. Fails with [`CoreError::BusRunningDown`] if
    /// the bus has since been dropped entirely (not just run down).
    pub fn dispatch(
        &self,
        event: crate::ptr::Shared<dyn Event>,
        policy: DispatchPolicy,
    ) -> CoreResult<()> {
        match self.core.upgrade() {
            Some(core) => super::Bus::dispatch_on(&core, event, policy),
            None => Err(CoreError::BusRunningDown),
        }
    }
}
