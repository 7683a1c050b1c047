use std::any::Any;

/// The type discriminator used for listener matching.
///
/// Mirrors the original's dedicated `EVENT_ID` struct rather than a bare
/// `u128`: callers mint one constant per event type and listeners compare
/// against it in [`crate::bus::Listener::on_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub u128);

impl EventId {
    pub const fn new(id: u128) -> Self {
        EventId(id)
    }
}

impl From<u128> for EventId {
    fn from(id: u128) -> Self {
        EventId(id)
    }
}

/// A dispatchable event. Carried through the bus as `Shared<dyn Event>` so
/// ownership extends across the thread boundary an async dispatch crosses.
///
/// `as_any` is the standard object-safe escape hatch for downcasting a
/// `&dyn Event` back to its concrete type inside a listener — `Event` itself
/// cannot carry a generic `downcast` method and stay object-safe.
pub trait Event: Any + Send + Sync {
    /// The id listeners match against. Not necessarily unique per instance;
    /// many events of the same kind share one `EventId`.
    fn event_id(&self) -> EventId;

    /// See the trait-level note on downcasting.
    fn as_any(&self) -> &dyn Any;
}
