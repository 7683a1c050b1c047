//! A typed, in-process event bus built on top of the worker pool.
//!
//! Delivery is either synchronous (on the calling thread), asynchronous (via
//! a pool work item), or picked automatically — see [`DispatchPolicy`].
//! Registration and dispatch never race: a dispatch snapshots the listener
//! table once, under the lock, and is unaffected by any registration or
//! unregistration that happens after.

mod event;
mod listener;

pub use event::{Event, EventId};
pub use listener::{BusHandle, Listener, ListenerId};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use listener::ListenerIdGenerator;

use crate::error::{CoreError, CoreResult};
use crate::pool::{Pool, PoolConfig};
use crate::ptr::Shared;
use crate::rundown::{RundownBarrier, RundownGuard};

/// How a dispatched event reaches its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Invoke every matching listener on the calling thread before
    /// `dispatch` returns.
    Sync,
    /// Enqueue delivery as a pool work item and return immediately. The
    /// listener snapshot is still captured before `dispatch` returns, so
    /// unregistrations racing the enqueue cannot affect who gets notified.
    Async,
    /// Resolved unconditionally to [`DispatchPolicy::Async`] rather than
    /// heuristically choosing between sync and async per call.
    Auto,
}

type ListenerMap = HashMap<ListenerId, Shared<dyn Listener>>;

struct BusCore {
    pool: Pool,
    listeners: Mutex<ListenerMap>,
    id_gen: ListenerIdGenerator,
    rundown: RundownBarrier,
}

/// The event bus. Each instance owns an independent worker pool and listener
/// table; there is no global state shared between bus instances.
pub struct Bus {
    core: Arc<BusCore>,
}

impl Bus {
    /// Build a bus with its own worker pool, started and ready to dispatch.
    pub fn new(pool_config: PoolConfig) -> CoreResult<Self> {
        let pool = Pool::new(pool_config)?;
        pool.start()?;
        Ok(Bus {
            core: Arc::new(BusCore {
                pool,
                listeners: Mutex::new(HashMap::new()),
                id_gen: ListenerIdGenerator::new(),
                rundown: RundownBarrier::new(),
            }),
        })
    }

    /// A non-owning handle to this bus, the same kind passed to
    /// [`Listener::on_event`]. Exposed so callers that hold a `Bus` directly
    /// can re-dispatch through the same path a listener would.
    pub fn handle(&self) -> BusHandle {
        BusHandle {
            core: Arc::downgrade(&self.core),
        }
    }

    /// Register a listener, returning the id it was assigned.
    ///
    /// Fails with [`CoreError::BusRunningDown`] once [`Bus::rundown`] has
    /// begun.
    pub fn register(&self, listener: Shared<dyn Listener>) -> CoreResult<ListenerId> {
        let guard = RundownGuard::new(&self.core.rundown);
        if !guard.is_acquired() {
            return Err(CoreError::BusRunningDown);
        }
        let id = self.core.id_gen.next();
        self.core
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, listener);
        log::debug!("bus: registered listener {id:?}");
        Ok(id)
    }

    /// Remove a listener. After this returns, no dispatch whose snapshot was
    /// taken after this call may invoke it; a dispatch whose snapshot was
    /// already taken still holds its own [`Shared`] clone and completes
    /// normally.
    pub fn unregister(&self, id: ListenerId) -> CoreResult<()> {
        let removed = self
            .core
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
        log::debug!("bus: unregistered listener {id:?}");
        match removed {
            Some(_) => Ok(()),
            None => Err(CoreError::InvalidArg),
        }
    }

    /// Dispatch `event` to every currently registered listener per `policy`.
    pub fn dispatch(&self, event: Shared<dyn Event>, policy: DispatchPolicy) -> CoreResult<()> {
        Self::dispatch_on(&self.core, event, policy)
    }

    /// Shared implementation used by both [`Bus::dispatch`] and
    /// [`BusHandle::dispatch`] — the handle only has a `Weak<BusCore>`, not
    /// a `Bus`, so it can't call through `self.dispatch`.
    fn dispatch_on(
        core: &Arc<BusCore>,
        event: Shared<dyn Event>,
        policy: DispatchPolicy,
    ) -> CoreResult<()> {
        if !core.rundown.acquire() {
            return Err(CoreError::BusRunningDown);
        }

        let policy = match policy {
            DispatchPolicy::Auto => DispatchPolicy::Async,
            other => other,
        };
        log::trace!("bus: dispatch policy={policy:?}");

        let snapshot = snapshot(core);

        match policy {
            DispatchPolicy::Sync => {
                let handle = BusHandle {
                    core: Arc::downgrade(core),
                };
                deliver(&snapshot, &event, &handle);
                core.rundown.release();
                Ok(())
            }
            DispatchPolicy::Async => {
                let handle = BusHandle {
                    core: Arc::downgrade(core),
                };
                let core_for_run = core.clone();
                let core_for_cancel = core.clone();
                core.pool.submit(
                    move || {
                        deliver(&snapshot, &event, &handle);
                        core_for_run.rundown.release();
                    },
                    move || {
                        core_for_cancel.rundown.release();
                    },
                )
            }
            DispatchPolicy::Auto => unreachable!("resolved to Async above"),
        }
    }

    /// Close the bus to new registrations and dispatches, wait for every
    /// outstanding dispatch to finish, tear down the underlying pool, and
    /// clear the listener table.
    pub fn rundown(&self) {
        self.core.rundown.wait_for_release();
        self.core.pool.rundown();
        self.core
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Drop for Bus {
    fn drop(&mut self) {
        self.rundown();
    }
}

fn snapshot(core: &BusCore) -> Vec<(ListenerId, Shared<dyn Listener>)> {
    core.listeners
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .map(|(id, listener)| (*id, listener.clone()))
        .collect()
}

fn deliver(
    snapshot: &[(ListenerId, Shared<dyn Listener>)],
    event: &Shared<dyn Event>,
    handle: &BusHandle,
) {
    for (_, listener) in snapshot {
        listener.on_event(&**event, handle);
    }
}
