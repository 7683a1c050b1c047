//! A fixed-size worker pool with a graceful shutdown protocol.

mod work_item;

pub use work_item::WorkItem;

use std::cell::Cell;
use std::ptr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::{CoreError, CoreResult};
use crate::queue::{Intake, TwoLockQueue};
use crate::rundown::{RundownBarrier, RundownGuard};
use crate::signal::Signal;

/// Tuning knobs for a [`Pool`].
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Number of worker threads. Defaults to twice the host's available
    /// parallelism (falling back to 2 if that cannot be determined).
    pub worker_count: usize,
    /// Maximum number of items a worker drains from its own FIFO before
    /// re-checking the pool's state and yielding back to its wait.
    pub max_work_per_worker: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        PoolConfig {
            worker_count: cores * 2,
            max_work_per_worker: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolState {
    New,
    Running,
    Stopping,
    Stopped,
}

impl PoolState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => PoolState::New,
            1 => PoolState::Running,
            2 => PoolState::Stopping,
            _ => PoolState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            PoolState::New => 0,
            PoolState::Running => 1,
            PoolState::Stopping => 2,
            PoolState::Stopped => 3,
        }
    }
}

struct WorkerSlot {
    fifo: TwoLockQueue<WorkItem>,
    signal: Signal,
}

struct Shared {
    config: PoolConfig,
    state: AtomicU8,
    intake_a: Intake<WorkItem>,
    intake_b: Intake<WorkItem>,
    not_empty: Signal,
    rundown: RundownBarrier,
    workers: Vec<WorkerSlot>,
}

impl Shared {
    fn state(&self) -> PoolState {
        PoolState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: PoolState) {
        self.state.store(state.as_u8(), Ordering::Release);
        log::debug!("pool state -> {state:?}");
    }
}

thread_local! {
    // Identifies the `Shared` block (if any) whose worker is currently
    // executing a work item on this thread, so a recursive `submit` from
    // inside `run`/`cancel` can route to intake B instead of intake A.
    static CURRENT_POOL: Cell<*const ()> = const { Cell::new(ptr::null()) };
}

struct CurrentPoolScope {
    previous: *const (),
}

impl CurrentPoolScope {
    fn enter(shared: &Arc<Shared>) -> Self {
        let ptr = Arc::as_ptr(shared) as *const ();
        let previous = CURRENT_POOL.with(|c| c.replace(ptr));
        CurrentPoolScope { previous }
    }
}

impl Drop for CurrentPoolScope {
    fn drop(&mut self) {
        CURRENT_POOL.with(|c| c.set(self.previous));
    }
}

/// A pool of OS worker threads consuming work items via a broker thread.
///
/// Submissions from ordinary callers and submissions made recursively by a
/// work item running *on* one of this pool's own workers go through
/// separate intake queues (`A` and `B`) so that the broker flushing one
/// never contends with a worker pushing into the other — see the module's
/// two-queue design.
pub struct Pool {
    shared: Arc<Shared>,
    broker: Mutex<Option<JoinHandle<()>>>,
    worker_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Pool {
    /// Construct a pool in the `New` state. No threads are started until
    /// [`Pool::start`] is called.
    pub fn new(config: PoolConfig) -> CoreResult<Self> {
        let mut workers = Vec::with_capacity(config.worker_count);
        for _ in 0..config.worker_count {
            workers.push(WorkerSlot {
                fifo: TwoLockQueue::new(),
                signal: Signal::new(false)?,
            });
        }

        let shared = Arc::new(Shared {
            config,
            state: AtomicU8::new(PoolState::New.as_u8()),
            intake_a: Intake::new(),
            intake_b: Intake::new(),
            not_empty: Signal::new(false)?,
            rundown: RundownBarrier::new(),
            workers,
        });

        Ok(Pool {
            shared,
            broker: Mutex::new(None),
            worker_handles: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the broker and worker threads, moving the pool to `Running`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArg`] if the pool has already been
    /// started (this call is not idempotent — `New` is a one-way gate).
    pub fn start(&self) -> CoreResult<()> {
        if self
            .shared
            .state
            .compare_exchange(
                PoolState::New.as_u8(),
                PoolState::Running.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Err(CoreError::InvalidArg);
        }
        log::debug!("pool state -> Running");

        {
            let shared = self.shared.clone();
            let handle = std::thread::Builder::new()
                .name("xcore-pool-broker".into())
                .spawn(move || broker_loop(shared))
                .map_err(|_| CoreError::ResourceUnavailable)?;
            *self.broker.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        }

        let mut handles = self.worker_handles.lock().unwrap_or_else(|e| e.into_inner());
        for index in 0..self.shared.workers.len() {
            let shared = self.shared.clone();
            let handle = std::thread::Builder::new()
                .name(format!("xcore-pool-worker-{index}"))
                .spawn(move || worker_loop(shared, index))
                .map_err(|_| CoreError::ResourceUnavailable)?;
            handles.push(handle);
        }

        Ok(())
    }

    /// Submit a work item. Exactly one of `run`/`cancel` will be invoked:
    /// `run` if the pool is `Running` when a worker dispatches the item,
    /// `cancel` in every other case (including immediately, if the pool is
    /// not `Running` at submission time).
    pub fn submit<R, C>(&self, run: R, cancel: C) -> CoreResult<()>
    where
        R: FnOnce() + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let item = WorkItem::new(run, cancel);

        let guard = RundownGuard::new(&self.shared.rundown);
        if !guard.is_acquired() {
            item.cancel();
            return Err(CoreError::PoolRunningDown);
        }

        match self.shared.state() {
            PoolState::New => {
                item.cancel();
                Err(CoreError::PoolNotRunning)
            }
            PoolState::Running => {
                let ptr = Arc::as_ptr(&self.shared) as *const ();
                let is_worker_recursion = CURRENT_POOL.with(|c| c.get() == ptr);
                if is_worker_recursion {
                    self.shared.intake_b.push(item);
                } else {
                    self.shared.intake_a.push(item);
                }
                self.shared.not_empty.set();
                Ok(())
            }
            PoolState::Stopping | PoolState::Stopped => {
                item.cancel();
                Err(CoreError::PoolRunningDown)
            }
        }
    }

    /// Shut the pool down: stop accepting new work, deliver every pending
    /// item (including in-flight broker batches) to its cancel path, join
    /// every thread, and move to `Stopped`. Idempotent.
    pub fn rundown(&self) {
        if self.shared.state() == PoolState::New {
            self.shared.set_state(PoolState::Stopped);
            self.shared.rundown.wait_for_release();
            return;
        }

        self.shared.set_state(PoolState::Stopping);
        self.shared.not_empty.set();
        for worker in &self.shared.workers {
            worker.signal.set();
        }

        if let Some(handle) = self.broker.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = handle.join();
        }

        drain_and_cancel(self.shared.intake_a.flush_all());
        drain_and_cancel(self.shared.intake_b.flush_all());
        for worker in &self.shared.workers {
            drain_and_cancel(worker.fifo.flush());
        }

        let handles: Vec<_> = self
            .worker_handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        for handle in handles {
            let _ = handle.join();
        }

        self.shared.set_state(PoolState::Stopped);
        self.shared.rundown.wait_for_release();
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.rundown();
    }
}

fn drain_and_cancel(items: Vec<WorkItem>) {
    for item in items {
        item.cancel();
    }
}

fn broker_loop(shared: Arc<Shared>) {
    let worker_count = shared.workers.len();
    let mut next_worker = 0usize;

    let mut dispatch_batch = |shared: &Arc<Shared>, next_worker: &mut usize| {
        let mut batch_a = shared.intake_a.flush_all();
        batch_a.reverse();
        let mut batch_b = shared.intake_b.flush_all();
        batch_b.reverse();

        for item in batch_a.into_iter().chain(batch_b) {
            if worker_count == 0 {
                item.cancel();
                continue;
            }
            let worker = &shared.workers[*next_worker % worker_count];
            worker.fifo.push(item);
            worker.signal.set();
            *next_worker += 1;
        }
    };

    loop {
        shared.not_empty.wait();
        dispatch_batch(&shared, &mut next_worker);

        if shared.state() != PoolState::Running {
            // One final drain pass to catch anything queued between our
            // last flush and the state transition, then exit.
            dispatch_batch(&shared, &mut next_worker);
            return;
        }
    }
}

fn worker_loop(shared: Arc<Shared>, index: usize) {
    let max = shared.config.max_work_per_worker.max(1);
    loop {
        shared.workers[index].signal.wait();
        loop {
            let mut drained_any = false;
            for _ in 0..max {
                let item = shared.workers[index].fifo.pop();
                let Some(item) = item else { break };
                drained_any = true;
                let running = shared.state() == PoolState::Running;
                let _scope = CurrentPoolScope::enter(&shared);
                if running {
                    log::trace!("worker {index}: running item");
                    item.run();
                } else {
                    log::trace!("worker {index}: cancelling item");
                    item.cancel();
                }
            }
            if !drained_any {
                break;
            }
        }

        if shared.state() != PoolState::Running {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::sync::Arc;

    fn small_config() -> PoolConfig {
        PoolConfig {
            worker_count: 4,
            max_work_per_worker: 4,
        }
    }

    #[test]
    fn new_pool_rundown_is_idempotent_and_blocks_further_submit() {
        let pool = Pool::new(small_config()).unwrap();
        pool.rundown();
        pool.rundown();
        let err = pool
            .submit(|| (), || ())
            .expect_err("submit on a never-started pool must fail");
        assert_eq!(err, CoreError::PoolRunningDown);
    }

    #[test]
    fn submit_before_start_fails_pool_not_running() {
        let pool = Pool::new(small_config()).unwrap();
        let err = pool.submit(|| (), || ()).unwrap_err();
        assert_eq!(err, CoreError::PoolNotRunning);
    }

    #[test]
    fn one_submitted_item_runs_and_rundown_waits_for_it() {
        let pool = Pool::new(small_config()).unwrap();
        pool.start().unwrap();

        let counter = Arc::new(AtomicU64::new(0));
        let counter_run = counter.clone();
        pool.submit(
            move || {
                counter_run.fetch_add(10_000, Ordering::SeqCst);
            },
            || {},
        )
        .unwrap();

        pool.rundown();
        assert_eq!(counter.load(Ordering::SeqCst), 10_000);

        let err = pool.submit(|| (), || ()).unwrap_err();
        assert_eq!(err, CoreError::PoolRunningDown);
    }

    #[test]
    fn stress_nested_submissions_complete_exactly_once_each() {
        let pool = Arc::new(Pool::new(small_config()).unwrap());
        pool.start().unwrap();

        let counter = Arc::new(AtomicU64::new(0));

        for _ in 0..10 {
            let pool_inner = pool.clone();
            let counter_outer = counter.clone();
            pool.submit(
                move || {
                    for _ in 0..1000 {
                        let counter_inner = counter_outer.clone();
                        pool_inner
                            .submit(
                                move || {
                                    for _ in 0..10_000 {
                                        counter_inner.fetch_add(1, Ordering::SeqCst);
                                    }
                                },
                                || {},
                            )
                            .expect("recursive submit while pool is running must succeed");
                    }
                },
                || {},
            )
            .unwrap();
        }

        while counter.load(Ordering::SeqCst) != 100_000_000 {
            crate::platform::yield_now();
        }

        pool.rundown();
        assert!(pool.submit(|| (), || ()).is_err());
    }

    #[test]
    fn rundown_cancels_items_still_queued() {
        let pool = Pool::new(small_config()).unwrap();
        pool.start().unwrap();

        let spin_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let spin_flag_run = spin_flag.clone();
        pool.submit(
            move || {
                while !spin_flag_run.load(Ordering::SeqCst) {
                    crate::platform::yield_now();
                }
            },
            || {},
        )
        .unwrap();

        let cancelled = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let cancelled_for_cancel = cancelled.clone();

        // Give the first item a moment to actually start running before we
        // begin rundown, so this exercises "rundown while one item is
        // in-flight" rather than "rundown before any item started".
        std::thread::sleep(std::time::Duration::from_millis(10));

        let pool = Arc::new(pool);
        let pool_for_thread = pool.clone();
        let rundown_thread = std::thread::spawn(move || pool_for_thread.rundown());

        // This submit races the rundown; either path is acceptable, but it
        // must always resolve to the cancel function running exactly once,
        // synchronously with respect to submit's return when it fails.
        match pool.submit(|| (), move || cancelled_for_cancel.store(true, Ordering::SeqCst)) {
            Ok(()) => {}
            Err(_) => assert!(cancelled.load(Ordering::SeqCst)),
        }

        spin_flag.store(true, Ordering::SeqCst);
        rundown_thread.join().unwrap();
    }
}
