mod util;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use xcore::{CoreError, Pool, PoolConfig};

/// Submitted items recursively fan out more work from inside a worker, and
/// rundown waits for every one of them to finish before returning. Scaled
/// down from a much larger fan-out for integration-test runtime.
#[test]
fn pool_stress_recursive_submissions_all_complete() {
    util::init();

    let pool = Arc::new(Pool::new(PoolConfig::default()).unwrap());
    pool.start().unwrap();

    let counter = Arc::new(AtomicU64::new(0));
    const OUTER: u64 = 10;
    const INNER: u64 = 100;
    const PER_ITEM: u64 = 1_000;

    for _ in 0..OUTER {
        let pool_inner = pool.clone();
        let counter_outer = counter.clone();
        pool.submit(
            move || {
                for _ in 0..INNER {
                    let counter_inner = counter_outer.clone();
                    pool_inner
                        .submit(
                            move || {
                                for _ in 0..PER_ITEM {
                                    counter_inner.fetch_add(1, Ordering::SeqCst);
                                }
                            },
                            || {},
                        )
                        .expect("recursive submit while running must succeed");
                }
            },
            || {},
        )
        .unwrap();
    }

    let expected = OUTER * INNER * PER_ITEM;
    while counter.load(Ordering::SeqCst) != expected {
        std::thread::yield_now();
    }

    pool.rundown();
    let err = pool.submit(|| (), || ()).unwrap_err();
    assert_eq!(err, CoreError::PoolRunningDown);
}

/// Rundown forces delivery of still-queued items to their cancel path while
/// letting an in-flight run callback finish naturally, and completes in
/// bounded time.
#[test]
fn pool_rundown_cancels_queued_work_while_in_flight_work_completes() {
    util::init();

    let pool = Pool::new(PoolConfig {
        worker_count: 2,
        max_work_per_worker: 4,
    })
    .unwrap();
    pool.start().unwrap();

    let release = Arc::new(AtomicBool::new(false));
    let release_for_run = release.clone();
    let ran_to_completion = Arc::new(AtomicBool::new(false));
    let ran_to_completion_for_run = ran_to_completion.clone();
    pool.submit(
        move || {
            while !release_for_run.load(Ordering::SeqCst) {
                std::thread::yield_now();
            }
            ran_to_completion_for_run.store(true, Ordering::SeqCst);
        },
        || {},
    )
    .unwrap();

    // Give the first item a moment to actually start running.
    std::thread::sleep(std::time::Duration::from_millis(10));

    let pool = Arc::new(pool);
    let pool_for_rundown = pool.clone();
    let rundown_thread = std::thread::spawn(move || pool_for_rundown.rundown());

    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_for_cancel = cancelled.clone();
    match pool.submit(|| (), move || cancelled_for_cancel.store(true, Ordering::SeqCst)) {
        Ok(()) => {}
        Err(_) => assert!(cancelled.load(Ordering::SeqCst)),
    }

    release.store(true, Ordering::SeqCst);
    rundown_thread.join().unwrap();
    assert!(ran_to_completion.load(Ordering::SeqCst));
}
