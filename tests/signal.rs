mod util;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use xcore::Signal;

/// An auto-reset signal with 10 waiters blocked on it: each `set()` must
/// release exactly one waiter, and the released count must hold steady
/// before the next `set()`.
#[test]
fn auto_reset_signal_releases_exactly_one_waiter_per_set() {
    util::init();

    let signal = Arc::new(Signal::new(false).unwrap());
    let counter = Arc::new(AtomicU64::new(0));

    let waiters: Vec<_> = (0..10)
        .map(|_| {
            let signal = signal.clone();
            let counter = counter.clone();
            thread::spawn(move || {
                signal.wait();
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    // Let every waiter actually block before we start signalling.
    thread::sleep(std::time::Duration::from_millis(50));

    for i in 1..=10u64 {
        signal.set();
        while counter.load(Ordering::SeqCst) != i {
            thread::yield_now();
        }
        for _ in 0..100 {
            assert_eq!(counter.load(Ordering::SeqCst), i);
            thread::yield_now();
        }
    }

    for waiter in waiters {
        waiter.join().unwrap();
    }
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn manual_reset_signal_wakes_every_waiter_at_once() {
    util::init();

    let signal = Arc::new(Signal::new(true).unwrap());
    let counter = Arc::new(AtomicU64::new(0));

    let waiters: Vec<_> = (0..10)
        .map(|_| {
            let signal = signal.clone();
            let counter = counter.clone();
            thread::spawn(move || {
                signal.wait();
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    thread::sleep(std::time::Duration::from_millis(50));
    signal.set();

    for waiter in waiters {
        waiter.join().unwrap();
    }
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}
