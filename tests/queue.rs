mod util;

use std::sync::Arc;
use std::thread;

use xcore::{Intake, TwoLockQueue};

/// 10 threads each run 10,000 push/pop iterations against one shared queue.
/// Per-iteration this only checks each thread gets back *a* value it could
/// plausibly have pushed (nothing pins global FIFO order across threads
/// sharing one queue); what's load-bearing is that the queue is left
/// structurally empty once every thread has joined.
#[test]
fn two_lock_queue_stress_leaves_queue_structurally_empty() {
    util::init();

    let queue = Arc::new(TwoLockQueue::new());
    let threads: Vec<_> = (0..10)
        .map(|t| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..10_000i64 {
                    let value = t * 10_000 + i;
                    queue.push(value);
                    let popped = queue.pop().expect("queue must not be empty right after push");
                    assert!(popped >= 0, "popped a sentinel or garbage value");
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(queue.pop(), None);
    assert_eq!(queue.flush(), Vec::<i64>::new());
}

#[test]
fn intake_push_flush_preserves_multiset_across_producers() {
    util::init();

    let intake = Arc::new(Intake::new());
    let threads: Vec<_> = (0..10)
        .map(|t| {
            let intake = intake.clone();
            thread::spawn(move || {
                for i in 0..1_000i64 {
                    intake.push(t * 1_000 + i);
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    let mut values = intake.flush_all();
    assert_eq!(values.len(), 10_000);
    values.sort_unstable();
    let expected: Vec<i64> = (0..10_000).collect();
    assert_eq!(values, expected);
    assert!(intake.flush_all().is_empty());
}
