//! Concurrent writers must never lose an update.

use loadtest_metrics::MetricsRegistry;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WORKERS: usize = 8;
const UPDATES_PER_WORKER: u64 = 10_000;

#[test]
fn test_concurrent_meter_marks_sum_exactly() {
    let registry = Arc::new(MetricsRegistry::new());

    thread::scope(|scope| {
        for _ in 0..WORKERS {
            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                for _ in 0..UPDATES_PER_WORKER {
                    registry.mark_meter("Success/Calls", 1);
                }
            });
        }
    });

    assert_eq!(
        registry.snapshot().meter_count("Success/Calls"),
        WORKERS as u64 * UPDATES_PER_WORKER
    );
}

#[test]
fn test_concurrent_counter_and_timer_updates() {
    let registry = Arc::new(MetricsRegistry::new());

    thread::scope(|scope| {
        for worker in 0..WORKERS {
            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                // Each worker resolves its own handles, racing metric creation.
                let counter = registry.counter("Records/Generated");
                let timer = registry.timer("Latency");
                for i in 0..UPDATES_PER_WORKER {
                    counter.inc(1);
                    timer.update(Duration::from_micros(worker as u64 * 10 + i % 7));
                }
            });
        }
    });

    let snapshot = registry.snapshot();
    let expected = WORKERS as u64 * UPDATES_PER_WORKER;
    assert_eq!(snapshot.counter("Records/Generated"), expected as i64);
    assert_eq!(snapshot.timer_count("Latency"), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_on_runtime() {
    let registry = Arc::new(MetricsRegistry::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let meter = registry.meter("Success/Records");
                for _ in 0..1_000 {
                    meter.mark(2);
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(registry.snapshot().meter_count("Success/Records"), 8_000);
}
