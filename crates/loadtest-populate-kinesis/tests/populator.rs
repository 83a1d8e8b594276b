//! Producer pool behavior against scripted and simulated sinks.

mod common;

use common::{ScriptedSink, Step};
use loadtest_generator::RecordGeneratorConfig;
use loadtest_metrics::MetricsRegistry;
use loadtest_populate_kinesis::{
    metric_names, ExponentialBackoff, KinesisPopulator, KinesisPopulatorError, ProducerConfig,
    RecordSink, SimulatedSink, SimulatedSinkConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn small_records() -> RecordGeneratorConfig {
    RecordGeneratorConfig::default().with_length_range(16, 64)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_producers_share_the_registry() {
    let sink = Arc::new(ScriptedSink::accepting());
    let registry = Arc::new(MetricsRegistry::new());
    let config = ProducerConfig::new("bench")
        .with_parallelism(4)
        .with_batch_size(1)
        .with_batches_per_worker(Some(100))
        .with_records(small_records());

    let populator = KinesisPopulator::new(sink.clone(), registry.clone(), config).unwrap();
    let metrics = populator.run(CancellationToken::new()).await.unwrap();

    assert_eq!(metrics.batches_delivered, 400);
    assert_eq!(metrics.records_delivered, 400);
    assert_eq!(sink.call_count(), 400);

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.meter_count(metric_names::SUCCESS_CALLS), 400);
    assert_eq!(snapshot.meter_count(metric_names::SUCCESS_RECORDS), 400);
    assert_eq!(snapshot.counter(metric_names::PRODUCERS_ACTIVE), 0);
}

#[tokio::test]
async fn test_rejects_invalid_config_before_starting() {
    let sink: Arc<dyn RecordSink> = Arc::new(ScriptedSink::accepting());
    let registry = Arc::new(MetricsRegistry::new());

    for config in [
        ProducerConfig::new("bench").with_batch_size(0),
        ProducerConfig::new("bench").with_parallelism(0),
        ProducerConfig::new(""),
    ] {
        let result = KinesisPopulator::new(sink.clone(), registry.clone(), config);
        assert!(matches!(result, Err(KinesisPopulatorError::InvalidConfig(_))));
    }
}

#[tokio::test]
async fn test_seeded_runs_are_reproducible() {
    let run = || async {
        let sink = Arc::new(ScriptedSink::accepting());
        let config = ProducerConfig::new("bench")
            .with_batch_size(3)
            .with_batches_per_worker(Some(5))
            .with_seed(Some(42))
            .with_records(small_records());
        KinesisPopulator::new(sink.clone(), Arc::new(MetricsRegistry::new()), config)
            .unwrap()
            .run(CancellationToken::new())
            .await
            .unwrap();
        sink.calls()
    };

    let first = run().await;
    let second = run().await;

    assert_eq!(first.len(), 5);
    assert!(first.iter().all(|call| call.len() == 3));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_dropped_batches_are_reported() {
    let sink = Arc::new(
        SimulatedSink::new(
            SimulatedSinkConfig {
                record_failure_rate: 1.0,
                ..Default::default()
            },
            Some(1),
        )
        .unwrap(),
    );
    let registry = Arc::new(MetricsRegistry::new());
    let config = ProducerConfig::new("bench")
        .with_batch_size(5)
        .with_max_attempts(Some(2))
        .with_batches_per_worker(Some(3))
        .with_backoff(ExponentialBackoff::new(Duration::from_millis(1), Duration::ZERO))
        .with_records(small_records());

    let metrics = KinesisPopulator::new(sink, registry.clone(), config)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(metrics.batches_dropped, 3);
    assert_eq!(metrics.records_dropped, 15);
    assert_eq!(metrics.records_delivered, 0);

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.meter_count(metric_names::ERROR_PERMANENT_FAILURES), 3);
    assert_eq!(snapshot.meter_count(metric_names::ERROR_DROPPED_RECORDS), 15);
    assert_eq!(snapshot.meter_count(metric_names::ERROR_PARTIAL_CALLS), 6);
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_run_stops_on_cancel() {
    let sink = Arc::new(
        SimulatedSink::new(
            SimulatedSinkConfig {
                latency: Duration::from_millis(10),
                ..Default::default()
            },
            Some(1),
        )
        .unwrap(),
    );
    let registry = Arc::new(MetricsRegistry::new());
    let config = ProducerConfig::new("bench")
        .with_parallelism(2)
        .with_batch_size(10)
        .with_records(small_records());
    let populator = KinesisPopulator::new(sink.clone(), registry.clone(), config).unwrap();

    let shutdown = CancellationToken::new();
    let canceller = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let metrics = populator.run(shutdown).await.unwrap();

    assert!(metrics.records_delivered > 0);
    assert_eq!(metrics.records_delivered, sink.accepted());
    assert_eq!(
        registry.snapshot().meter_count(metric_names::SUCCESS_RECORDS),
        sink.accepted()
    );
    assert_eq!(registry.snapshot().counter(metric_names::PRODUCERS_ACTIVE), 0);
}

#[tokio::test]
async fn test_delivered_totals_match_registry_on_misreported_failures() {
    let sink = Arc::new(ScriptedSink::new([]).with_fallback(Step::MisreportFailures(1)));
    let registry = Arc::new(MetricsRegistry::new());
    let config = ProducerConfig::new("bench")
        .with_batch_size(4)
        .with_batches_per_worker(Some(5))
        .with_records(small_records());

    let metrics = KinesisPopulator::new(sink, registry.clone(), config)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(metrics.records_delivered, 20);
    assert_eq!(
        registry.snapshot().meter_count(metric_names::SUCCESS_RECORDS),
        metrics.records_delivered
    );
}
