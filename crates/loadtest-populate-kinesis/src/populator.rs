//! Pool of producers sharing one sink and one metrics registry.

use crate::config::ProducerConfig;
use crate::engine::{metric_names, BatchOutcome, SubmissionEngine};
use crate::error::KinesisPopulatorError;
use crate::sink::RecordSink;
use loadtest_generator::{Batcher, RecordGenerator};
use loadtest_metrics::MetricsRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

/// Spreads engine seeds away from the generator seeds of neighbouring producers.
const ENGINE_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Totals of a populate run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulateMetrics {
    /// Batches whose every record was accepted.
    pub batches_delivered: u64,
    /// Batches given up on after reaching the attempt ceiling.
    pub batches_dropped: u64,
    /// Records accepted by the stream.
    pub records_delivered: u64,
    /// Records still rejected when their batch was dropped.
    pub records_dropped: u64,
    /// Wall-clock duration of the run.
    pub total_duration: Duration,
}

impl PopulateMetrics {
    /// Calculate delivered records per second.
    pub fn records_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.records_delivered as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    fn merge(&mut self, other: &PopulateMetrics) {
        self.batches_delivered += other.batches_delivered;
        self.batches_dropped += other.batches_dropped;
        self.records_delivered += other.records_delivered;
        self.records_dropped += other.records_dropped;
    }
}

/// Runs `parallelism` independent producers against a [`RecordSink`].
///
/// Each producer owns its generator, batcher and submission engine; only
/// the sink and the registry are shared.
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(MetricsRegistry::new());
/// let config = ProducerConfig::new("benchmark").with_parallelism(4);
/// let populator = KinesisPopulator::new(sink, registry, config)?;
/// let metrics = populator.run(CancellationToken::new()).await?;
/// ```
pub struct KinesisPopulator {
    sink: Arc<dyn RecordSink>,
    registry: Arc<MetricsRegistry>,
    config: ProducerConfig,
}

impl KinesisPopulator {
    /// Create a populator, rejecting an invalid configuration before any
    /// producer starts.
    pub fn new(
        sink: Arc<dyn RecordSink>,
        registry: Arc<MetricsRegistry>,
        config: ProducerConfig,
    ) -> Result<Self, KinesisPopulatorError> {
        config.validate()?;
        Ok(Self {
            sink,
            registry,
            config,
        })
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// Run every producer until it finishes its batches or `shutdown` is
    /// cancelled, then return the combined totals.
    ///
    /// Without `batches_per_worker` producers only stop on cancellation.
    pub async fn run(
        &self,
        shutdown: CancellationToken,
    ) -> Result<PopulateMetrics, KinesisPopulatorError> {
        let start_time = Instant::now();

        info!(
            "Starting {} producers on stream '{}' (batch size: {})",
            self.config.parallelism, self.config.stream, self.config.batch_size
        );

        // Generators are built up front so a bad record shape fails the run
        // before any record is sent.
        let mut producers = Vec::with_capacity(self.config.parallelism);
        for index in 0..self.config.parallelism {
            let generator =
                RecordGenerator::new(self.config.records.clone(), self.config.worker_seed(index))?;
            let batcher = Batcher::new(generator, self.config.batch_size)?;
            let engine = SubmissionEngine::new(
                self.config.stream.clone(),
                Arc::clone(&self.sink),
                &self.registry,
                shutdown.clone(),
            )
            .with_max_attempts(self.config.max_attempts)
            .with_backoff(self.config.backoff)
            .with_seed(
                self.config
                    .worker_seed(index)
                    .map(|seed| seed.wrapping_mul(ENGINE_SEED_MIX)),
            );
            producers.push((index, batcher, engine));
        }

        let mut tasks = JoinSet::new();
        for (index, batcher, engine) in producers {
            let producer = Producer {
                batcher,
                engine,
                registry: Arc::clone(&self.registry),
                batches: self.config.batches_per_worker,
                shutdown: shutdown.clone(),
            };
            let span = info_span!("producer", name = %format!("Producer.{index}"));
            tasks.spawn(producer.run().instrument(span));
        }

        let mut metrics = PopulateMetrics::default();
        while let Some(result) = tasks.join_next().await {
            metrics.merge(&result?);
        }
        metrics.total_duration = start_time.elapsed();

        info!(
            "Population complete: {} records in {:?} ({:.2} records/sec), {} batches dropped",
            metrics.records_delivered,
            metrics.total_duration,
            metrics.records_per_second(),
            metrics.batches_dropped
        );

        Ok(metrics)
    }
}

struct Producer {
    batcher: Batcher<RecordGenerator>,
    engine: SubmissionEngine,
    registry: Arc<MetricsRegistry>,
    batches: Option<u64>,
    shutdown: CancellationToken,
}

impl Producer {
    async fn run(mut self) -> PopulateMetrics {
        info!("Starting up producer...");
        debug!("Submitting batches of {} records", self.batcher.batch_size());
        let active = self.registry.counter(metric_names::PRODUCERS_ACTIVE);
        active.inc(1);

        let mut metrics = PopulateMetrics::default();
        let mut submitted = 0u64;
        while self.batches.is_none_or(|limit| submitted < limit) {
            if self.shutdown.is_cancelled() {
                break;
            }
            let Some(batch) = self.batcher.next_batch() else {
                break;
            };
            let size = batch.len() as u64;
            submitted += 1;

            match self.engine.submit_batch(batch).await {
                BatchOutcome::Delivered { .. } => {
                    metrics.batches_delivered += 1;
                    metrics.records_delivered += size;
                }
                BatchOutcome::Dropped { records, .. } => {
                    metrics.batches_dropped += 1;
                    metrics.records_delivered += size - records as u64;
                    metrics.records_dropped += records as u64;
                }
                BatchOutcome::Cancelled { records } => {
                    metrics.records_delivered += size - records as u64;
                    break;
                }
            }
        }

        active.dec(1);
        debug!(
            "Producer stopped after {} batches ({} delivered)",
            submitted, metrics.batches_delivered
        );
        metrics
    }
}
