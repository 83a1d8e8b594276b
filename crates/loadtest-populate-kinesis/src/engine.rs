//! Per-producer submission loop with partial-failure retry.
//!
//! One batch goes through the following states until it is delivered:
//!
//! ```text
//!             ┌──────────── transport error (no backoff) ───────────┐
//!             ▼                                                     │
//!  batch ─► submit ──► no record flagged ───────► Delivered         │
//!             │                                                     │
//!             ├──────────────────────────────────────────────────────┘
//!             │
//!             └─► some records flagged ─► keep failed ─► backoff ─► submit
//! ```
//!
//! Records accepted by the stream are never resubmitted: each retry carries
//! only the positions the previous response flagged, so a batch can only
//! shrink.

use crate::backoff::ExponentialBackoff;
use crate::sink::{RecordResult, RecordSink};
use loadtest_generator::record::total_size;
use loadtest_generator::Record;
use loadtest_metrics::{Meter, MetricsRegistry, Timer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Names under which the engine records into the registry.
pub mod metric_names {
    pub const LATENCY: &str = "Latency";
    pub const BACKOFF: &str = "Backoff";
    pub const ERROR_CALLS: &str = "Error/Calls";
    pub const ERROR_PARTIAL_CALLS: &str = "Error/PartialCalls";
    pub const ERROR_RECORDS: &str = "Error/Records";
    pub const ERROR_BYTES: &str = "Error/Bytes";
    pub const ERROR_PERMANENT_FAILURES: &str = "Error/PermanentFailures";
    pub const ERROR_DROPPED_RECORDS: &str = "Error/DroppedRecords";
    pub const SUCCESS_CALLS: &str = "Success/Calls";
    pub const SUCCESS_RECORDS: &str = "Success/Records";
    pub const SUCCESS_BYTES: &str = "Success/Bytes";
    pub const PRODUCERS_ACTIVE: &str = "Producers/Active";
}

/// Handles resolved once so the hot path never looks names up.
struct EngineMetrics {
    latency: Arc<Timer>,
    backoff: Arc<Timer>,
    error_calls: Arc<Meter>,
    error_partial_calls: Arc<Meter>,
    error_records: Arc<Meter>,
    error_bytes: Arc<Meter>,
    permanent_failures: Arc<Meter>,
    dropped_records: Arc<Meter>,
    success_calls: Arc<Meter>,
    success_records: Arc<Meter>,
    success_bytes: Arc<Meter>,
}

impl EngineMetrics {
    fn resolve(registry: &MetricsRegistry) -> Self {
        use metric_names::*;
        Self {
            latency: registry.timer(LATENCY),
            backoff: registry.timer(BACKOFF),
            error_calls: registry.meter(ERROR_CALLS),
            error_partial_calls: registry.meter(ERROR_PARTIAL_CALLS),
            error_records: registry.meter(ERROR_RECORDS),
            error_bytes: registry.meter(ERROR_BYTES),
            permanent_failures: registry.meter(ERROR_PERMANENT_FAILURES),
            dropped_records: registry.meter(ERROR_DROPPED_RECORDS),
            success_calls: registry.meter(SUCCESS_CALLS),
            success_records: registry.meter(SUCCESS_RECORDS),
            success_bytes: registry.meter(SUCCESS_BYTES),
        }
    }
}

/// How a batch left the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every record was accepted, after `calls` submission calls.
    Delivered { calls: u32 },
    /// The attempt ceiling was reached with `records` still rejected.
    Dropped { calls: u32, records: usize },
    /// Shutdown was requested with `records` not yet accepted.
    Cancelled { records: usize },
}

/// Submits batches for one producer, retrying until each batch is accepted.
pub struct SubmissionEngine {
    stream: String,
    sink: Arc<dyn RecordSink>,
    metrics: EngineMetrics,
    backoff: ExponentialBackoff,
    max_attempts: Option<u32>,
    rng: StdRng,
    shutdown: CancellationToken,
}

impl SubmissionEngine {
    pub fn new(
        stream: impl Into<String>,
        sink: Arc<dyn RecordSink>,
        registry: &MetricsRegistry,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            stream: stream.into(),
            sink,
            metrics: EngineMetrics::resolve(registry),
            backoff: ExponentialBackoff::default(),
            max_attempts: None,
            rng: StdRng::from_os_rng(),
            shutdown,
        }
    }

    /// Give up on a batch after `max_attempts` submission calls.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay schedule between partial-failure retries.
    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Seed the backoff jitter.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self
    }

    /// Submit `records` until every one of them is accepted, the attempt
    /// ceiling is reached, or shutdown is requested.
    ///
    /// Shutdown is only observed between calls and during backoff; a call
    /// already in flight always completes.
    pub async fn submit_batch(&mut self, mut records: Vec<Record>) -> BatchOutcome {
        let mut calls: u32 = 0;
        let mut attempt: u32 = 0;

        loop {
            if self.shutdown.is_cancelled() {
                return BatchOutcome::Cancelled {
                    records: records.len(),
                };
            }
            if self.max_attempts.is_some_and(|max| calls >= max) {
                return self.drop_batch(calls, &records);
            }

            calls += 1;
            let result = self
                .metrics
                .latency
                .time(self.sink.put_records(&self.stream, &records))
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    debug!("Submission of {} records failed: {}", records.len(), e);
                    self.metrics.error_calls.mark(1);
                    self.metrics.error_records.mark(records.len() as u64);
                    self.metrics.error_bytes.mark(total_size(&records));
                    continue;
                }
            };

            let flagged = (0..records.len())
                .filter(|&index| is_flagged(&response.records, index))
                .count();
            if flagged == 0 {
                if response.is_partial_failure() {
                    warn!(
                        "Response reported {} failed records but flagged none of {}; treating batch as delivered",
                        response.failed_record_count,
                        records.len()
                    );
                }
                self.mark_success(&records);
                return BatchOutcome::Delivered { calls };
            }

            self.metrics.error_partial_calls.mark(1);
            self.metrics
                .error_records
                .mark(response.failed_record_count.max(flagged) as u64);

            let submitted = records.len();
            records = retain_failed(records, &response.records);
            if self.max_attempts.is_some_and(|max| calls >= max) {
                return self.drop_batch(calls, &records);
            }

            let delay = self.backoff.delay(attempt, &mut self.rng);
            debug!(
                "{} of {} records rejected, retrying in {:?} (attempt {})",
                records.len(),
                submitted,
                delay,
                attempt + 1
            );

            let slept = {
                let _backoff = self.metrics.backoff.start();
                tokio::select! {
                    _ = tokio::time::sleep(delay) => true,
                    _ = self.shutdown.cancelled() => false,
                }
            };
            if !slept {
                return BatchOutcome::Cancelled {
                    records: records.len(),
                };
            }
            attempt += 1;
        }
    }

    fn mark_success(&self, records: &[Record]) {
        self.metrics.success_calls.mark(1);
        self.metrics.success_records.mark(records.len() as u64);
        self.metrics.success_bytes.mark(total_size(records));
    }

    fn drop_batch(&self, calls: u32, records: &[Record]) -> BatchOutcome {
        warn!(
            "Dropping {} records after {} submission calls",
            records.len(),
            calls
        );
        self.metrics.permanent_failures.mark(1);
        self.metrics.dropped_records.mark(records.len() as u64);
        BatchOutcome::Dropped {
            calls,
            records: records.len(),
        }
    }
}

/// Keep the records whose positional result is a failure.
///
/// Positions the response does not cover are kept as well: nothing proves
/// they were stored.
pub fn retain_failed(records: Vec<Record>, results: &[RecordResult]) -> Vec<Record> {
    records
        .into_iter()
        .enumerate()
        .filter(|(index, _)| is_flagged(results, *index))
        .map(|(_, record)| record)
        .collect()
}

fn is_flagged(results: &[RecordResult], index: usize) -> bool {
    results.get(index).is_none_or(RecordResult::is_failed)
}
