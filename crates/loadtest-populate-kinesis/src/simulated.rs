//! In-process stand-in for the stream service, used by dry runs.

use crate::error::KinesisPopulatorError;
use crate::sink::{PutRecordsResponse, RecordResult, RecordSink};
use async_trait::async_trait;
use loadtest_generator::config::MAX_RECORD_BYTES;
use loadtest_generator::Record;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Largest PutRecords request Kinesis accepts.
pub const MAX_REQUEST_BYTES: usize = 5 * 1024 * 1024;

const THROUGHPUT_EXCEEDED: &str = "ProvisionedThroughputExceededException";

/// Failure and latency profile of a [`SimulatedSink`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatedSinkConfig {
    /// Probability that an individual record is rejected.
    pub record_failure_rate: f64,
    /// Probability that a whole call fails before reaching a shard.
    pub transport_failure_rate: f64,
    /// Fixed latency added to every call.
    pub latency: Duration,
    /// Number of shards records are spread over.
    pub shard_count: u32,
}

impl SimulatedSinkConfig {
    pub fn validate(&self) -> Result<(), KinesisPopulatorError> {
        for (name, rate) in [
            ("record failure rate", self.record_failure_rate),
            ("transport failure rate", self.transport_failure_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(KinesisPopulatorError::InvalidConfig(format!(
                    "simulated {name} must be within [0, 1], got {rate}"
                )));
            }
        }
        Ok(())
    }
}

/// Sink that accepts records in memory with configurable failures.
///
/// Size limits are enforced the way the real service enforces them: an
/// oversized record or request fails the whole call.
pub struct SimulatedSink {
    config: SimulatedSinkConfig,
    rng: Mutex<StdRng>,
    sequence: AtomicU64,
}

impl SimulatedSink {
    pub fn new(config: SimulatedSinkConfig, seed: Option<u64>) -> Result<Self, KinesisPopulatorError> {
        config.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            config,
            rng: Mutex::new(rng),
            sequence: AtomicU64::new(0),
        })
    }

    /// Number of records accepted so far.
    pub fn accepted(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    fn check_limits(records: &[Record]) -> Result<(), KinesisPopulatorError> {
        if let Some(record) = records.iter().find(|r| r.size() > MAX_RECORD_BYTES) {
            return Err(KinesisPopulatorError::Transport(format!(
                "ValidationException: record of {} bytes exceeds the {MAX_RECORD_BYTES} byte limit",
                record.size()
            )));
        }
        let request_bytes: usize = records.iter().map(Record::size).sum();
        if request_bytes > MAX_REQUEST_BYTES {
            return Err(KinesisPopulatorError::Transport(format!(
                "ValidationException: request of {request_bytes} bytes exceeds the {MAX_REQUEST_BYTES} byte limit"
            )));
        }
        Ok(())
    }

    fn shard_for(&self, partition_key: &str) -> String {
        let shards = self.config.shard_count.max(1);
        let hash = partition_key
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        format!("shardId-{:012}", hash % shards)
    }
}

#[async_trait]
impl RecordSink for SimulatedSink {
    async fn put_records(
        &self,
        stream: &str,
        records: &[Record],
    ) -> Result<PutRecordsResponse, KinesisPopulatorError> {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        Self::check_limits(records)?;

        let mut rng = self.rng.lock();
        if rng.random_bool(self.config.transport_failure_rate) {
            return Err(KinesisPopulatorError::Transport(format!(
                "{THROUGHPUT_EXCEEDED}: Rate exceeded for stream {stream}"
            )));
        }

        let results = records
            .iter()
            .map(|record| {
                let shard_id = self.shard_for(&record.partition_key);
                if rng.random_bool(self.config.record_failure_rate) {
                    RecordResult::Failed {
                        error_code: THROUGHPUT_EXCEEDED.to_string(),
                        error_message: Some(format!("Rate exceeded for shard {shard_id}")),
                    }
                } else {
                    let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
                    RecordResult::Success {
                        shard_id,
                        sequence_number: sequence.to_string(),
                    }
                }
            })
            .collect();

        Ok(PutRecordsResponse::from_results(results))
    }
}
