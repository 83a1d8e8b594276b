//! Producer configuration.

use crate::backoff::ExponentialBackoff;
use crate::error::KinesisPopulatorError;
use loadtest_generator::RecordGeneratorConfig;

/// Kinesis accepts at most 500 records per PutRecords call.
pub const MAX_RECORDS_PER_REQUEST: usize = 500;

/// Configuration for a producer run.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Name of the stream to write to.
    pub stream: String,
    /// Records per put-records call.
    pub batch_size: usize,
    /// Number of producers running in parallel.
    pub parallelism: usize,
    /// Submission calls allowed per batch before it is dropped (`None` = retry forever).
    pub max_attempts: Option<u32>,
    /// Batches each producer submits before stopping (`None` = run until cancelled).
    pub batches_per_worker: Option<u64>,
    /// Base seed; producer N uses `seed + N`.
    pub seed: Option<u64>,
    /// Shape of the generated records.
    pub records: RecordGeneratorConfig,
    /// Delay schedule between partial-failure retries.
    pub backoff: ExponentialBackoff,
}

impl ProducerConfig {
    /// Create a configuration with one producer sending one record per call.
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            batch_size: 1,
            parallelism: 1,
            max_attempts: None,
            batches_per_worker: None,
            seed: None,
            records: RecordGeneratorConfig::default(),
            backoff: ExponentialBackoff::default(),
        }
    }

    /// Set the number of records per call.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the number of parallel producers.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Set the per-batch attempt ceiling.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Stop each producer after `batches` batches.
    pub fn with_batches_per_worker(mut self, batches: Option<u64>) -> Self {
        self.batches_per_worker = batches;
        self
    }

    /// Set the base seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Set the record shape.
    pub fn with_records(mut self, records: RecordGeneratorConfig) -> Self {
        self.records = records;
        self
    }

    /// Set the retry delay schedule.
    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Seed for producer `index`, if seeding is enabled.
    pub fn worker_seed(&self, index: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(index as u64))
    }

    /// Reject configurations no producer can run with.
    pub fn validate(&self) -> Result<(), KinesisPopulatorError> {
        if self.stream.trim().is_empty() {
            return Err(KinesisPopulatorError::InvalidConfig(
                "stream name must not be empty".to_string(),
            ));
        }
        if self.batch_size == 0 || self.batch_size > MAX_RECORDS_PER_REQUEST {
            return Err(KinesisPopulatorError::InvalidConfig(format!(
                "batch size must be within 1..={MAX_RECORDS_PER_REQUEST}, got {}",
                self.batch_size
            )));
        }
        if self.parallelism == 0 {
            return Err(KinesisPopulatorError::InvalidConfig(
                "parallelism must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(KinesisPopulatorError::InvalidConfig(
                "max attempts must be at least 1".to_string(),
            ));
        }
        self.records.validate()?;
        Ok(())
    }
}
