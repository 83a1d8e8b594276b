//! Common CLI argument definitions shared by all populators.

use clap::{Args, ValueEnum};
use loadtest_generator::config::{
    DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, DEFAULT_OVERSIZE_MULTIPLIER,
    DEFAULT_OVERSIZE_PROBABILITY, DEFAULT_PARTITION_KEY_LENGTH,
};
use loadtest_generator::{CorpusMode, RecordGeneratorConfig};

/// Corpus mode choice for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CorpusChoice {
    /// Slice every record out of one random corpus (fast, oversized records clipped)
    Reuse,
    /// Like reuse, with a corpus large enough for full-length oversized records
    Extended,
    /// Generate fresh random content per record
    Fresh,
}

impl From<CorpusChoice> for CorpusMode {
    fn from(choice: CorpusChoice) -> Self {
        match choice {
            CorpusChoice::Reuse => CorpusMode::Reuse,
            CorpusChoice::Extended => CorpusMode::Extended,
            CorpusChoice::Fresh => CorpusMode::Fresh,
        }
    }
}

/// Common arguments shared by all populators.
#[derive(Args, Clone, Debug)]
pub struct CommonPopulateArgs {
    /// Number of records to push with each API call
    #[arg(long, short = 'b', default_value = "1")]
    pub batch_size: usize,

    /// The number of producers to run in parallel
    #[arg(long, short = 'p', default_value = "1")]
    pub parallelism: usize,

    /// Minimum record payload length in bytes
    #[arg(long, default_value_t = DEFAULT_MIN_LENGTH)]
    pub min_record_length: usize,

    /// Maximum record payload length in bytes (before the oversize multiplier)
    #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
    pub max_record_length: usize,

    /// Probability that a record is inflated by the oversize multiplier
    #[arg(long, default_value_t = DEFAULT_OVERSIZE_PROBABILITY)]
    pub oversize_probability: f64,

    /// Multiplier applied to oversized records
    #[arg(long, default_value_t = DEFAULT_OVERSIZE_MULTIPLIER)]
    pub oversize_multiplier: usize,

    /// Length of the random partition key
    #[arg(long, default_value_t = DEFAULT_PARTITION_KEY_LENGTH)]
    pub partition_key_length: usize,

    /// How record payloads are produced
    #[arg(long, value_enum, default_value = "reuse")]
    pub corpus: CorpusChoice,

    /// Random seed for reproducible records (worker N uses seed + N)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Give up on a batch after this many submission calls (default: retry forever)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Stop each producer after this many batches (default: run until interrupted)
    #[arg(long)]
    pub batches_per_worker: Option<u64>,

    /// Dry-run mode: push records to an in-process simulated stream instead of the real service
    #[arg(long)]
    pub dry_run: bool,
}

impl CommonPopulateArgs {
    /// Record shape described by these arguments.
    pub fn record_config(&self) -> RecordGeneratorConfig {
        RecordGeneratorConfig {
            min_length: self.min_record_length,
            max_length: self.max_record_length,
            oversize_probability: self.oversize_probability,
            oversize_multiplier: self.oversize_multiplier,
            partition_key_length: self.partition_key_length,
            corpus: self.corpus.into(),
        }
    }
}
