//! Configuration for record generation.

use crate::generator::GeneratorError;

/// Default lower bound of the record payload length.
pub const DEFAULT_MIN_LENGTH: usize = 1500;
/// Default upper bound of the record payload length.
pub const DEFAULT_MAX_LENGTH: usize = 2500;
/// Default probability that a record is inflated by the oversize multiplier.
pub const DEFAULT_OVERSIZE_PROBABILITY: f64 = 0.05;
/// Default oversize multiplier (2500 byte records become ~25KB).
pub const DEFAULT_OVERSIZE_MULTIPLIER: usize = 10;
/// Default partition key length.
pub const DEFAULT_PARTITION_KEY_LENGTH: usize = 32;

/// Kinesis rejects partition keys longer than 256 characters.
pub const MAX_PARTITION_KEY_LENGTH: usize = 256;

/// Largest record Kinesis accepts (payload plus partition key).
pub const MAX_RECORD_BYTES: usize = 1024 * 1024;

/// How record payloads are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorpusMode {
    /// Slice every payload out of one random corpus of `max_length` bytes.
    /// Oversized draws are clipped to the corpus.
    #[default]
    Reuse,
    /// Like `Reuse`, with the corpus grown to `max_length * oversize_multiplier`
    /// so oversized records keep their full length.
    Extended,
    /// Draw fresh random content for every record.
    Fresh,
}

/// Shape of the generated records.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordGeneratorConfig {
    /// Minimum payload length (inclusive).
    pub min_length: usize,
    /// Maximum payload length (inclusive), before the oversize multiplier.
    pub max_length: usize,
    /// Probability in `[0, 1]` that a record is multiplied by `oversize_multiplier`.
    pub oversize_probability: f64,
    /// Multiplier applied to oversized records.
    pub oversize_multiplier: usize,
    /// Length of the random partition key.
    pub partition_key_length: usize,
    /// Payload production mode.
    pub corpus: CorpusMode,
}

impl Default for RecordGeneratorConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            oversize_probability: DEFAULT_OVERSIZE_PROBABILITY,
            oversize_multiplier: DEFAULT_OVERSIZE_MULTIPLIER,
            partition_key_length: DEFAULT_PARTITION_KEY_LENGTH,
            corpus: CorpusMode::Reuse,
        }
    }
}

impl RecordGeneratorConfig {
    /// Set the payload length range.
    pub fn with_length_range(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    /// Set the oversize probability and multiplier.
    pub fn with_oversize(mut self, probability: f64, multiplier: usize) -> Self {
        self.oversize_probability = probability;
        self.oversize_multiplier = multiplier;
        self
    }

    /// Set the corpus mode.
    pub fn with_corpus(mut self, corpus: CorpusMode) -> Self {
        self.corpus = corpus;
        self
    }

    /// Largest payload this configuration can produce.
    pub fn largest_record(&self) -> usize {
        match self.corpus {
            CorpusMode::Reuse => self.max_length,
            CorpusMode::Extended | CorpusMode::Fresh => {
                self.max_length.saturating_mul(self.oversize_multiplier)
            }
        }
    }

    /// Check the configuration for values the generator cannot honor.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.min_length == 0 {
            return Err(GeneratorError::InvalidConfig(
                "min_length must be at least 1".to_string(),
            ));
        }
        if self.min_length > self.max_length {
            return Err(GeneratorError::InvalidConfig(format!(
                "min_length ({}) must not exceed max_length ({})",
                self.min_length, self.max_length
            )));
        }
        if !(0.0..=1.0).contains(&self.oversize_probability) {
            return Err(GeneratorError::InvalidConfig(format!(
                "oversize_probability must be within [0, 1], got {}",
                self.oversize_probability
            )));
        }
        if self.oversize_multiplier == 0 {
            return Err(GeneratorError::InvalidConfig(
                "oversize_multiplier must be at least 1".to_string(),
            ));
        }
        if self.partition_key_length == 0 || self.partition_key_length > MAX_PARTITION_KEY_LENGTH
        {
            return Err(GeneratorError::InvalidConfig(format!(
                "partition_key_length must be within 1..={MAX_PARTITION_KEY_LENGTH}, got {}",
                self.partition_key_length
            )));
        }
        let largest = self
            .largest_record()
            .saturating_add(self.partition_key_length);
        if largest > MAX_RECORD_BYTES {
            return Err(GeneratorError::InvalidConfig(format!(
                "records of up to {largest} bytes exceed the {MAX_RECORD_BYTES} byte record limit"
            )));
        }
        Ok(())
    }
}
