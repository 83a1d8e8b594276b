//! Record generator producing an unbounded stream of synthetic records.

use crate::config::{CorpusMode, RecordGeneratorConfig};
use crate::record::Record;
use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Characters used for payloads and partition keys.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Configuration the generator or batcher cannot honor
    #[error("Invalid generator configuration: {0}")]
    InvalidConfig(String),
}

/// Generator of synthetic records.
///
/// Each call to [`Iterator::next`] draws a payload length uniformly from
/// `[min_length, max_length]`, inflates it by `oversize_multiplier` with
/// probability `oversize_probability` (clipped to the corpus in
/// [`CorpusMode::Reuse`]), and pairs the payload with a fresh
/// random partition key. The iterator never ends.
pub struct RecordGenerator {
    config: RecordGeneratorConfig,
    rng: StdRng,
    /// Shared payload source in the corpus-reuse modes; empty otherwise.
    corpus: Bytes,
    /// Number of records generated so far
    index: u64,
}

impl RecordGenerator {
    /// Create a new generator.
    ///
    /// With `seed` set the generated stream is reproducible; otherwise the
    /// RNG is seeded from the operating system.
    pub fn new(config: RecordGeneratorConfig, seed: Option<u64>) -> Result<Self, GeneratorError> {
        config.validate()?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let corpus = match config.corpus {
            CorpusMode::Reuse | CorpusMode::Extended => {
                Bytes::from(random_bytes(&mut rng, config.largest_record()))
            }
            CorpusMode::Fresh => Bytes::new(),
        };

        Ok(Self {
            config,
            rng,
            corpus,
            index: 0,
        })
    }

    /// Get the number of records generated so far.
    pub fn current_index(&self) -> u64 {
        self.index
    }

    /// Get the generator configuration.
    pub fn config(&self) -> &RecordGeneratorConfig {
        &self.config
    }

    /// Generate the next record.
    pub fn next_record(&mut self) -> Record {
        let length = self.next_length();

        let data = match self.config.corpus {
            CorpusMode::Reuse | CorpusMode::Extended => {
                self.corpus.slice(..length.min(self.corpus.len()))
            }
            CorpusMode::Fresh => Bytes::from(random_bytes(&mut self.rng, length)),
        };
        let partition_key = random_string(&mut self.rng, self.config.partition_key_length);

        self.index += 1;

        Record {
            data,
            partition_key,
        }
    }

    fn next_length(&mut self) -> usize {
        let base = self
            .rng
            .random_range(self.config.min_length..=self.config.max_length);
        if self.rng.random_bool(self.config.oversize_probability) {
            base * self.config.oversize_multiplier
        } else {
            base
        }
    }
}

impl Iterator for RecordGenerator {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_record())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

fn random_bytes<R: Rng>(rng: &mut R, length: usize) -> Vec<u8> {
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())])
        .collect()
}

fn random_string<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RecordGeneratorConfig {
        RecordGeneratorConfig::default().with_length_range(10, 20)
    }

    #[test]
    fn test_lengths_within_range() {
        let config = small_config().with_oversize(0.0, 10);
        let mut generator = RecordGenerator::new(config, Some(42)).unwrap();

        for record in generator.by_ref().take(500) {
            assert!((10..=20).contains(&record.data.len()));
            assert_eq!(record.partition_key.len(), 32);
        }
        assert_eq!(generator.current_index(), 500);
    }

    #[test]
    fn test_oversized_records_clip_to_corpus() {
        let config = small_config().with_oversize(1.0, 10);
        let generator = RecordGenerator::new(config, Some(7)).unwrap();

        for record in generator.take(200) {
            assert_eq!(record.data.len(), 20);
        }
    }

    #[test]
    fn test_default_oversized_records_stay_at_max_length() {
        let config = RecordGeneratorConfig::default().with_oversize(1.0, 10);
        let mut generator = RecordGenerator::new(config, Some(1)).unwrap();

        assert_eq!(generator.next_record().data.len(), 2500);
    }

    #[test]
    fn test_always_oversized_with_extended_corpus() {
        let config = small_config()
            .with_oversize(1.0, 10)
            .with_corpus(CorpusMode::Extended);
        let generator = RecordGenerator::new(config, Some(7)).unwrap();

        for record in generator.take(200) {
            let len = record.data.len();
            assert!((100..=200).contains(&len));
            assert_eq!(len % 10, 0);
        }
    }

    #[test]
    fn test_oversize_share_is_roughly_five_percent() {
        let config = small_config().with_corpus(CorpusMode::Extended);
        let generator = RecordGenerator::new(config, Some(1)).unwrap();

        let oversized = generator
            .take(10_000)
            .filter(|r| r.data.len() > 20)
            .count();
        assert!((300..=700).contains(&oversized), "got {oversized}");
    }

    #[test]
    fn test_reuse_mode_shares_corpus_prefix() {
        let config = small_config().with_oversize(0.0, 10);
        let mut generator = RecordGenerator::new(config, Some(3)).unwrap();

        let a = generator.next_record();
        let b = generator.next_record();
        let shorter = a.data.len().min(b.data.len());
        assert_eq!(a.data[..shorter], b.data[..shorter]);
    }

    #[test]
    fn test_fresh_mode_randomizes_content() {
        let config = RecordGeneratorConfig::default()
            .with_length_range(64, 64)
            .with_oversize(0.0, 10)
            .with_corpus(CorpusMode::Fresh);
        let mut generator = RecordGenerator::new(config, Some(3)).unwrap();

        let a = generator.next_record();
        let b = generator.next_record();
        assert_eq!(a.data.len(), 64);
        assert_ne!(a.data, b.data);
    }

    #[test]
    fn test_partition_keys_are_alphanumeric_and_fresh() {
        let generator = RecordGenerator::new(small_config(), Some(9)).unwrap();
        let keys: Vec<String> = generator.take(50).map(|r| r.partition_key).collect();

        for key in &keys {
            assert!(key
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_deterministic_generation() {
        let mut gen1 = RecordGenerator::new(small_config(), Some(42)).unwrap();
        let mut gen2 = RecordGenerator::new(small_config(), Some(42)).unwrap();

        for _ in 0..20 {
            assert_eq!(gen1.next_record(), gen2.next_record());
        }
    }

    #[test]
    fn test_oversized_corpus_rejected_before_allocating() {
        let config = RecordGeneratorConfig::default().with_length_range(1500, usize::MAX / 4);
        assert!(matches!(
            RecordGenerator::new(config, None),
            Err(GeneratorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = small_config().with_length_range(20, 10);
        assert!(matches!(
            RecordGenerator::new(config, None),
            Err(GeneratorError::InvalidConfig(_))
        ));
    }
}
