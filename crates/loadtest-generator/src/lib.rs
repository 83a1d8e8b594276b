//! Synthetic record generator for the kinesis-producer-bench load testing harness.
//!
//! This crate provides the `RecordGenerator` which produces an unbounded, lazy
//! stream of records with randomized payload size and partition key, and the
//! `Batcher` which groups any stream into fixed-size batches.
//!
//! # Architecture
//!
//! ```text
//! RecordGeneratorConfig
//!        │
//!        ▼
//! ┌───────────────────┐
//! │  RecordGenerator  │
//! │                   │
//! │  - rng (StdRng)   │
//! │  - corpus (Bytes) │
//! └─────────┬─────────┘
//!           │  Iterator<Item = Record>
//!           ▼
//! ┌───────────────────┐
//! │      Batcher      │
//! └─────────┬─────────┘
//!           │  Iterator<Item = Vec<Record>>
//!           ▼
//!     submission engine
//! ```
//!
//! # Example
//!
//! ```rust
//! use loadtest_generator::{Batcher, RecordGenerator, RecordGeneratorConfig};
//!
//! let generator = RecordGenerator::new(RecordGeneratorConfig::default(), Some(42)).unwrap();
//! let mut batches = Batcher::new(generator, 10).unwrap();
//!
//! let batch = batches.next().unwrap();
//! assert_eq!(batch.len(), 10);
//! ```

pub mod batcher;
pub mod config;
pub mod generator;
pub mod record;

// Re-exports for convenience
pub use batcher::Batcher;
pub use config::{CorpusMode, RecordGeneratorConfig};
pub use generator::{GeneratorError, RecordGenerator};
pub use record::Record;
