//! Kinesis producer for the kinesis-producer-bench load testing harness.
//!
//! This crate pushes synthetic records into a Kinesis stream from a pool of
//! parallel producers and records every call in a shared
//! [`MetricsRegistry`](loadtest_metrics::MetricsRegistry).
//!
//! # Architecture
//!
//! ```text
//!   KinesisPopulator::run
//!          │ spawns `parallelism` producers
//!          ▼
//! ┌───────────────────────────────┐
//! │ Producer.N                    │
//! │                               │
//! │ RecordGenerator ─► Batcher    │
//! │                      │        │
//! │                      ▼        │
//! │              SubmissionEngine │──► MetricsRegistry (shared)
//! └──────────────────────┬────────┘
//!                        │ put_records
//!                        ▼
//!              dyn RecordSink (shared)
//!              ├── KinesisSink   (aws-sdk-kinesis)
//!              └── SimulatedSink (dry runs)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use loadtest_metrics::MetricsRegistry;
//! use loadtest_populate_kinesis::{KinesisPopulator, KinesisSink, ProducerConfig};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let sink = Arc::new(KinesisSink::from_env(None, None).await);
//!     let registry = Arc::new(MetricsRegistry::new());
//!     let config = ProducerConfig::new("benchmark")
//!         .with_batch_size(100)
//!         .with_parallelism(4)
//!         .with_batches_per_worker(Some(1000));
//!
//!     let populator = KinesisPopulator::new(sink, registry, config)?;
//!     let metrics = populator.run(CancellationToken::new()).await?;
//!     println!("Pushed {} records in {:?}", metrics.records_delivered, metrics.total_duration);
//!
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod backoff;
pub mod config;
pub mod engine;
pub mod error;
pub mod kinesis;
pub mod populator;
pub mod simulated;
pub mod sink;

pub use args::KinesisPopulateArgs;
pub use backoff::ExponentialBackoff;
pub use config::{ProducerConfig, MAX_RECORDS_PER_REQUEST};
pub use engine::{metric_names, BatchOutcome, SubmissionEngine};
pub use error::KinesisPopulatorError;
pub use kinesis::KinesisSink;
pub use populator::{KinesisPopulator, PopulateMetrics};
pub use simulated::{SimulatedSink, SimulatedSinkConfig};
pub use sink::{PutRecordsResponse, RecordResult, RecordSink};
