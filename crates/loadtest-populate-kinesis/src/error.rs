//! Error types for the Kinesis populator.

use loadtest_generator::GeneratorError;
use thiserror::Error;

/// Errors that can occur while producing records.
///
/// Only `InvalidConfig` and `Worker` ever reach the caller of
/// [`KinesisPopulator::run`](crate::KinesisPopulator::run). Call-level
/// failures are absorbed by the submission engine and surface as metrics.
#[derive(Error, Debug)]
pub enum KinesisPopulatorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request build error: {0}")]
    RequestBuild(String),

    #[error("Producer task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<GeneratorError> for KinesisPopulatorError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::InvalidConfig(msg) => KinesisPopulatorError::InvalidConfig(msg),
        }
    }
}
