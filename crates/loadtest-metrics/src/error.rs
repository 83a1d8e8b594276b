//! Error types for metrics reporting.

use thiserror::Error;

/// Errors that can occur while rendering metrics.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
