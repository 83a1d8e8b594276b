//! The put-records seam between the submission engine and the stream service.

use crate::error::KinesisPopulatorError;
use async_trait::async_trait;
use loadtest_generator::Record;

/// Outcome of one record within a put-records call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordResult {
    Success {
        shard_id: String,
        sequence_number: String,
    },
    Failed {
        error_code: String,
        error_message: Option<String>,
    },
}

impl RecordResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, RecordResult::Failed { .. })
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            RecordResult::Failed { error_code, .. } => Some(error_code),
            RecordResult::Success { .. } => None,
        }
    }
}

/// Response of a put-records call that reached the service.
///
/// `records` is aligned positionally with the submitted records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutRecordsResponse {
    pub failed_record_count: usize,
    pub records: Vec<RecordResult>,
}

impl PutRecordsResponse {
    /// Build a response, deriving the failed count from the per-record results.
    pub fn from_results(records: Vec<RecordResult>) -> Self {
        let failed_record_count = records.iter().filter(|r| r.is_failed()).count();
        Self {
            failed_record_count,
            records,
        }
    }

    pub fn is_partial_failure(&self) -> bool {
        self.failed_record_count > 0
    }
}

/// Destination of record batches.
///
/// An `Err` means the call itself failed (throttled, network, rejected
/// request) and no record in it is known to be stored. An `Ok` may still
/// report per-record failures.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn put_records(
        &self,
        stream: &str,
        records: &[Record],
    ) -> Result<PutRecordsResponse, KinesisPopulatorError>;
}
