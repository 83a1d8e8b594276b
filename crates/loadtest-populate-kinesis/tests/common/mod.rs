//! Scripted record sinks shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use loadtest_generator::Record;
use loadtest_populate_kinesis::{
    KinesisPopulatorError, PutRecordsResponse, RecordResult, RecordSink,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;

/// What the sink does on one call.
#[derive(Debug, Clone)]
pub enum Step {
    /// Fail the whole call.
    Transport,
    /// Reject the records at these positions, accept the others.
    Reject(Vec<usize>),
    /// Reject every record.
    RejectAll,
    /// Accept every record.
    AcceptAll,
    /// Accept every record but report this many failures anyway.
    MisreportFailures(usize),
}

/// Sink that plays back a script, then falls back to a fixed step.
pub struct ScriptedSink {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: Mutex<Vec<Vec<Record>>>,
    cancel_on_call: Option<CancellationToken>,
}

impl ScriptedSink {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: Step::AcceptAll,
            calls: Mutex::new(Vec::new()),
            cancel_on_call: None,
        }
    }

    pub fn accepting() -> Self {
        Self::new([])
    }

    pub fn rejecting_forever() -> Self {
        Self::new([]).with_fallback(Step::RejectAll)
    }

    pub fn with_fallback(mut self, fallback: Step) -> Self {
        self.fallback = fallback;
        self
    }

    /// Cancel `token` while the first call is in flight.
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_call = Some(token);
        self
    }

    /// Records submitted on every call so far, in call order.
    pub fn calls(&self) -> Vec<Vec<Record>> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

fn accepted(sequence: usize) -> RecordResult {
    RecordResult::Success {
        shard_id: "shardId-000000000000".to_string(),
        sequence_number: sequence.to_string(),
    }
}

fn rejected() -> RecordResult {
    RecordResult::Failed {
        error_code: "ProvisionedThroughputExceededException".to_string(),
        error_message: Some("Rate exceeded".to_string()),
    }
}

#[async_trait]
impl RecordSink for ScriptedSink {
    async fn put_records(
        &self,
        _stream: &str,
        records: &[Record],
    ) -> Result<PutRecordsResponse, KinesisPopulatorError> {
        self.calls.lock().push(records.to_vec());
        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }

        let step = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        let results = match step {
            Step::Transport => {
                return Err(KinesisPopulatorError::Transport(
                    "ProvisionedThroughputExceededException: Rate exceeded".to_string(),
                ))
            }
            Step::Reject(positions) => (0..records.len())
                .map(|i| {
                    if positions.contains(&i) {
                        rejected()
                    } else {
                        accepted(i)
                    }
                })
                .collect(),
            Step::RejectAll => records.iter().map(|_| rejected()).collect(),
            Step::AcceptAll => (0..records.len()).map(accepted).collect(),
            Step::MisreportFailures(failed_record_count) => {
                return Ok(PutRecordsResponse {
                    failed_record_count,
                    records: (0..records.len()).map(accepted).collect(),
                })
            }
        };

        Ok(PutRecordsResponse::from_results(results))
    }
}

/// Distinct records with recognizable payloads.
pub fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record::new(format!("payload-{i}"), format!("KEY{i:04}")))
        .collect()
}
