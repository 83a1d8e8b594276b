//! Amazon Kinesis Data Streams implementation of [`RecordSink`].

use crate::error::KinesisPopulatorError;
use crate::sink::{PutRecordsResponse, RecordResult, RecordSink};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kinesis::config::Region;
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::types::{PutRecordsRequestEntry, PutRecordsResultEntry};
use aws_sdk_kinesis::Client;
use loadtest_generator::Record;
use tracing::info;

/// Sink backed by the Kinesis PutRecords API.
///
/// The SDK client pools connections internally, so one sink is shared by
/// every producer.
#[derive(Clone)]
pub struct KinesisSink {
    client: Client,
}

impl KinesisSink {
    /// Wrap an existing SDK client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential and region chain.
    ///
    /// # Arguments
    ///
    /// * `region` - Region override (e.g., "eu-west-1")
    /// * `endpoint_url` - Endpoint override, for local emulators
    pub async fn from_env(region: Option<String>, endpoint_url: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint_url) = endpoint_url {
            info!("Using Kinesis endpoint override {}", endpoint_url);
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl RecordSink for KinesisSink {
    async fn put_records(
        &self,
        stream: &str,
        records: &[Record],
    ) -> Result<PutRecordsResponse, KinesisPopulatorError> {
        let entries = records
            .iter()
            .map(|record| {
                PutRecordsRequestEntry::builder()
                    .data(Blob::new(record.data.to_vec()))
                    .partition_key(&record.partition_key)
                    .build()
                    .map_err(|e| KinesisPopulatorError::RequestBuild(e.to_string()))
            })
            .collect::<Result<Vec<_>, KinesisPopulatorError>>()?;

        let output = self
            .client
            .put_records()
            .stream_name(stream)
            .set_records(Some(entries))
            .send()
            .await
            .map_err(|e| KinesisPopulatorError::Transport(DisplayErrorContext(&e).to_string()))?;

        Ok(PutRecordsResponse {
            failed_record_count: output.failed_record_count().unwrap_or(0).max(0) as usize,
            records: output.records().iter().map(to_record_result).collect(),
        })
    }
}

fn to_record_result(entry: &PutRecordsResultEntry) -> RecordResult {
    match entry.error_code() {
        Some(error_code) => RecordResult::Failed {
            error_code: error_code.to_string(),
            error_message: entry.error_message().map(str::to_string),
        },
        None => RecordResult::Success {
            shard_id: entry.shard_id().unwrap_or_default().to_string(),
            sequence_number: entry.sequence_number().unwrap_or_default().to_string(),
        },
    }
}
