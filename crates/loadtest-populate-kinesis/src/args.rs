//! CLI argument definitions for the Kinesis populator.

use crate::config::ProducerConfig;
use crate::simulated::SimulatedSinkConfig;
use clap::Args;
use loadtest_populate::CommonPopulateArgs;
use std::time::Duration;

/// Kinesis-specific populate arguments.
#[derive(Args, Clone, Debug)]
pub struct KinesisPopulateArgs {
    /// The name of the stream to push records to
    #[arg(long, short = 's')]
    pub stream: String,

    /// AWS region (default: resolved from the environment)
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Override the Kinesis endpoint, e.g. for LocalStack
    #[arg(long, env = "KINESIS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Dry-run only: probability that a single record is rejected
    #[arg(long, default_value = "0.0")]
    pub simulated_record_failure_rate: f64,

    /// Dry-run only: probability that a whole call fails
    #[arg(long, default_value = "0.0")]
    pub simulated_transport_failure_rate: f64,

    /// Dry-run only: latency added to every call, in milliseconds
    #[arg(long, default_value = "0")]
    pub simulated_latency_ms: u64,

    /// Dry-run only: number of shards records are spread over
    #[arg(long, default_value = "4")]
    pub simulated_shard_count: u32,

    #[command(flatten)]
    pub common: CommonPopulateArgs,
}

impl KinesisPopulateArgs {
    /// Producer configuration described by these arguments.
    pub fn producer_config(&self) -> ProducerConfig {
        ProducerConfig::new(self.stream.clone())
            .with_batch_size(self.common.batch_size)
            .with_parallelism(self.common.parallelism)
            .with_max_attempts(self.common.max_attempts)
            .with_batches_per_worker(self.common.batches_per_worker)
            .with_seed(self.common.seed)
            .with_records(self.common.record_config())
    }

    pub fn simulated_sink_config(&self) -> SimulatedSinkConfig {
        SimulatedSinkConfig {
            record_failure_rate: self.simulated_record_failure_rate,
            transport_failure_rate: self.simulated_transport_failure_rate,
            latency: Duration::from_millis(self.simulated_latency_ms),
            shard_count: self.simulated_shard_count,
        }
    }
}
