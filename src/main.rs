//! Command-line interface for kinesis-producer-bench
//!
//! # Usage Examples
//!
//! ```bash
//! # Four producers pushing 100-record batches until Ctrl+C
//! kinesis-producer-bench --stream benchmark --batch-size 100 --parallelism 4
//!
//! # Bounded run against LocalStack, giving up on a batch after 10 calls
//! kinesis-producer-bench --stream benchmark \
//!   --endpoint-url http://localhost:4566 --region us-east-1 \
//!   --batches-per-worker 1000 --max-attempts 10
//!
//! # No AWS at all: simulated stream rejecting 5% of records
//! kinesis-producer-bench --stream benchmark --dry-run \
//!   --simulated-record-failure-rate 0.05 --report-format markdown
//! ```

mod populate;

use clap::{Parser, ValueEnum};
use loadtest_metrics::{ReportFormat, DEFAULT_REPORT_INTERVAL};
use loadtest_populate_kinesis::KinesisPopulateArgs;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Noisy dependencies kept at `warn` unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: &[&str] = &["aws_config", "aws_smithy_runtime", "aws_sdk_kinesis", "hyper"];

#[derive(Parser)]
#[command(name = "kinesis-producer-bench")]
#[command(about = "Push synthetic records into a Kinesis stream and report throughput")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Seconds between two metrics reports
    #[arg(long, default_value_t = DEFAULT_REPORT_INTERVAL.as_secs())]
    report_interval_secs: u64,

    /// Format of the metrics reports
    #[arg(long, value_enum, default_value = "table")]
    report_format: ReportFormatChoice,

    #[command(flatten)]
    populate: KinesisPopulateArgs,
}

/// Report format choice for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormatChoice {
    Table,
    Markdown,
    Json,
}

impl From<ReportFormatChoice> for ReportFormat {
    fn from(choice: ReportFormatChoice) -> Self {
        match choice {
            ReportFormatChoice::Table => ReportFormat::Table,
            ReportFormatChoice::Markdown => ReportFormat::Markdown,
            ReportFormatChoice::Json => ReportFormat::Json,
        }
    }
}

impl Cli {
    fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs.max(1))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    tracing::debug!("Starting up. Args: {:?}", cli.populate);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if debug { "debug" } else { "info" };
        let directives = QUIET_TARGETS
            .iter()
            .map(|target| format!("{target}=warn"))
            .fold(level.to_string(), |acc, directive| format!("{acc},{directive}"));
        EnvFilter::new(directives)
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // One runtime thread per producer; the reporter and signal handler
    // share them.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cli.populate.common.parallelism.max(1))
        .enable_all()
        .build()?;

    let interval = cli.report_interval();
    let format = cli.report_format.into();
    runtime.block_on(populate::run_populate(cli.populate, interval, format))
}
