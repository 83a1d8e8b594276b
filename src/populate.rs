//! Wiring of the populate run: sink selection, reporting and shutdown.

use anyhow::Context;
use loadtest_metrics::{ConsoleReporter, MetricsRegistry, ReportFormat};
use loadtest_populate_kinesis::{
    KinesisPopulateArgs, KinesisPopulator, KinesisSink, PopulateMetrics, RecordSink,
    SimulatedSink,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn run_populate(
    args: KinesisPopulateArgs,
    report_interval: Duration,
    report_format: ReportFormat,
) -> anyhow::Result<()> {
    let config = args.producer_config();
    config.validate().context("Invalid producer configuration")?;

    let sink: Arc<dyn RecordSink> = if args.common.dry_run {
        info!("Dry-run mode: records go to a simulated stream");
        Arc::new(
            SimulatedSink::new(args.simulated_sink_config(), args.common.seed)
                .context("Invalid simulated stream configuration")?,
        )
    } else {
        Arc::new(KinesisSink::from_env(args.region.clone(), args.endpoint_url.clone()).await)
    };

    let registry = Arc::new(MetricsRegistry::new());
    let shutdown = CancellationToken::new();
    spawn_interrupt_handler(shutdown.clone());

    let reporter_shutdown = CancellationToken::new();
    let reporter = ConsoleReporter::new(Arc::clone(&registry), report_interval, report_format)
        .spawn(reporter_shutdown.clone());

    let populator = KinesisPopulator::new(sink, registry, config)
        .context("Failed to create Kinesis populator")?;
    let result = populator.run(shutdown).await;

    // The reporter prints one last snapshot before exiting.
    reporter_shutdown.cancel();
    reporter.await.context("Metrics reporter failed")?;

    let metrics = result.context("Failed to populate stream")?;
    log_summary(&args.stream, &metrics);
    Ok(())
}

fn spawn_interrupt_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install CTRL+C signal handler: {}", e);
            return;
        }

        info!("Received interrupt signal (Ctrl+C), stopping producers");
        shutdown.cancel();
    });
}

fn log_summary(stream: &str, metrics: &PopulateMetrics) {
    info!(
        "Populated {}: {} records in {} batches over {:?} ({:.2} records/sec)",
        stream,
        metrics.records_delivered,
        metrics.batches_delivered,
        metrics.total_duration,
        metrics.records_per_second()
    );
    if metrics.batches_dropped > 0 {
        tracing::warn!(
            "{} batches ({} records) were dropped after reaching the attempt ceiling",
            metrics.batches_dropped,
            metrics.records_dropped
        );
    }
}
