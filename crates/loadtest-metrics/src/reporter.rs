//! Periodic console output of the registry.

use crate::error::MetricsError;
use crate::registry::MetricsRegistry;
use crate::snapshot::RegistrySnapshot;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, Table};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default interval between two reports.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Markdown,
    Json,
}

/// Prints a snapshot of the registry to stdout at a fixed interval.
pub struct ConsoleReporter {
    registry: Arc<MetricsRegistry>,
    interval: Duration,
    format: ReportFormat,
}

impl ConsoleReporter {
    pub fn new(registry: Arc<MetricsRegistry>, interval: Duration, format: ReportFormat) -> Self {
        Self {
            registry,
            interval,
            format,
        }
    }

    /// Render and print the current snapshot once.
    pub fn report(&self) {
        match render(&self.registry.snapshot(), self.format) {
            Ok(output) => println!("{output}"),
            Err(e) => warn!("Failed to render metrics report: {}", e),
        }
    }

    /// Run the reporter on the current runtime until `shutdown` is cancelled.
    ///
    /// A final report is printed after cancellation so the totals of a run
    /// are always visible.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; skip the empty report.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => self.report(),
                }
            }

            debug!("Metrics reporter stopping");
            self.report();
        })
    }
}

/// Render a snapshot in the requested format.
pub fn render(snapshot: &RegistrySnapshot, format: ReportFormat) -> Result<String, MetricsError> {
    match format {
        ReportFormat::Table => Ok(format_table(snapshot)),
        ReportFormat::Markdown => Ok(format_markdown(snapshot)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
    }
}

/// Format a snapshot as console tables, one per metric kind.
pub fn format_table(snapshot: &RegistrySnapshot) -> String {
    let mut output = format!(
        "== Metrics at {} ==\n",
        snapshot.taken_at.format("%Y-%m-%dT%H:%M:%S")
    );

    if !snapshot.counters.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Counter", "Count"]);
        for (name, count) in &snapshot.counters {
            table.add_row(vec![Cell::new(name), numeric_cell(count.to_string())]);
        }
        output.push_str(&table.to_string());
        output.push('\n');
    }

    if !snapshot.meters.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Meter", "Count", "Mean/s", "1m/s", "5m/s", "15m/s"]);
        for (name, meter) in &snapshot.meters {
            let name_cell = if name.starts_with("Error/") && meter.count > 0 {
                Cell::new(name).fg(Color::Red)
            } else {
                Cell::new(name)
            };
            table.add_row(vec![
                name_cell,
                numeric_cell(format_number(meter.count)),
                numeric_cell(format!("{:.2}", meter.mean_rate)),
                numeric_cell(format!("{:.2}", meter.m1_rate)),
                numeric_cell(format!("{:.2}", meter.m5_rate)),
                numeric_cell(format!("{:.2}", meter.m15_rate)),
            ]);
        }
        output.push_str(&table.to_string());
        output.push('\n');
    }

    if !snapshot.timers.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            "Timer", "Count", "Mean/s", "Min ms", "Mean ms", "Max ms", "Stddev", "p50", "p95",
            "p99", "p999",
        ]);
        for (name, timer) in &snapshot.timers {
            table.add_row(vec![
                Cell::new(name),
                numeric_cell(format_number(timer.calls.count)),
                numeric_cell(format!("{:.2}", timer.calls.mean_rate)),
                numeric_cell(format!("{:.1}", timer.min_ms)),
                numeric_cell(format!("{:.1}", timer.mean_ms)),
                numeric_cell(format!("{:.1}", timer.max_ms)),
                numeric_cell(format!("{:.1}", timer.stddev_ms)),
                numeric_cell(format!("{:.1}", timer.p50_ms)),
                numeric_cell(format!("{:.1}", timer.p95_ms)),
                numeric_cell(format!("{:.1}", timer.p99_ms)),
                numeric_cell(format!("{:.1}", timer.p999_ms)),
            ]);
        }
        output.push_str(&table.to_string());
        output.push('\n');
    }

    if snapshot.is_empty() {
        output.push_str("(no metrics recorded yet)\n");
    }

    output
}

/// Format a snapshot as markdown.
pub fn format_markdown(snapshot: &RegistrySnapshot) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "## Metrics at {}\n\n",
        snapshot.taken_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if !snapshot.counters.is_empty() {
        output.push_str("| Counter | Count |\n");
        output.push_str("|---------|-------|\n");
        for (name, count) in &snapshot.counters {
            output.push_str(&format!("| {name} | {count} |\n"));
        }
        output.push('\n');
    }

    if !snapshot.meters.is_empty() {
        output.push_str("| Meter | Count | Mean/s | 1m/s | 5m/s | 15m/s |\n");
        output.push_str("|-------|-------|--------|------|------|-------|\n");
        for (name, meter) in &snapshot.meters {
            output.push_str(&format!(
                "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
                name,
                format_number(meter.count),
                meter.mean_rate,
                meter.m1_rate,
                meter.m5_rate,
                meter.m15_rate
            ));
        }
        output.push('\n');
    }

    if !snapshot.timers.is_empty() {
        output.push_str("| Timer | Count | Mean ms | p50 | p95 | p99 | Max ms |\n");
        output.push_str("|-------|-------|---------|-----|-----|-----|--------|\n");
        for (name, timer) in &snapshot.timers {
            output.push_str(&format!(
                "| {} | {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} |\n",
                name,
                format_number(timer.calls.count),
                timer.mean_ms,
                timer.p50_ms,
                timer.p95_ms,
                timer.p99_ms,
                timer.max_ms
            ));
        }
        output.push('\n');
    }

    output
}

fn numeric_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Format number with thousands separators.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}
