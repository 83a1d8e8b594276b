//! Metrics registry for the kinesis-producer-bench load testing harness.
//!
//! All producer workers share one [`MetricsRegistry`] through an `Arc`. The
//! registry hands out named metrics on first use and keeps them for the life
//! of the process:
//!
//! - [`Counter`] - signed count that can go up and down
//! - [`Meter`] - event count with mean and 1/5/15-minute moving rates
//! - [`Timer`] - meter of calls plus an HDR histogram of durations
//!
//! Updates are atomic or guarded per metric, so concurrent writers never lose
//! an update. The [`ConsoleReporter`] periodically renders a
//! [`RegistrySnapshot`] to stdout.
//!
//! # Example
//!
//! ```rust
//! use loadtest_metrics::MetricsRegistry;
//!
//! let registry = MetricsRegistry::new();
//! registry.mark_meter("Success/Calls", 1);
//! registry.increment_counter("Producers/Active", 1);
//!
//! let snapshot = registry.snapshot();
//! assert_eq!(snapshot.meters["Success/Calls"].count, 1);
//! ```

pub mod counter;
pub mod error;
pub mod meter;
pub mod registry;
pub mod reporter;
pub mod snapshot;
pub mod timer;

pub use counter::Counter;
pub use error::MetricsError;
pub use meter::Meter;
pub use registry::MetricsRegistry;
pub use reporter::{render, ConsoleReporter, ReportFormat, DEFAULT_REPORT_INTERVAL};
pub use snapshot::{MeterSnapshot, RegistrySnapshot, TimerSnapshot};
pub use timer::{Timer, TimerContext};
