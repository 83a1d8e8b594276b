//! Duration tracking for scoped operations.

use crate::meter::Meter;
use crate::snapshot::TimerSnapshot;
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Significant figures kept by the duration histogram.
const HISTOGRAM_SIGFIG: u8 = 3;

/// Tracks how long an operation takes and how often it runs.
///
/// Durations are recorded in microseconds into an auto-resizing HDR
/// histogram, so arbitrarily long operations (unbounded backoff sleeps
/// included) are still captured.
pub struct Timer {
    calls: Meter,
    histogram: Mutex<Histogram<u64>>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            calls: Meter::new(),
            histogram: Mutex::new(
                Histogram::new(HISTOGRAM_SIGFIG).expect("3 significant figures is always valid"),
            ),
        }
    }

    /// Record one call that took `elapsed`.
    pub fn update(&self, elapsed: Duration) {
        self.calls.mark(1);
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        if let Err(e) = self.histogram.lock().record(micros) {
            warn!("Failed to record duration of {micros}us: {e}");
        }
    }

    /// Start timing. The returned context records on [`TimerContext::stop`]
    /// or, if never stopped, when dropped.
    pub fn start(&self) -> TimerContext<'_> {
        TimerContext {
            timer: self,
            started_at: Instant::now(),
            stopped: false,
        }
    }

    /// Await `future` and record how long it took, whatever it resolves to.
    pub async fn time<F: Future>(&self, future: F) -> F::Output {
        let context = self.start();
        let output = future.await;
        context.stop();
        output
    }

    /// Number of recorded calls.
    pub fn count(&self) -> u64 {
        self.calls.count()
    }

    /// Capture call rates and the duration distribution at this instant.
    pub fn snapshot(&self) -> TimerSnapshot {
        let calls = self.calls.snapshot();
        let histogram = self.histogram.lock();
        if histogram.is_empty() {
            return TimerSnapshot {
                calls,
                ..TimerSnapshot::default()
            };
        }

        let ms = |micros: u64| micros as f64 / 1000.0;
        TimerSnapshot {
            calls,
            min_ms: ms(histogram.min()),
            max_ms: ms(histogram.max()),
            mean_ms: histogram.mean() / 1000.0,
            stddev_ms: histogram.stdev() / 1000.0,
            p50_ms: ms(histogram.value_at_quantile(0.50)),
            p75_ms: ms(histogram.value_at_quantile(0.75)),
            p95_ms: ms(histogram.value_at_quantile(0.95)),
            p99_ms: ms(histogram.value_at_quantile(0.99)),
            p999_ms: ms(histogram.value_at_quantile(0.999)),
        }
    }
}

/// An in-progress timing started by [`Timer::start`].
#[must_use = "a timer context records when stopped or dropped"]
pub struct TimerContext<'a> {
    timer: &'a Timer,
    started_at: Instant,
    stopped: bool,
}

impl TimerContext<'_> {
    /// Record the elapsed time and return it.
    pub fn stop(mut self) -> Duration {
        self.stopped = true;
        let elapsed = self.started_at.elapsed();
        self.timer.update(elapsed);
        elapsed
    }
}

impl Drop for TimerContext<'_> {
    fn drop(&mut self) {
        if !self.stopped {
            self.timer.update(self.started_at.elapsed());
        }
    }
}
