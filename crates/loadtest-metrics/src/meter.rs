//! Event rate tracking.
//!
//! A [`Meter`] counts events and estimates their rate three ways: the mean
//! rate since creation, and exponentially-weighted moving averages over one,
//! five and fifteen minutes. The moving averages are advanced in fixed
//! five-second ticks, lazily, whenever the meter is marked or read.

use crate::snapshot::MeterSnapshot;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Interval at which the moving averages are advanced.
pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Exponentially-weighted moving average of a per-second rate.
#[derive(Debug, Clone)]
pub struct Ewma {
    alpha: f64,
    rate: f64,
    initialized: bool,
}

impl Ewma {
    /// Moving average whose weight decays by `1/e` every `minutes`.
    pub fn over_minutes(minutes: f64) -> Self {
        let ticks_per_window = minutes * 60.0 / TICK_INTERVAL.as_secs_f64();
        Self {
            alpha: 1.0 - (-1.0 / ticks_per_window).exp(),
            rate: 0.0,
            initialized: false,
        }
    }

    /// Fold `count` events observed during one tick into the average.
    pub fn tick(&mut self, count: u64) {
        let instant_rate = count as f64 / TICK_INTERVAL.as_secs_f64();
        if self.initialized {
            self.rate += self.alpha * (instant_rate - self.rate);
        } else {
            self.rate = instant_rate;
            self.initialized = true;
        }
    }

    /// Current rate in events per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

#[derive(Debug)]
struct MovingAverages {
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
    last_tick: Instant,
}

/// Counts events and tracks their rate over time.
#[derive(Debug)]
pub struct Meter {
    count: AtomicU64,
    /// Events not yet folded into the moving averages
    uncounted: AtomicU64,
    started_at: Instant,
    averages: Mutex<MovingAverages>,
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

impl Meter {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            count: AtomicU64::new(0),
            uncounted: AtomicU64::new(0),
            started_at: now,
            averages: Mutex::new(MovingAverages {
                m1: Ewma::over_minutes(1.0),
                m5: Ewma::over_minutes(5.0),
                m15: Ewma::over_minutes(15.0),
                last_tick: now,
            }),
        }
    }

    /// Record `n` occurrences of the event.
    pub fn mark(&self, n: u64) {
        self.tick_if_necessary();
        self.count.fetch_add(n, Ordering::Relaxed);
        self.uncounted.fetch_add(n, Ordering::Relaxed);
    }

    /// Total number of events recorded.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Events per second since the meter was created.
    pub fn mean_rate(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.count() as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn one_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.averages.lock().m1.rate()
    }

    pub fn five_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.averages.lock().m5.rate()
    }

    pub fn fifteen_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.averages.lock().m15.rate()
    }

    /// Capture count and rates at this instant.
    pub fn snapshot(&self) -> MeterSnapshot {
        self.tick_if_necessary();
        let averages = self.averages.lock();
        MeterSnapshot {
            count: self.count(),
            mean_rate: self.mean_rate(),
            m1_rate: averages.m1.rate(),
            m5_rate: averages.m5.rate(),
            m15_rate: averages.m15.rate(),
        }
    }

    fn tick_if_necessary(&self) {
        let mut averages = self.averages.lock();
        let age = averages.last_tick.elapsed();
        if age < TICK_INTERVAL {
            return;
        }

        let ticks = (age.as_nanos() / TICK_INTERVAL.as_nanos()) as u32;
        averages.last_tick += TICK_INTERVAL * ticks;

        // Pending events belong to the first elapsed tick; the rest were idle.
        let mut pending = self.uncounted.swap(0, Ordering::Relaxed);
        for _ in 0..ticks {
            averages.m1.tick(pending);
            averages.m5.tick(pending);
            averages.m15.tick(pending);
            pending = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_one_minute_ewma_decay() {
        let mut ewma = Ewma::over_minutes(1.0);
        ewma.tick(3);
        assert_close(ewma.rate(), 0.6);

        // One minute of idle ticks decays the rate by 1/e.
        for _ in 0..12 {
            ewma.tick(0);
        }
        assert_close(ewma.rate(), 0.6 * (-1.0f64).exp());
    }

    #[test]
    fn test_five_minute_ewma_decays_slower() {
        let mut m1 = Ewma::over_minutes(1.0);
        let mut m5 = Ewma::over_minutes(5.0);
        m1.tick(3);
        m5.tick(3);
        for _ in 0..12 {
            m1.tick(0);
            m5.tick(0);
        }
        assert!(m5.rate() > m1.rate());
        assert_close(m5.rate(), 0.6 * (-0.2f64).exp());
    }

    #[test]
    fn test_mark_counts() {
        let meter = Meter::new();
        meter.mark(1);
        meter.mark(4);
        assert_eq!(meter.count(), 5);
        assert_eq!(meter.snapshot().count, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rates_after_tick() {
        let meter = Meter::new();
        meter.mark(3);

        tokio::time::advance(TICK_INTERVAL).await;

        assert_close(meter.one_minute_rate(), 0.6);
        assert_close(meter.five_minute_rate(), 0.6);
        assert_close(meter.fifteen_minute_rate(), 0.6);
        assert_close(meter.mean_rate(), 0.6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rates_decay_while_idle() {
        let meter = Meter::new();
        meter.mark(3);

        tokio::time::advance(TICK_INTERVAL).await;
        let first = meter.one_minute_rate();

        tokio::time::advance(Duration::from_secs(60)).await;
        let later = meter.one_minute_rate();

        assert_close(later, first * (-1.0f64).exp());
    }
}
