//! Process-wide store of named metrics.

use crate::counter::Counter;
use crate::meter::Meter;
use crate::snapshot::RegistrySnapshot;
use crate::timer::Timer;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type Metrics<T> = RwLock<HashMap<String, Arc<T>>>;

/// Named counters, meters and timers shared by every worker.
///
/// Metrics are created on first access and never removed. Callers on a hot
/// path should resolve the `Arc` handle once and update it directly instead
/// of looking the name up on every event.
#[derive(Default)]
pub struct MetricsRegistry {
    counters: Metrics<Counter>,
    meters: Metrics<Meter>,
    timers: Metrics<Timer>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the counter called `name`.
    pub fn counter(&self, name: &str) -> Arc<Counter> {
        get_or_create(&self.counters, name, Counter::new)
    }

    /// Get or create the meter called `name`.
    pub fn meter(&self, name: &str) -> Arc<Meter> {
        get_or_create(&self.meters, name, Meter::new)
    }

    /// Get or create the timer called `name`.
    pub fn timer(&self, name: &str) -> Arc<Timer> {
        get_or_create(&self.timers, name, Timer::new)
    }

    pub fn increment_counter(&self, name: &str, delta: i64) {
        self.counter(name).inc(delta);
    }

    pub fn decrement_counter(&self, name: &str, delta: i64) {
        self.counter(name).dec(delta);
    }

    pub fn mark_meter(&self, name: &str, count: u64) {
        self.meter(name).mark(count);
    }

    /// Capture every metric at this instant.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let counters = self
            .counters
            .read()
            .iter()
            .map(|(name, counter)| (name.clone(), counter.count()))
            .collect();
        let meters = self
            .meters
            .read()
            .iter()
            .map(|(name, meter)| (name.clone(), meter.snapshot()))
            .collect();
        let timers = self
            .timers
            .read()
            .iter()
            .map(|(name, timer)| (name.clone(), timer.snapshot()))
            .collect();

        RegistrySnapshot {
            taken_at: Utc::now(),
            counters,
            meters,
            timers,
        }
    }
}

fn get_or_create<T>(metrics: &Metrics<T>, name: &str, create: impl FnOnce() -> T) -> Arc<T> {
    if let Some(metric) = metrics.read().get(name) {
        return Arc::clone(metric);
    }
    let mut metrics = metrics.write();
    Arc::clone(
        metrics
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(create())),
    )
}
