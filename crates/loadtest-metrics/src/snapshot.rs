//! Point-in-time views of the registry, used by reporters.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Count and rates of a meter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeterSnapshot {
    pub count: u64,
    /// Events per second since creation
    pub mean_rate: f64,
    pub m1_rate: f64,
    pub m5_rate: f64,
    pub m15_rate: f64,
}

/// Call rates and duration distribution of a timer, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub calls: MeterSnapshot,
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub stddev_ms: f64,
    pub p50_ms: f64,
    pub p75_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub p999_ms: f64,
}

/// Every metric in a registry, sorted by name.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub taken_at: DateTime<Utc>,
    pub counters: BTreeMap<String, i64>,
    pub meters: BTreeMap<String, MeterSnapshot>,
    pub timers: BTreeMap<String, TimerSnapshot>,
}

impl RegistrySnapshot {
    /// Count of a meter, or zero if it was never marked.
    pub fn meter_count(&self, name: &str) -> u64 {
        self.meters.get(name).map(|m| m.count).unwrap_or(0)
    }

    /// Count of a timer, or zero if it never recorded.
    pub fn timer_count(&self, name: &str) -> u64 {
        self.timers.get(name).map(|t| t.calls.count).unwrap_or(0)
    }

    /// Value of a counter, or zero if it was never touched.
    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty() && self.meters.is_empty() && self.timers.is_empty()
    }
}
