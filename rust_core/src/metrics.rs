//! Runtime metrics: named counters and rolling-window histograms.
//!
//! Counters are lock-free AtomicU64s. Histograms keep the last
//! `WINDOW_SIZE` observations for min/max/avg/percentiles while count and
//! sum run over every observation ever made, so eviction never understates
//! traffic. The contract is increment/observe, not a wire format.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Observations kept for window statistics per histogram.
const WINDOW_SIZE: usize = 1000;

#[derive(Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, amount: u64) {
        self.value.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
struct HistogramInner {
    window: VecDeque<f64>,
    total_count: u64,
    total_sum: f64,
}

/// Rolling-window histogram. `count` and `sum` cover all observations;
/// the order statistics cover the current window only.
#[derive(Default)]
pub struct Histogram {
    inner: Mutex<HistogramInner>,
}

impl Histogram {
    pub fn observe(&self, value: f64) {
        let mut inner = self.inner.lock();
        inner.total_count += 1;
        inner.total_sum += value;
        inner.window.push_back(value);
        if inner.window.len() > WINDOW_SIZE {
            inner.window.pop_front();
        }
    }

    pub fn stats(&self) -> HistogramStats {
        let inner = self.inner.lock();
        if inner.window.is_empty() {
            return HistogramStats {
                count: inner.total_count,
                sum: inner.total_sum,
                ..HistogramStats::default()
            };
        }

        let mut sorted: Vec<f64> = inner.window.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        let window_sum: f64 = sorted.iter().sum();

        HistogramStats {
            count: inner.total_count,
            sum: inner.total_sum,
            min: sorted[0],
            max: sorted[n - 1],
            avg: window_sum / n as f64,
            p50: sorted[percentile_index(n, 0.50)],
            p95: sorted[percentile_index(n, 0.95)],
            p99: sorted[percentile_index(n, 0.99)],
        }
    }
}

/// Index of the p-th percentile in a sorted window of n values.
fn percentile_index(n: usize, p: f64) -> usize {
    if n <= 1 {
        return 0;
    }
    (((n - 1) as f64 * p) as usize).min(n - 1)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct HistogramStats {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Point-in-time export of every metric, sorted by name for stable logs.
#[derive(Clone, Debug, Serialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub histograms: BTreeMap<String, HistogramStats>,
}

/// Central registry. Shared across the slate run; get-or-create by name.
#[derive(Default)]
pub struct MetricsRegistry {
    counters: RwLock<FxHashMap<String, Arc<Counter>>>,
    histograms: RwLock<FxHashMap<String, Arc<Histogram>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> Arc<Counter> {
        if let Some(counter) = self.counters.read().get(name) {
            return Arc::clone(counter);
        }
        Arc::clone(self.counters.write().entry(name.to_string()).or_default())
    }

    pub fn histogram(&self, name: &str) -> Arc<Histogram> {
        if let Some(histogram) = self.histograms.read().get(name) {
            return Arc::clone(histogram);
        }
        Arc::clone(
            self.histograms
                .write()
                .entry(name.to_string())
                .or_default(),
        )
    }

    pub fn incr(&self, name: &str) {
        self.counter(name).inc();
    }

    pub fn incr_by(&self, name: &str, amount: u64) {
        self.counter(name).add(amount);
    }

    pub fn observe(&self, name: &str, value: f64) {
        self.histogram(name).observe(value);
    }

    /// Guard that records elapsed seconds into `name` when dropped.
    pub fn timer(&self, name: &str) -> Timer {
        Timer {
            histogram: self.histogram(name),
            started: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self
            .counters
            .read()
            .iter()
            .map(|(name, counter)| (name.clone(), counter.get()))
            .collect();
        let histograms = self
            .histograms
            .read()
            .iter()
            .map(|(name, histogram)| (name.clone(), histogram.stats()))
            .collect();
        MetricsSnapshot {
            counters,
            histograms,
        }
    }
}

pub struct Timer {
    histogram: Arc<Histogram>,
    started: Instant,
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.histogram.observe(self.started.elapsed().as_secs_f64());
    }
}
