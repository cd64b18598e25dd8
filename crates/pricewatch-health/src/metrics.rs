//! Process-wide request counters.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// How the running latency figure is maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatencyEstimator {
    /// Each sample is averaged with the previous estimate:
    /// `estimate = (estimate + sample) / 2`. The first sample seeds the
    /// estimate. Recent requests dominate; old ones decay geometrically.
    #[default]
    Blended,
    /// True arithmetic mean over every recorded sample.
    ArithmeticMean,
}

/// A consistent read of [`RequestMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MetricsSnapshot {
    pub total: u64,
    pub success: u64,
    pub error: u64,
    pub cache_hits: u64,
    pub average_response_time_ms: f64,
}

impl MetricsSnapshot {
    /// Fraction of completed requests that failed, or 0 with no traffic.
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.error as f64 / self.total as f64
        }
    }

    /// Cache hits relative to completed requests plus hits.
    pub fn cache_hit_rate(&self) -> f64 {
        let lookups = self.total + self.cache_hits;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    total: u64,
    success: u64,
    error: u64,
    cache_hits: u64,
    average_ms: f64,
    latency_sum_ms: f64,
}

/// Running request counters and latency estimate.
///
/// All counters sit behind one mutex so a [`snapshot`](Self::snapshot) always
/// satisfies `total == success + error`.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    estimator: LatencyEstimator,
    counters: Mutex<Counters>,
}

impl RequestMetrics {
    pub fn new(estimator: LatencyEstimator) -> Self {
        Self {
            estimator,
            counters: Mutex::new(Counters::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records one completed request.
    pub fn record_outcome(&self, success: bool, latency_ms: f64) {
        let latency_ms = if latency_ms.is_finite() {
            latency_ms.max(0.0)
        } else {
            0.0
        };

        let mut c = self.lock();
        c.total += 1;
        if success {
            c.success += 1;
        } else {
            c.error += 1;
        }

        c.latency_sum_ms += latency_ms;
        c.average_ms = match self.estimator {
            LatencyEstimator::Blended if c.total == 1 => latency_ms,
            LatencyEstimator::Blended => (c.average_ms + latency_ms) / 2.0,
            LatencyEstimator::ArithmeticMean => c.latency_sum_ms / c.total as f64,
        };
    }

    /// Records a request answered from the cache.
    pub fn record_cache_hit(&self) {
        self.lock().cache_hits += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = self.lock();
        MetricsSnapshot {
            total: c.total,
            success: c.success,
            error: c.error,
            cache_hits: c.cache_hits,
            average_response_time_ms: c.average_ms,
        }
    }

    pub fn estimator(&self) -> LatencyEstimator {
        self.estimator
    }
}
