use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide runtime metrics (spec.md C14). Counters are lock-free
/// atomics; there is no metrics server here (unlike the teacher's
/// Prometheus endpoint) — `sw-cli`/callers poll `snapshot()` on the
/// interval configured by `MetricsConfig::report_interval` and log it
/// through the domain tracing macros.
pub struct RuntimeMetrics {
    images_analyzed_total: AtomicU64,
    cache_hits_total: AtomicU64,
    cache_misses_total: AtomicU64,
    waves_run_total: AtomicU64,
    waves_skipped_total: AtomicU64,
    waves_failed_total: AtomicU64,
    contradictions_total: AtomicU64,
    contradictions_rejected_total: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub images_analyzed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub waves_run: u64,
    pub waves_skipped: u64,
    pub waves_failed: u64,
    pub contradictions: u64,
    pub contradictions_rejected: u64,
}

impl Default for RuntimeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeMetrics {
    pub fn new() -> Self {
        Self {
            images_analyzed_total: AtomicU64::new(0),
            cache_hits_total: AtomicU64::new(0),
            cache_misses_total: AtomicU64::new(0),
            waves_run_total: AtomicU64::new(0),
            waves_skipped_total: AtomicU64::new(0),
            waves_failed_total: AtomicU64::new(0),
            contradictions_total: AtomicU64::new(0),
            contradictions_rejected_total: AtomicU64::new(0),
        }
    }

    pub fn inc_images_analyzed(&self) {
        self.images_analyzed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cache_hit(&self) {
        self.cache_hits_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cache_miss(&self) {
        self.cache_misses_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_wave_run(&self) {
        self.waves_run_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_wave_skipped(&self) {
        self.waves_skipped_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_wave_failed(&self) {
        self.waves_failed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_contradiction(&self) {
        self.contradictions_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_contradiction_rejected(&self) {
        self.contradictions_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            images_analyzed: self.images_analyzed_total.load(Ordering::Relaxed),
            cache_hits: self.cache_hits_total.load(Ordering::Relaxed),
            cache_misses: self.cache_misses_total.load(Ordering::Relaxed),
            waves_run: self.waves_run_total.load(Ordering::Relaxed),
            waves_skipped: self.waves_skipped_total.load(Ordering::Relaxed),
            waves_failed: self.waves_failed_total.load(Ordering::Relaxed),
            contradictions: self.contradictions_total.load(Ordering::Relaxed),
            contradictions_rejected: self.contradictions_rejected_total.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let metrics = RuntimeMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn increments_are_reflected_in_snapshot() {
        let metrics = RuntimeMetrics::new();
        metrics.inc_images_analyzed();
        metrics.inc_cache_hit();
        metrics.inc_wave_run();
        metrics.inc_wave_run();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.images_analyzed, 1);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.waves_run, 2);
    }
}
