//! Metrics collection and reporting for batch jobs

use crate::job::JobStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics collector for batch job monitoring.
///
/// Counts are kept in-process for reporting and also forwarded to the
/// `metrics` facade, which is a no-op unless a recorder is installed.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    jobs_started: AtomicU64,
    jobs_completed: AtomicU64,
    jobs_failed: AtomicU64,
    items_processed: AtomicU64,
    item_errors: AtomicU64,
    total_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                jobs_started: AtomicU64::new(0),
                jobs_completed: AtomicU64::new(0),
                jobs_failed: AtomicU64::new(0),
                items_processed: AtomicU64::new(0),
                item_errors: AtomicU64::new(0),
                total_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record a job reaching `status`
    pub fn record_job(&self, status: JobStatus) {
        let counter = match status {
            JobStatus::Processing => &self.inner.jobs_started,
            JobStatus::Completed => &self.inner.jobs_completed,
            JobStatus::Failed => &self.inner.jobs_failed,
            JobStatus::Pending => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("sentiscope_jobs_total", "status" => status.as_str()).increment(1);
    }

    /// Record rows processed by a finished batch
    pub fn record_items(&self, processed: u64, errors: u64) {
        self.inner
            .items_processed
            .fetch_add(processed, Ordering::Relaxed);
        self.inner.item_errors.fetch_add(errors, Ordering::Relaxed);
    }

    /// Record batch latency
    pub fn record_latency(&self, latency_us: u64) {
        self.inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_started: self.inner.jobs_started.load(Ordering::Relaxed),
            jobs_completed: self.inner.jobs_completed.load(Ordering::Relaxed),
            jobs_failed: self.inner.jobs_failed.load(Ordering::Relaxed),
            items_processed: self.inner.items_processed.load(Ordering::Relaxed),
            item_errors: self.inner.item_errors.load(Ordering::Relaxed),
            total_latency_us: self.inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub jobs_started: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub items_processed: u64,
    pub item_errors: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per completed job
    pub fn avg_latency_us(&self) -> u64 {
        if self.jobs_completed == 0 {
            0
        } else {
            self.total_latency_us / self.jobs_completed
        }
    }

    /// Fraction of processed rows that failed
    pub fn error_rate(&self) -> f64 {
        if self.items_processed == 0 {
            0.0
        } else {
            self.item_errors as f64 / self.items_processed as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let metrics = MetricsCollector::new();

        metrics.record_job(JobStatus::Pending);
        metrics.record_job(JobStatus::Processing);
        metrics.record_job(JobStatus::Completed);
        metrics.record_items(10, 2);
        metrics.record_latency(5000);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.jobs_started, 1);
        assert_eq!(snapshot.jobs_completed, 1);
        assert_eq!(snapshot.jobs_failed, 0);
        assert_eq!(snapshot.items_processed, 10);
        assert_eq!(snapshot.avg_latency_us(), 5000);
        assert!((snapshot.error_rate() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = MetricsCollector::new();
        let clone = metrics.clone();
        clone.record_job(JobStatus::Failed);
        assert_eq!(metrics.snapshot().jobs_failed, 1);
    }
}
