//! Prometheus metrics collector for Resq
//!
//! Provides job throughput and timing metrics for monitoring.

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Instant;

/// Resq metrics collector
///
/// Collects metrics for pushed, performed and failed jobs.
#[derive(Clone)]
pub struct ResqMetrics {
    registry: Arc<Registry>,

    // Job counters
    jobs_pushed_total: IntCounterVec,
    jobs_processed_total: IntCounterVec,
    jobs_failed_total: IntCounterVec,

    // Job timing
    job_duration_seconds: HistogramVec,
}

impl ResqMetrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let jobs_pushed_total = IntCounterVec::new(
            Opts::new("resq_jobs_pushed_total", "Total number of payloads pushed"),
            &["queue"],
        )?;

        let jobs_processed_total = IntCounterVec::new(
            Opts::new("resq_jobs_processed_total", "Total number of jobs performed successfully"),
            &["queue", "class"],
        )?;

        let jobs_failed_total = IntCounterVec::new(
            Opts::new("resq_jobs_failed_total", "Total number of jobs that failed"),
            &["queue", "class", "error_type"],
        )?;

        let job_duration_seconds = HistogramVec::new(
            HistogramOpts::new("resq_job_duration_seconds", "Job perform duration in seconds")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["queue", "class"],
        )?;

        registry.register(Box::new(jobs_pushed_total.clone()))?;
        registry.register(Box::new(jobs_processed_total.clone()))?;
        registry.register(Box::new(jobs_failed_total.clone()))?;
        registry.register(Box::new(job_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            jobs_pushed_total,
            jobs_processed_total,
            jobs_failed_total,
            job_duration_seconds,
        })
    }

    /// Record a payload pushed onto a queue
    pub fn record_pushed(&self, queue: &str) {
        self.jobs_pushed_total.with_label_values(&[queue]).inc();
    }

    /// Record a job performed successfully
    pub fn record_processed(&self, queue: &str, class: &str, duration_secs: f64) {
        self.jobs_processed_total
            .with_label_values(&[queue, class])
            .inc();
        self.job_duration_seconds
            .with_label_values(&[queue, class])
            .observe(duration_secs);
    }

    /// Record a failed job
    pub fn record_failed(&self, queue: &str, class: &str, error_type: &str) {
        self.jobs_failed_total
            .with_label_values(&[queue, class, error_type])
            .inc();
    }

    /// Get the registry for custom metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Gather metrics in Prometheus text format
    pub fn gather(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families).unwrap_or_default()
    }
}

/// Timer for measuring job duration
pub struct Timer {
    start: Instant,
    metrics: ResqMetrics,
    queue: String,
    class: String,
}

impl Timer {
    /// Start a new timer
    pub fn start(metrics: ResqMetrics, queue: &str, class: &str) -> Self {
        Self {
            start: Instant::now(),
            metrics,
            queue: queue.to_string(),
            class: class.to_string(),
        }
    }

    /// Stop the timer and record a successful job
    pub fn stop(self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.metrics
            .record_processed(&self.queue, &self.class, duration);
    }
}
