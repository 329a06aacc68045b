//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters and gauges the trim pipeline reports.

use std::sync::Arc;
use std::time::Duration;

use prometheus::core::Collector;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    batches_total: IntCounter,
    files_total: IntCounterVec,
    steps_total: IntCounterVec,
    active_engines: IntGauge,
    last_batch_duration_ms: IntGauge,
}

/// Snapshot of selected gauges and counters for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Total batches started.
    pub batches_total: u64,
    /// Files trimmed successfully.
    pub files_succeeded: u64,
    /// Files that failed.
    pub files_failed: u64,
    /// Files that were skipped.
    pub files_skipped: u64,
    /// Transcode engines currently leased.
    pub active_engines: i64,
    /// Wall-clock duration of the most recent batch (ms).
    pub last_batch_duration_ms: i64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let batches_total = IntCounter::with_opts(Opts::new(
            "vidcut_batches_total",
            "Trim batches started",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "vidcut_batches_total",
            source,
        })?;
        let files_total = IntCounterVec::new(
            Opts::new("vidcut_files_total", "Files processed by outcome status"),
            &["status"],
        )
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "vidcut_files_total",
            source,
        })?;
        let steps_total = IntCounterVec::new(
            Opts::new("vidcut_steps_total", "Per-file trim steps executed by status"),
            &["step", "status"],
        )
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "vidcut_steps_total",
            source,
        })?;
        let active_engines = IntGauge::with_opts(Opts::new(
            "vidcut_active_engines",
            "Transcode engines currently leased",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "vidcut_active_engines",
            source,
        })?;
        let last_batch_duration_ms = IntGauge::with_opts(Opts::new(
            "vidcut_last_batch_duration_ms",
            "Wall-clock duration of the most recent batch (ms)",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "vidcut_last_batch_duration_ms",
            source,
        })?;

        register(&registry, "vidcut_batches_total", &batches_total)?;
        register(&registry, "vidcut_files_total", &files_total)?;
        register(&registry, "vidcut_steps_total", &steps_total)?;
        register(&registry, "vidcut_active_engines", &active_engines)?;
        register(
            &registry,
            "vidcut_last_batch_duration_ms",
            &last_batch_duration_ms,
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                batches_total,
                files_total,
                steps_total,
                active_engines,
                last_batch_duration_ms,
            }),
        })
    }

    /// Increment the batch counter.
    pub fn inc_batch(&self) {
        self.inner.batches_total.inc();
    }

    /// Increment the per-file outcome counter.
    pub fn inc_file(&self, status: &str) {
        self.inner.files_total.with_label_values(&[status]).inc();
    }

    /// Increment the per-file step counter.
    pub fn inc_step(&self, step: &str, status: &str) {
        self.inner
            .steps_total
            .with_label_values(&[step, status])
            .inc();
    }

    /// Record that a transcode engine was leased.
    pub fn engine_acquired(&self) {
        self.inner.active_engines.inc();
    }

    /// Record that a transcode engine lease ended.
    pub fn engine_released(&self) {
        self.inner.active_engines.dec();
    }

    /// Record the wall-clock duration of the last batch.
    pub fn observe_batch_duration(&self, duration: Duration) {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        self.inner.last_batch_duration_ms.set(millis);
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the most relevant gauges and counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let files = &self.inner.files_total;
        MetricsSnapshot {
            batches_total: self.inner.batches_total.get(),
            files_succeeded: files.with_label_values(&["succeeded"]).get(),
            files_failed: files.with_label_values(&["failed"]).get(),
            files_skipped: files.with_label_values(&["skipped"]).get(),
            active_engines: self.inner.active_engines.get(),
            last_batch_duration_ms: self.inner.last_batch_duration_ms.get(),
        }
    }
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_render_includes_registered_collectors() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_batch();
        metrics.inc_file("succeeded");
        metrics.inc_step("probe", "completed");
        let rendered = metrics.render()?;
        assert!(rendered.contains("vidcut_batches_total 1"));
        assert!(rendered.contains("vidcut_files_total{status=\"succeeded\"} 1"));
        assert!(
            rendered
                .lines()
                .any(|line| line.starts_with("vidcut_steps_total{") && line.contains("step=\"probe\""))
        );
        Ok(())
    }

    #[test]
    fn snapshot_tracks_engines_and_outcomes() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.engine_acquired();
        metrics.inc_file("failed");
        metrics.inc_file("skipped");
        metrics.observe_batch_duration(Duration::from_millis(250));
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.active_engines, 1);
        assert_eq!(snapshot.files_failed, 1);
        assert_eq!(snapshot.files_skipped, 1);
        assert_eq!(snapshot.files_succeeded, 0);
        assert_eq!(snapshot.last_batch_duration_ms, 250);

        metrics.engine_released();
        assert_eq!(metrics.snapshot().active_engines, 0);
        Ok(())
    }
}
