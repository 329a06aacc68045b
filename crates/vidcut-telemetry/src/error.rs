//! Error types for telemetry operations.
//!
//! # Design
//! - Constant messages; the collector name travels as a field.

use prometheus::Error as PrometheusError;
use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while installing logging or building metrics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global tracing subscriber was already installed, or installing one failed.
    #[error("tracing subscriber could not be installed")]
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
    /// A Prometheus collector could not be constructed.
    #[error("metrics collector could not be built")]
    MetricsCollector {
        /// Collector name.
        name: &'static str,
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// A collector was rejected by the registry.
    #[error("metrics collector could not be registered")]
    MetricsRegister {
        /// Collector name.
        name: &'static str,
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// The text exposition could not be produced.
    #[error("metrics could not be rendered")]
    MetricsEncode {
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// The rendered exposition was not UTF-8.
    #[error("rendered metrics are not utf-8")]
    MetricsUtf8 {
        /// Underlying conversion error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl TelemetryError {
    /// Collector the failure relates to, when there is one.
    #[must_use]
    pub const fn collector(&self) -> Option<&'static str> {
        match self {
            Self::MetricsCollector { name, .. } | Self::MetricsRegister { name, .. } => Some(*name),
            Self::SubscriberInstall { .. } | Self::MetricsEncode { .. } | Self::MetricsUtf8 { .. } => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{IntCounter, Registry};
    use std::error::Error as _;

    #[test]
    fn duplicate_registration_names_the_collector() -> anyhow::Result<()> {
        let registry = Registry::new();
        let first = IntCounter::new("vidcut_dup_total", "dup")?;
        registry.register(Box::new(first.clone()))?;
        let err = registry
            .register(Box::new(first))
            .map_err(|source| TelemetryError::MetricsRegister {
                name: "vidcut_dup_total",
                source,
            })
            .err()
            .ok_or_else(|| anyhow::anyhow!("duplicate registration was accepted"))?;

        assert_eq!(err.to_string(), "metrics collector could not be registered");
        assert_eq!(err.collector(), Some("vidcut_dup_total"));
        assert!(err.source().is_some());
        Ok(())
    }

    #[test]
    fn invalid_utf8_keeps_its_source() -> anyhow::Result<()> {
        let source = String::from_utf8(vec![0, 159])
            .err()
            .ok_or_else(|| anyhow::anyhow!("bytes decoded unexpectedly"))?;
        let err = TelemetryError::MetricsUtf8 { source };
        assert_eq!(err.to_string(), "rendered metrics are not utf-8");
        assert_eq!(err.collector(), None);
        assert!(err.source().is_some());
        Ok(())
    }
}
