//! # Design
//!
//! - Request-level errors only; per-file failures live in `FileOutcome`.
//! - Constant messages with the offending field and value carried as context.

use thiserror::Error;
use vidcut_media::MediaError;

/// Result type for trim operations.
pub type TrimResult<T> = Result<T, TrimError>;

/// Errors that stop a batch before any file is touched.
#[derive(Debug, Error)]
pub enum TrimError {
    /// The request failed validation.
    #[error("invalid trim request")]
    InvalidRequest {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// The transcode engine could not be acquired for the batch.
    #[error("transcode engine unavailable")]
    Engine {
        /// Operation that needed the engine.
        operation: &'static str,
        /// Underlying engine error.
        source: MediaError,
    },
}

impl TrimError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str, value: Option<String>) -> Self {
        Self::InvalidRequest {
            field,
            reason,
            value,
        }
    }

    /// Human-readable description including the captured context.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidRequest {
                field,
                reason,
                value: Some(value),
            } => format!("{field} is {reason}: {value:?}"),
            Self::InvalidRequest { field, reason, .. } => format!("{field} is {reason}"),
            Self::Engine { source, .. } => source.detail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn detail_renders_field_context() {
        let err = TrimError::invalid("retained_seconds", "below_minimum", Some("0".into()));
        assert_eq!(err.to_string(), "invalid trim request");
        assert_eq!(err.detail(), "retained_seconds is below_minimum: \"0\"");
        assert_eq!(
            TrimError::invalid("input_paths", "empty", None).detail(),
            "input_paths is empty"
        );
    }

    #[test]
    fn engine_error_keeps_source() {
        let err = TrimError::Engine {
            operation: "acquire",
            source: MediaError::Unavailable {
                program: "ffmpeg".into(),
                reason: "could not be started",
            },
        };
        assert!(err.source().is_some());
        assert_eq!(err.detail(), "ffmpeg could not be started");
    }
}
