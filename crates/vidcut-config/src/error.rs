//! Error types for configuration operations.
//!
//! # Design
//! - Constant messages; the offending section, field and value travel as fields.
//! - Source errors are preserved rather than interpolated.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Section that failed validation (`file` or `env`).
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Reading the configuration file failed.
    #[error("failed to read configuration file")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The configuration file was not valid JSON for the expected schema.
    #[error("failed to parse configuration file")]
    Parse {
        /// Path that could not be parsed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        section: &'static str,
        field: &'static str,
        value: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            section,
            field,
            value: Some(value.into()),
            reason,
        }
    }

    /// Human-readable description including the captured context.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidField {
                section,
                field,
                value: Some(value),
                reason,
            } => format!("{section}: {field} is {reason}: {value:?}"),
            Self::InvalidField {
                section,
                field,
                reason,
                ..
            } => format!("{section}: {field} is {reason}"),
            Self::Io { path, source } => format!("could not read {}: {source}", path.display()),
            Self::Parse { path, source } => format!("could not parse {}: {source}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn detail_names_section_and_field() {
        let err = ConfigError::invalid("file", "output_prefix", "a/b", "path_separator");
        assert_eq!(
            err.detail(),
            "file: output_prefix is path_separator: \"a/b\""
        );
    }

    #[test]
    fn invalid_helper_builds_field_variant() {
        let err = ConfigError::invalid("env", "on_conflict", "sometimes", "unknown_policy");
        assert_eq!(err.to_string(), "invalid configuration field");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                section: "env",
                field: "on_conflict",
                reason: "unknown_policy",
                ..
            }
        ));
    }

    #[test]
    fn io_variant_exposes_source() {
        let err = ConfigError::Io {
            path: PathBuf::from("vidcut.json"),
            source: io::Error::other("io"),
        };
        assert!(err.source().is_some());
    }
}
