//! CLI error type and exit codes.

use anyhow::anyhow;
use vidcut_config::ConfigError;
use vidcut_trim::TrimError;

/// Exit code reported when a batch ran but at least one file failed.
pub(crate) const EXIT_FILES_FAILED: i32 = 1;

#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidField { .. } => Self::validation(err.detail()),
            ConfigError::Io { .. } | ConfigError::Parse { .. } => {
                Self::failure(anyhow!(err.detail()))
            }
        }
    }
}

impl From<TrimError> for CliError {
    fn from(err: TrimError) -> Self {
        match err {
            TrimError::InvalidRequest { .. } => Self::validation(err.detail()),
            TrimError::Engine { .. } => Self::failure(anyhow!(err.detail())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidcut_media::MediaError;

    #[test]
    fn exit_codes_separate_validation_from_failure() {
        let validation = CliError::from(TrimError::InvalidRequest {
            field: "retained_seconds",
            reason: "not_numeric",
            value: Some("ten".into()),
        });
        assert_eq!(validation.exit_code(), 2);
        assert_eq!(
            validation.display_message(),
            "retained_seconds is not_numeric: \"ten\""
        );

        let failure = CliError::from(TrimError::Engine {
            operation: "acquire",
            source: MediaError::Unavailable {
                program: "ffprobe".into(),
                reason: "failed its version check",
            },
        });
        assert_eq!(failure.exit_code(), 3);
        assert_eq!(failure.display_message(), "ffprobe failed its version check");
    }

    #[test]
    fn config_parse_errors_are_failures() {
        let source = serde_json::from_str::<serde_json::Value>("{").err();
        let Some(source) = source else {
            panic!("expected invalid json");
        };
        let err = CliError::from(ConfigError::Parse {
            path: "/etc/vidcut.json".into(),
            source,
        });
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().starts_with("could not parse /etc/vidcut.json"));
    }
}
