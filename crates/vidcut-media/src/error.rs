//! # Design
//!
//! - Structured, constant-message errors for the transcode engine.
//! - Capture the program, operation and path so failures are reproducible.
//! - `detail()` renders the context for per-file outcome reports.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for media engine operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors produced by the transcode engine.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The engine executable could not be started.
    #[error("media engine spawn failed")]
    Spawn {
        /// Operation that attempted to start the process.
        operation: &'static str,
        /// Executable that failed to start.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The engine process exited unsuccessfully.
    #[error("media engine exited unsuccessfully")]
    Exit {
        /// Operation that ran the process.
        operation: &'static str,
        /// Executable that failed.
        program: String,
        /// Exit code, when the process was not killed by a signal.
        code: Option<i32>,
        /// Trailing lines of the process stderr.
        stderr: String,
    },
    /// Probe output could not be decoded.
    #[error("media probe output invalid")]
    ProbeJson {
        /// Input that was probed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Probe output decoded but did not describe a usable duration.
    #[error("media duration unavailable")]
    Duration {
        /// Input that was probed.
        path: PathBuf,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// The engine is not usable on this host.
    #[error("media engine unavailable")]
    Unavailable {
        /// Executable that was checked.
        program: String,
        /// Static reason for the failure.
        reason: &'static str,
    },
}

impl MediaError {
    /// Human-readable description including the captured context.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Spawn {
                program, source, ..
            } => format!("could not start {program}: {source}"),
            Self::Exit {
                program,
                code,
                stderr,
                ..
            } => {
                let status = code.map_or_else(|| "a signal".to_string(), |code| format!("status {code}"));
                if stderr.is_empty() {
                    format!("{program} exited with {status}")
                } else {
                    format!("{program} exited with {status}: {stderr}")
                }
            }
            Self::ProbeJson { source, .. } => format!("unreadable probe output: {source}"),
            Self::Duration { reason, value, .. } => match value {
                Some(value) => format!("duration {reason}: {value}"),
                None => format!("duration {reason}"),
            },
            Self::Unavailable { program, reason } => format!("{program} {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn detail_includes_exit_context() {
        let err = MediaError::Exit {
            operation: "extract",
            program: "ffmpeg".into(),
            code: Some(1),
            stderr: "No space left on device".into(),
        };
        assert_eq!(err.to_string(), "media engine exited unsuccessfully");
        assert_eq!(
            err.detail(),
            "ffmpeg exited with status 1: No space left on device"
        );

        let killed = MediaError::Exit {
            operation: "extract",
            program: "ffmpeg".into(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(killed.detail(), "ffmpeg exited with a signal");
    }

    #[test]
    fn spawn_error_keeps_source() {
        let err = MediaError::Spawn {
            operation: "probe",
            program: "ffprobe".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.source().is_some());
        assert_eq!(err.detail(), "could not start ffprobe: not found");
    }

    #[test]
    fn duration_detail_mentions_value() {
        let err = MediaError::Duration {
            path: PathBuf::from("clip.mp4"),
            reason: "negative",
            value: Some("-1.0".into()),
        };
        assert_eq!(err.detail(), "duration negative: -1.0");
    }
}
