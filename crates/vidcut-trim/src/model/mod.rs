//! Domain models for trim batches.
//!
//! # Design
//! - A `TrimRequest` is built once per batch and moved into the service.
//! - Outcomes are immutable values; the service returns them in input order.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{TrimError, TrimResult};

mod duration_secs;

/// Immutable inputs for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimRequest {
    input_paths: Vec<PathBuf>,
    retained_seconds: u32,
    delete_source_on_success: bool,
}

impl TrimRequest {
    /// Build a validated request.
    ///
    /// An empty path list is accepted and yields an empty batch.
    ///
    /// # Errors
    ///
    /// Returns [`TrimError::InvalidRequest`] when `retained_seconds` is zero.
    /// Paths are checked per file while the batch runs, so one unusable path
    /// never rejects the rest.
    pub fn new(
        input_paths: Vec<PathBuf>,
        retained_seconds: u32,
        delete_source_on_success: bool,
    ) -> TrimResult<Self> {
        let request = Self {
            input_paths,
            retained_seconds,
            delete_source_on_success,
        };
        request.validate()?;
        Ok(request)
    }

    pub(crate) fn validate(&self) -> TrimResult<()> {
        if self.retained_seconds < 1 {
            return Err(TrimError::invalid(
                "retained_seconds",
                "below_minimum",
                Some(self.retained_seconds.to_string()),
            ));
        }
        Ok(())
    }

    /// Input files in processing order.
    #[must_use]
    pub fn input_paths(&self) -> &[PathBuf] {
        &self.input_paths
    }

    /// Seconds kept from the end of each file.
    #[must_use]
    pub const fn retained_seconds(&self) -> u32 {
        self.retained_seconds
    }

    /// Whether sources are removed after a successful trim.
    #[must_use]
    pub const fn delete_source_on_success(&self) -> bool {
        self.delete_source_on_success
    }
}

/// Classification of per-file failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The input path cannot name an output file.
    InvalidInput,
    /// The duration could not be determined.
    ProbeFailed,
    /// The extraction itself failed.
    TranscodeFailed,
    /// The source could not be removed after a successful trim.
    DeleteFailed,
    /// The output already existed and the conflict policy is `fail`, or the
    /// output would replace another input of the same batch.
    OutputExists,
}

impl FailureKind {
    /// Stable label used in events and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::ProbeFailed => "probe_failed",
            Self::TranscodeFailed => "transcode_failed",
            Self::DeleteFailed => "delete_failed",
            Self::OutputExists => "output_exists",
        }
    }
}

/// Failure attached to a file outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// Failure classification.
    pub kind: FailureKind,
    /// Human-readable reason.
    pub message: String,
}

impl FileFailure {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Terminal status of one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// The output was written.
    Success,
    /// The file could not be trimmed.
    Failed(FileFailure),
    /// The file was not attempted.
    Skipped {
        /// Why the file was not attempted.
        reason: String,
    },
}

impl FileStatus {
    /// Stable label used in metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success => "succeeded",
            Self::Failed(_) => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }
}

/// What happened to the source file after the trim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceRemoval {
    /// Removal was not requested or the trim did not succeed.
    Kept,
    /// The source was removed.
    Removed,
    /// Removal was attempted and failed; the output is still valid.
    Failed(FileFailure),
}

/// Outcome recorded for one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    /// Input path as supplied by the caller.
    pub path: PathBuf,
    /// Terminal status.
    pub status: FileStatus,
    /// Derived output path, when one was computed.
    pub output_path: Option<PathBuf>,
    /// Source cleanup result.
    pub source: SourceRemoval,
}

impl FileOutcome {
    pub(crate) fn success(path: &Path, output_path: PathBuf, source: SourceRemoval) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Success,
            output_path: Some(output_path),
            source,
        }
    }

    pub(crate) fn failed(path: &Path, output_path: Option<PathBuf>, failure: FileFailure) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Failed(failure),
            output_path,
            source: SourceRemoval::Kept,
        }
    }

    pub(crate) fn skipped(path: &Path, output_path: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Skipped {
                reason: reason.into(),
            },
            output_path,
            source: SourceRemoval::Kept,
        }
    }

    /// Whether the output was written.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Success)
    }

    /// Failure details, if the file failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&FileFailure> {
        match &self.status {
            FileStatus::Failed(failure) => Some(failure),
            FileStatus::Success | FileStatus::Skipped { .. } => None,
        }
    }
}

/// Ordered outcomes for one batch, one per input path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// Identifier assigned to the batch run.
    pub batch_id: Uuid,
    /// Seconds kept from the end of each file.
    pub retained_seconds: u32,
    /// Per-file outcomes in input order.
    pub outcomes: Vec<FileOutcome>,
}

impl BatchResult {
    /// Number of files trimmed successfully.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(|outcome| matches!(outcome.status, FileStatus::Success))
    }

    /// Number of files that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome.status, FileStatus::Failed(_)))
    }

    /// Number of files that were skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome.status, FileStatus::Skipped { .. }))
    }

    /// Number of successful files whose source could not be removed.
    #[must_use]
    pub fn delete_failures(&self) -> usize {
        self.count(|outcome| matches!(outcome.source, SourceRemoval::Failed(_)))
    }

    /// Whether every file succeeded and every requested removal happened.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && self.skipped() == 0 && self.delete_failures() == 0
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|outcome| predicate(outcome)).count()
    }
}

/// Result of probing one file during a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTrim {
    /// Input path as supplied by the caller.
    pub path: PathBuf,
    /// Output path the trim would write, when one can be derived.
    pub output_path: Option<PathBuf>,
    /// Whether a file already exists at the output path.
    pub output_exists: bool,
    /// Probe result and computed seek start.
    pub plan: PlanStatus,
}

/// Probe outcome for a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanStatus {
    /// The file can be trimmed.
    Ready {
        /// Total media duration.
        #[serde(rename = "total_duration_secs", with = "duration_secs")]
        total_duration: Duration,
        /// Offset extraction would start from.
        #[serde(rename = "seek_start_secs", with = "duration_secs")]
        seek_start: Duration,
    },
    /// The duration could not be determined.
    ProbeFailed(FileFailure),
    /// The file would fail before the engine is consulted.
    Blocked(FileFailure),
}

impl PlanStatus {
    /// Failure details, if the file would not be trimmed.
    #[must_use]
    pub const fn failure(&self) -> Option<&FileFailure> {
        match self {
            Self::Ready { .. } => None,
            Self::ProbeFailed(failure) | Self::Blocked(failure) => Some(failure),
        }
    }
}
