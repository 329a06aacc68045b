//! Event payload types carried across the workspace.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifier assigned to each event emitted on the bus.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
pub const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Typed batch lifecycle events.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A batch was accepted and is about to process its first file.
    BatchStarted {
        /// Identifier for the batch run.
        batch_id: Uuid,
        /// Number of input files in the batch.
        file_count: usize,
        /// Seconds retained from the end of each file.
        retained_seconds: u32,
    },
    /// Processing of a single input file began.
    FileStarted {
        /// Identifier for the batch run.
        batch_id: Uuid,
        /// Zero-based position of the file within the batch.
        index: usize,
        /// Input path as supplied by the caller.
        path: String,
    },
    /// A per-file step started.
    FileProgress {
        /// Identifier for the batch run.
        batch_id: Uuid,
        /// Input path the step applies to.
        path: String,
        /// Step label (`probe`, `transcode`, ...).
        step: String,
    },
    /// A file was trimmed successfully.
    FileCompleted {
        /// Identifier for the batch run.
        batch_id: Uuid,
        /// Input path as supplied by the caller.
        path: String,
        /// Path of the trimmed output.
        output_path: String,
        /// Whether the source file was removed afterwards.
        source_removed: bool,
    },
    /// A file could not be trimmed.
    FileFailed {
        /// Identifier for the batch run.
        batch_id: Uuid,
        /// Input path as supplied by the caller.
        path: String,
        /// Failure kind discriminator.
        kind: String,
        /// Human-readable failure detail.
        message: String,
    },
    /// A file was not attempted.
    FileSkipped {
        /// Identifier for the batch run.
        batch_id: Uuid,
        /// Input path as supplied by the caller.
        path: String,
        /// Reason the file was skipped.
        reason: String,
    },
    /// Every file in the batch has an outcome.
    BatchCompleted {
        /// Identifier for the batch run.
        batch_id: Uuid,
        /// Files trimmed successfully.
        succeeded: usize,
        /// Files that failed.
        failed: usize,
        /// Files that were skipped.
        skipped: usize,
    },
    /// The caller selection was cleared and is ready for a new batch.
    SelectionReset,
}

impl Event {
    /// Machine-friendly discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BatchStarted { .. } => "batch_started",
            Self::FileStarted { .. } => "file_started",
            Self::FileProgress { .. } => "file_progress",
            Self::FileCompleted { .. } => "file_completed",
            Self::FileFailed { .. } => "file_failed",
            Self::FileSkipped { .. } => "file_skipped",
            Self::BatchCompleted { .. } => "batch_completed",
            Self::SelectionReset => "selection_reset",
        }
    }

    /// Batch identifier carried by the event, when any.
    #[must_use]
    pub const fn batch_id(&self) -> Option<Uuid> {
        match self {
            Self::BatchStarted { batch_id, .. }
            | Self::FileStarted { batch_id, .. }
            | Self::FileProgress { batch_id, .. }
            | Self::FileCompleted { batch_id, .. }
            | Self::FileFailed { batch_id, .. }
            | Self::FileSkipped { batch_id, .. }
            | Self::BatchCompleted { batch_id, .. } => Some(*batch_id),
            Self::SelectionReset => None,
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and
/// emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Sequential identifier assigned by the bus.
    pub id: EventId,
    /// Emission timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event payload.
    pub event: Event,
}
