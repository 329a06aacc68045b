//! Engine-agnostic transcode interfaces.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::MediaResult;

/// Black-box media capability used by the trim pipeline.
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Report the total duration of the media at `path`.
    async fn probe_duration(&self, path: &Path) -> MediaResult<Duration>;

    /// Write the content of `input` from `seek_start` to end-of-stream into
    /// `output`, replacing any existing file.
    async fn extract_suffix(&self, input: &Path, output: &Path, seek_start: Duration)
    -> MediaResult<()>;
}

/// Factory that hands out an engine scoped to a single batch run.
///
/// The returned engine is dropped when the batch ends; implementations release
/// native resources in `Drop`.
#[async_trait]
pub trait EngineProvider: Send + Sync {
    /// Engine type produced by this provider.
    type Engine: TranscodeEngine;

    /// Acquire an engine for one batch.
    async fn acquire(&self) -> MediaResult<Self::Engine>;
}
