//! Batch orchestration: probe, plan, extract and optionally remove each source.
//!
//! # Design
//! - Files run strictly in input order; one engine serves the whole batch.
//! - Per-file failures become outcomes and never abort the batch.
//! - Every step is counted in metrics and announced on the event bus.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vidcut_config::{ConflictPolicy, TrimConfig};
use vidcut_events::{Event, EventBus};
use vidcut_media::{EngineProvider, TranscodeEngine};
use vidcut_telemetry::Metrics;

use crate::error::{TrimError, TrimResult};
use crate::model::{
    BatchResult, FailureKind, FileFailure, FileOutcome, FileStatus, PlanStatus, PlannedTrim,
    SourceRemoval, TrimRequest,
};
use crate::output::{BatchInputs, derive_output_path, staging_path, validate_prefix};
use crate::planner::compute_seek_start;
use crate::selection::Selection;

const SKIP_CANCELLED: &str = "cancelled";
const SKIP_OUTPUT_EXISTS: &str = "output_exists";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepKind {
    PrepareOutput,
    Probe,
    Plan,
    Transcode,
    DeleteSource,
}

impl StepKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::PrepareOutput => "prepare_output",
            Self::Probe => "probe",
            Self::Plan => "plan",
            Self::Transcode => "transcode",
            Self::DeleteSource => "delete_source",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepStatus {
    Started,
    Completed,
    Failed,
    Skipped,
}

impl StepStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Output location checked before the engine is consulted.
struct PreparedOutput {
    path: PathBuf,
    existed: bool,
}

/// Why a file cannot be written, with the output path when one was derived.
struct OutputRejection {
    output_path: Option<PathBuf>,
    failure: FileFailure,
}

struct FileContext<'a> {
    batch_id: Uuid,
    index: usize,
    path: &'a Path,
}

/// Engine handle scoped to one batch. Dropping it releases the engine on
/// every exit path.
struct EngineLease<'a, E> {
    engine: E,
    metrics: &'a Metrics,
    batch_id: Uuid,
}

impl<'a, E> EngineLease<'a, E> {
    fn new(engine: E, metrics: &'a Metrics, batch_id: Uuid) -> Self {
        metrics.engine_acquired();
        debug!(batch_id = %batch_id, "transcode engine acquired");
        Self {
            engine,
            metrics,
            batch_id,
        }
    }

    const fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E> Drop for EngineLease<'_, E> {
    fn drop(&mut self) {
        self.metrics.engine_released();
        debug!(batch_id = %self.batch_id, "transcode engine released");
    }
}

/// Output naming and conflict handling applied to every batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOptions {
    /// Prefix prepended to each input file name.
    pub output_prefix: String,
    /// Behaviour when the output path already exists.
    pub on_conflict: ConflictPolicy,
}

impl TrimOptions {
    /// Extract the trim options from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &TrimConfig) -> Self {
        Self {
            output_prefix: config.output_prefix.clone(),
            on_conflict: config.on_conflict,
        }
    }
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self::from_config(&TrimConfig::default())
    }
}

/// Runs trim batches against engines handed out by `P`.
pub struct TrimService<P> {
    provider: P,
    options: TrimOptions,
    events: EventBus,
    metrics: Metrics,
}

impl<P> TrimService<P>
where
    P: EngineProvider,
{
    /// Construct a service publishing to `events` and recording into `metrics`.
    ///
    /// # Errors
    ///
    /// Returns [`TrimError::InvalidRequest`] when the output prefix is unusable.
    pub fn new(
        provider: P,
        options: TrimOptions,
        events: EventBus,
        metrics: Metrics,
    ) -> TrimResult<Self> {
        validate_prefix(&options.output_prefix)?;
        Ok(Self {
            provider,
            options,
            events,
            metrics,
        })
    }

    /// Event bus the service publishes to.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Metrics registry the service records into.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Options applied to every batch.
    #[must_use]
    pub const fn options(&self) -> &TrimOptions {
        &self.options
    }

    /// Trim every file in `request`, returning one outcome per input in order.
    ///
    /// # Errors
    ///
    /// Returns an error only when the request is invalid or the engine cannot
    /// be acquired; no file is touched in either case.
    pub async fn run_batch(&self, request: TrimRequest) -> TrimResult<BatchResult> {
        self.run_batch_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Like [`Self::run_batch`], checking `cancel` before each file. Files not
    /// yet started when the token fires are reported as skipped.
    ///
    /// # Errors
    ///
    /// See [`Self::run_batch`].
    pub async fn run_batch_with_cancel(
        &self,
        request: TrimRequest,
        cancel: &CancellationToken,
    ) -> TrimResult<BatchResult> {
        request.validate()?;
        let batch_id = Uuid::new_v4();
        if request.input_paths().is_empty() {
            debug!(batch_id = %batch_id, "empty trim request; nothing to do");
            return Ok(BatchResult {
                batch_id,
                retained_seconds: request.retained_seconds(),
                outcomes: Vec::new(),
            });
        }

        let started = Instant::now();
        let lease = self.acquire_engine(batch_id).await?;
        let inputs = BatchInputs::collect(request.input_paths()).await;
        self.metrics.inc_batch();
        self.events.publish(Event::BatchStarted {
            batch_id,
            file_count: request.input_paths().len(),
            retained_seconds: request.retained_seconds(),
        });
        info!(
            batch_id = %batch_id,
            files = request.input_paths().len(),
            retained_seconds = request.retained_seconds(),
            delete_sources = request.delete_source_on_success(),
            "trim batch started"
        );

        let mut outcomes = Vec::with_capacity(request.input_paths().len());
        for (index, path) in request.input_paths().iter().enumerate() {
            let file = FileContext {
                batch_id,
                index,
                path,
            };
            let outcome = if cancel.is_cancelled() {
                FileOutcome::skipped(path, None, SKIP_CANCELLED)
            } else {
                self.events.publish(Event::FileStarted {
                    batch_id,
                    index,
                    path: path.display().to_string(),
                });
                self.process_file(lease.engine(), &file, &request, &inputs)
                    .await
            };
            self.record_outcome(&file, &outcome);
            outcomes.push(outcome);
        }
        drop(lease);

        let result = BatchResult {
            batch_id,
            retained_seconds: request.retained_seconds(),
            outcomes,
        };
        let elapsed = started.elapsed();
        self.metrics.observe_batch_duration(elapsed);
        self.events.publish(Event::BatchCompleted {
            batch_id,
            succeeded: result.succeeded(),
            failed: result.failed(),
            skipped: result.skipped(),
        });
        info!(
            batch_id = %batch_id,
            succeeded = result.succeeded(),
            failed = result.failed(),
            skipped = result.skipped(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "trim batch finished"
        );
        Ok(result)
    }

    /// Run a batch built from `selection` and reset the selection afterwards.
    ///
    /// A selection that fails validation is returned untouched so it can be
    /// corrected.
    ///
    /// # Errors
    ///
    /// See [`Self::run_batch`].
    pub async fn run_selection(&self, selection: &mut Selection) -> TrimResult<BatchResult> {
        self.run_selection_with_cancel(selection, &CancellationToken::new())
            .await
    }

    /// Cancellable variant of [`Self::run_selection`].
    ///
    /// # Errors
    ///
    /// See [`Self::run_batch`].
    pub async fn run_selection_with_cancel(
        &self,
        selection: &mut Selection,
        cancel: &CancellationToken,
    ) -> TrimResult<BatchResult> {
        let request = selection.take_request()?;
        let result = self.run_batch_with_cancel(request, cancel).await;
        selection.reset();
        self.events.publish(Event::SelectionReset);
        result
    }

    /// Probe every file and report what a batch would do, without writing.
    ///
    /// Files that a batch would reject before probing are reported as
    /// [`PlanStatus::Blocked`] and are not probed.
    ///
    /// # Errors
    ///
    /// See [`Self::run_batch`].
    pub async fn plan_batch(&self, request: &TrimRequest) -> TrimResult<Vec<PlannedTrim>> {
        request.validate()?;
        if request.input_paths().is_empty() {
            return Ok(Vec::new());
        }

        let batch_id = Uuid::new_v4();
        let lease = self.acquire_engine(batch_id).await?;
        let inputs = BatchInputs::collect(request.input_paths()).await;
        let mut plans = Vec::with_capacity(request.input_paths().len());
        for path in request.input_paths() {
            let planned = match self.prepare_output(path, &inputs).await {
                Ok(output) => {
                    let plan = match lease.engine().probe_duration(path).await {
                        Ok(total_duration) => PlanStatus::Ready {
                            total_duration,
                            seek_start: compute_seek_start(
                                total_duration,
                                request.retained_seconds(),
                            ),
                        },
                        Err(err) => PlanStatus::ProbeFailed(FileFailure::new(
                            FailureKind::ProbeFailed,
                            err.detail(),
                        )),
                    };
                    PlannedTrim {
                        path: path.clone(),
                        output_path: Some(output.path),
                        output_exists: output.existed,
                        plan,
                    }
                }
                Err(rejection) => PlannedTrim {
                    path: path.clone(),
                    output_path: rejection.output_path,
                    output_exists: false,
                    plan: PlanStatus::Blocked(rejection.failure),
                },
            };
            debug!(path = %path.display(), plan = ?planned.plan, "planned trim");
            plans.push(planned);
        }
        Ok(plans)
    }

    async fn acquire_engine(&self, batch_id: Uuid) -> TrimResult<EngineLease<'_, P::Engine>> {
        match self.provider.acquire().await {
            Ok(engine) => Ok(EngineLease::new(engine, &self.metrics, batch_id)),
            Err(source) => {
                warn!(batch_id = %batch_id, error = %source.detail(), "transcode engine unavailable");
                Err(TrimError::Engine {
                    operation: "acquire",
                    source,
                })
            }
        }
    }

    /// Derive the output for `input` and check it can be written.
    ///
    /// The conflict policy is not applied here; `existed` reports what was found.
    async fn prepare_output(
        &self,
        input: &Path,
        inputs: &BatchInputs,
    ) -> Result<PreparedOutput, OutputRejection> {
        let path = derive_output_path(input, &self.options.output_prefix).map_err(|err| {
            OutputRejection {
                output_path: None,
                failure: FileFailure::new(FailureKind::InvalidInput, err.detail()),
            }
        })?;
        if inputs.contains(&path).await {
            let message = format!("{} is also an input of this batch", path.display());
            return Err(OutputRejection {
                output_path: Some(path),
                failure: FileFailure::new(FailureKind::OutputExists, message),
            });
        }
        match fs::try_exists(&path).await {
            Ok(existed) => Ok(PreparedOutput { path, existed }),
            Err(err) => Err(OutputRejection {
                output_path: Some(path),
                failure: FileFailure::new(
                    FailureKind::TranscodeFailed,
                    format!("could not inspect output: {err}"),
                ),
            }),
        }
    }

    async fn process_file<E>(
        &self,
        engine: &E,
        file: &FileContext<'_>,
        request: &TrimRequest,
        inputs: &BatchInputs,
    ) -> FileOutcome
    where
        E: TranscodeEngine,
    {
        let path = file.path;

        self.record_step(file, StepKind::PrepareOutput, StepStatus::Started);
        let PreparedOutput {
            path: output_path,
            existed: output_existed,
        } = match self.prepare_output(path, inputs).await {
            Ok(output) => output,
            Err(rejection) => {
                self.record_step(file, StepKind::PrepareOutput, StepStatus::Failed);
                return FileOutcome::failed(path, rejection.output_path, rejection.failure);
            }
        };
        if output_existed {
            match self.options.on_conflict {
                ConflictPolicy::Overwrite => {
                    debug!(output = %output_path.display(), "overwriting existing output");
                }
                ConflictPolicy::Fail => {
                    self.record_step(file, StepKind::PrepareOutput, StepStatus::Failed);
                    let message = format!("{} already exists", output_path.display());
                    return FileOutcome::failed(
                        path,
                        Some(output_path),
                        FileFailure::new(FailureKind::OutputExists, message),
                    );
                }
                ConflictPolicy::Skip => {
                    self.record_step(file, StepKind::PrepareOutput, StepStatus::Skipped);
                    return FileOutcome::skipped(path, Some(output_path), SKIP_OUTPUT_EXISTS);
                }
            }
        }
        self.record_step(file, StepKind::PrepareOutput, StepStatus::Completed);

        let total_duration = match self
            .execute_step(file, StepKind::Probe, engine.probe_duration(path))
            .await
        {
            Ok(duration) => duration,
            Err(err) => {
                return FileOutcome::failed(
                    path,
                    Some(output_path),
                    FileFailure::new(FailureKind::ProbeFailed, err.detail()),
                );
            }
        };

        self.record_step(file, StepKind::Plan, StepStatus::Started);
        let seek_start = compute_seek_start(total_duration, request.retained_seconds());
        self.record_step(file, StepKind::Plan, StepStatus::Completed);
        debug!(
            path = %path.display(),
            total_duration_secs = total_duration.as_secs_f64(),
            seek_start_secs = seek_start.as_secs_f64(),
            "computed seek start"
        );

        let transcode = async {
            let staging = staging_path(&output_path)
                .map_err(|err| format!("could not stage output: {err}"))?;
            engine
                .extract_suffix(path, &staging, seek_start)
                .await
                .map_err(|err| err.detail())?;
            staging
                .persist(&output_path)
                .map_err(|err| format!("could not move output into place: {}", err.error))
        };
        if let Err(message) = self
            .execute_step(file, StepKind::Transcode, transcode)
            .await
        {
            return FileOutcome::failed(
                path,
                Some(output_path),
                FileFailure::new(FailureKind::TranscodeFailed, message),
            );
        }

        let source = if request.delete_source_on_success() {
            self.remove_source(file).await
        } else {
            self.record_step(file, StepKind::DeleteSource, StepStatus::Skipped);
            SourceRemoval::Kept
        };
        FileOutcome::success(path, output_path, source)
    }

    async fn remove_source(&self, file: &FileContext<'_>) -> SourceRemoval {
        match self
            .execute_step(file, StepKind::DeleteSource, fs::remove_file(file.path))
            .await
        {
            Ok(()) => SourceRemoval::Removed,
            Err(err) => {
                warn!(
                    path = %file.path.display(),
                    error = %err,
                    "failed to remove source after trim"
                );
                SourceRemoval::Failed(FileFailure::new(
                    FailureKind::DeleteFailed,
                    format!("could not remove source: {err}"),
                ))
            }
        }
    }

    async fn execute_step<T, Fail, Fut>(
        &self,
        file: &FileContext<'_>,
        step: StepKind,
        op: Fut,
    ) -> Result<T, Fail>
    where
        Fut: Future<Output = Result<T, Fail>>,
    {
        self.record_step(file, step, StepStatus::Started);
        let result = op.await;
        let status = if result.is_ok() {
            StepStatus::Completed
        } else {
            StepStatus::Failed
        };
        self.record_step(file, step, status);
        result
    }

    fn record_step(&self, file: &FileContext<'_>, step: StepKind, status: StepStatus) {
        self.metrics.inc_step(step.as_str(), status.as_str());
        if status == StepStatus::Started {
            self.events.publish(Event::FileProgress {
                batch_id: file.batch_id,
                path: file.path.display().to_string(),
                step: step.as_str().to_string(),
            });
        }
        debug!(
            batch_id = %file.batch_id,
            index = file.index,
            step = step.as_str(),
            status = status.as_str(),
            "trim step"
        );
    }

    fn record_outcome(&self, file: &FileContext<'_>, outcome: &FileOutcome) {
        self.metrics.inc_file(outcome.status.label());
        let path = file.path.display().to_string();
        let event = match &outcome.status {
            FileStatus::Success => {
                if let SourceRemoval::Failed(failure) = &outcome.source {
                    warn!(path = %path, detail = %failure.message, "trimmed but source kept");
                }
                info!(path = %path, "file trimmed");
                Event::FileCompleted {
                    batch_id: file.batch_id,
                    path,
                    output_path: outcome
                        .output_path
                        .as_deref()
                        .map(|output| output.display().to_string())
                        .unwrap_or_default(),
                    source_removed: matches!(outcome.source, SourceRemoval::Removed),
                }
            }
            FileStatus::Failed(failure) => {
                warn!(
                    path = %path,
                    kind = failure.kind.as_str(),
                    detail = %failure.message,
                    "file trim failed"
                );
                Event::FileFailed {
                    batch_id: file.batch_id,
                    path,
                    kind: failure.kind.as_str().to_string(),
                    message: failure.message.clone(),
                }
            }
            FileStatus::Skipped { reason } => {
                info!(path = %path, reason = %reason, "file skipped");
                Event::FileSkipped {
                    batch_id: file.batch_id,
                    path,
                    reason: reason.clone(),
                }
            }
        };
        self.events.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use vidcut_media::{MediaError, MediaResult};

    type TestResult<T> = anyhow::Result<T>;

    struct FixedEngine;

    #[async_trait]
    impl TranscodeEngine for FixedEngine {
        async fn probe_duration(&self, _path: &Path) -> MediaResult<Duration> {
            Ok(Duration::from_secs(45))
        }

        async fn extract_suffix(
            &self,
            _input: &Path,
            output: &Path,
            seek_start: Duration,
        ) -> MediaResult<()> {
            tokio::fs::write(output, format!("{}", seek_start.as_secs()))
                .await
                .map_err(|source| MediaError::Spawn {
                    operation: "extract",
                    program: "fixed".into(),
                    source,
                })
        }
    }

    struct FixedProvider;

    #[async_trait]
    impl EngineProvider for FixedProvider {
        type Engine = FixedEngine;

        async fn acquire(&self) -> MediaResult<Self::Engine> {
            Ok(FixedEngine)
        }
    }

    fn service() -> TestResult<TrimService<FixedProvider>> {
        Ok(TrimService::new(
            FixedProvider,
            TrimOptions::default(),
            EventBus::new(),
            Metrics::new()?,
        )?)
    }

    #[test]
    fn step_labels_are_stable() {
        assert_eq!(StepKind::DeleteSource.as_str(), "delete_source");
        assert_eq!(StepStatus::Skipped.as_str(), "skipped");
    }

    #[test]
    fn new_rejects_prefix_with_separator() -> TestResult<()> {
        let options = TrimOptions {
            output_prefix: "a/b".into(),
            on_conflict: ConflictPolicy::Overwrite,
        };
        let result = TrimService::new(FixedProvider, options, EventBus::new(), Metrics::new()?);
        assert!(matches!(
            result,
            Err(TrimError::InvalidRequest {
                reason: "path_separator",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn engine_lease_releases_gauge_after_batch() -> TestResult<()> {
        let temp = tempfile::tempdir()?;
        let input = temp.path().join("a.mp4");
        std::fs::write(&input, b"src")?;
        let service = service()?;

        let result = service
            .run_batch(TrimRequest::new(vec![input], 30, false)?)
            .await?;
        assert_eq!(result.succeeded(), 1);
        let snapshot = service.metrics().snapshot();
        assert_eq!(snapshot.active_engines, 0);
        assert_eq!(snapshot.batches_total, 1);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("Cut a.mp4"))?,
            "15"
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_output_directory_fails_transcode_without_panicking() -> TestResult<()> {
        let service = service()?;
        let path = PathBuf::from("/nonexistent-vidcut-dir/a.mp4");
        let result = service
            .run_batch(TrimRequest::new(vec![path], 5, true)?)
            .await?;
        let failure = result.outcomes[0].failure().map(|failure| failure.kind);
        assert_eq!(failure, Some(FailureKind::TranscodeFailed));
        assert_eq!(result.outcomes[0].source, SourceRemoval::Kept);
        Ok(())
    }
}
