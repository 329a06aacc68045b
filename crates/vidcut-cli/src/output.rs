//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::anyhow;
use serde::Serialize;
use vidcut_events::Event;
use vidcut_trim::{BatchResult, FileOutcome, FileStatus, PlanStatus, PlannedTrim, SourceRemoval};

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

pub(crate) fn render_batch(result: &BatchResult, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Table => {
            print!("{}", format_batch_table(result));
            Ok(())
        }
    }
}

pub(crate) fn render_plan(plans: &[PlannedTrim], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&plans),
        OutputFormat::Table => {
            print!("{}", format_plan_table(plans));
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn format_batch_table(result: &BatchResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<9} {:<32} {:<32} DETAIL", "STATUS", "SOURCE", "OUTPUT");
    for outcome in &result.outcomes {
        let _ = writeln!(
            out,
            "{:<9} {:<32} {:<32} {}",
            status_label(&outcome.status),
            display_name(&outcome.path),
            outcome
                .output_path
                .as_deref()
                .map_or_else(|| "-".to_string(), display_name),
            outcome_detail(outcome)
        );
    }
    let _ = writeln!(
        out,
        "{} succeeded, {} failed, {} skipped",
        result.succeeded(),
        result.failed(),
        result.skipped()
    );
    if result.delete_failures() > 0 {
        let _ = writeln!(
            out,
            "{} original(s) could not be removed",
            result.delete_failures()
        );
    }
    out
}

pub(crate) fn format_plan_table(plans: &[PlannedTrim]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<32} {:>10} {:>10} {:<32} NOTE",
        "SOURCE", "DURATION", "START", "OUTPUT"
    );
    for planned in plans {
        let (duration, start, note) = match &planned.plan {
            PlanStatus::Ready {
                total_duration,
                seek_start,
            } => (
                format!("{:.3}s", total_duration.as_secs_f64()),
                format!("{:.3}s", seek_start.as_secs_f64()),
                if planned.output_exists {
                    "output exists".to_string()
                } else {
                    String::new()
                },
            ),
            PlanStatus::ProbeFailed(failure) | PlanStatus::Blocked(failure) => {
                ("-".to_string(), "-".to_string(), failure.message.clone())
            }
        };
        let _ = writeln!(
            out,
            "{:<32} {:>10} {:>10} {:<32} {}",
            display_name(&planned.path),
            duration,
            start,
            planned
                .output_path
                .as_deref()
                .map_or_else(|| "-".to_string(), display_name),
            note
        );
    }
    out
}

/// One-line progress message for events worth showing while a batch runs.
pub(crate) fn progress_line(event: &Event) -> Option<String> {
    match event {
        Event::BatchStarted {
            file_count,
            retained_seconds,
            ..
        } => Some(format!(
            "trimming {file_count} file(s) to their last {retained_seconds}s"
        )),
        Event::FileStarted { index, path, .. } => Some(format!("[{}] {path}", index + 1)),
        Event::FileCompleted {
            output_path,
            source_removed,
            ..
        } => Some(if *source_removed {
            format!("    wrote {output_path}; original removed")
        } else {
            format!("    wrote {output_path}")
        }),
        Event::FileFailed { kind, message, .. } => Some(format!("    failed ({kind}): {message}")),
        Event::FileSkipped { reason, .. } => Some(format!("    skipped: {reason}")),
        Event::FileProgress { .. } | Event::BatchCompleted { .. } | Event::SelectionReset => None,
    }
}

const fn status_label(status: &FileStatus) -> &'static str {
    match status {
        FileStatus::Success => "ok",
        FileStatus::Failed(_) => "failed",
        FileStatus::Skipped { .. } => "skipped",
    }
}

fn outcome_detail(outcome: &FileOutcome) -> String {
    match (&outcome.status, &outcome.source) {
        (FileStatus::Failed(failure), _) => {
            format!("{}: {}", failure.kind.as_str(), failure.message)
        }
        (FileStatus::Skipped { reason }, _) => reason.clone(),
        (FileStatus::Success, SourceRemoval::Removed) => "original removed".to_string(),
        (FileStatus::Success, SourceRemoval::Failed(failure)) => {
            format!("original kept: {}", failure.message)
        }
        (FileStatus::Success, SourceRemoval::Kept) => String::new(),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use uuid::Uuid;
    use vidcut_trim::{FailureKind, FileFailure};

    fn outcome(name: &str, status: FileStatus, source: SourceRemoval) -> FileOutcome {
        FileOutcome {
            path: PathBuf::from("/videos").join(name),
            status,
            output_path: Some(PathBuf::from("/videos").join(format!("Cut {name}"))),
            source,
        }
    }

    #[test]
    fn batch_table_lists_outcomes_in_order() {
        let result = BatchResult {
            batch_id: Uuid::nil(),
            retained_seconds: 30,
            outcomes: vec![
                outcome("a.mp4", FileStatus::Success, SourceRemoval::Removed),
                outcome(
                    "b.mp4",
                    FileStatus::Failed(FileFailure {
                        kind: FailureKind::ProbeFailed,
                        message: "ffprobe exited with status 1".into(),
                    }),
                    SourceRemoval::Kept,
                ),
                outcome(
                    "c.avi",
                    FileStatus::Success,
                    SourceRemoval::Failed(FileFailure {
                        kind: FailureKind::DeleteFailed,
                        message: "permission denied".into(),
                    }),
                ),
            ],
        };
        let table = format_batch_table(&result);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("STATUS"));
        assert!(lines[1].starts_with("ok") && lines[1].contains("Cut a.mp4"));
        assert!(lines[1].ends_with("original removed"));
        assert!(lines[2].contains("probe_failed: ffprobe exited with status 1"));
        assert!(lines[3].ends_with("original kept: permission denied"));
        assert_eq!(lines[4], "2 succeeded, 1 failed, 0 skipped");
        assert_eq!(lines[5], "1 original(s) could not be removed");
    }

    #[test]
    fn plan_table_shows_offsets_and_failures() {
        let plans = vec![
            PlannedTrim {
                path: PathBuf::from("/videos/a.mp4"),
                output_path: Some(PathBuf::from("/videos/Cut a.mp4")),
                output_exists: true,
                plan: PlanStatus::Ready {
                    total_duration: Duration::from_millis(95_500),
                    seek_start: Duration::from_millis(65_500),
                },
            },
            PlannedTrim {
                path: PathBuf::from("/videos/b.mp4"),
                output_path: Some(PathBuf::from("/videos/Cut b.mp4")),
                output_exists: false,
                plan: PlanStatus::ProbeFailed(FileFailure {
                    kind: FailureKind::ProbeFailed,
                    message: "duration missing".into(),
                }),
            },
            PlannedTrim {
                path: PathBuf::from("/"),
                output_path: None,
                output_exists: false,
                plan: PlanStatus::Blocked(FileFailure {
                    kind: FailureKind::InvalidInput,
                    message: "input_paths is missing_file_name: \"/\"".into(),
                }),
            },
        ];
        let table = format_plan_table(&plans);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[1].contains("95.500s") && lines[1].contains("65.500s"));
        assert!(lines[1].ends_with("output exists"));
        assert!(lines[2].ends_with("duration missing"));
        assert!(lines[3].starts_with('/'));
        assert!(lines[3].contains(" - "));
        assert!(lines[3].ends_with("missing_file_name: \"/\""));
    }

    #[test]
    fn progress_lines_cover_file_events_only() {
        let batch_id = Uuid::nil();
        assert_eq!(
            progress_line(&Event::FileStarted {
                batch_id,
                index: 0,
                path: "/videos/a.mp4".into(),
            }),
            Some("[1] /videos/a.mp4".to_string())
        );
        assert_eq!(
            progress_line(&Event::FileCompleted {
                batch_id,
                path: "/videos/a.mp4".into(),
                output_path: "/videos/Cut a.mp4".into(),
                source_removed: true,
            }),
            Some("    wrote /videos/Cut a.mp4; original removed".to_string())
        );
        assert_eq!(
            progress_line(&Event::FileProgress {
                batch_id,
                path: "/videos/a.mp4".into(),
                step: "probe".into(),
            }),
            None
        );
        assert_eq!(progress_line(&Event::SelectionReset), None);
    }
}
