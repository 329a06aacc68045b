//! Process-backed engine driving the `ffprobe` and `ffmpeg` executables.
//!
//! # Design
//! - One child process per operation; children are killed if their future is dropped.
//! - Argument lists are built by pure helpers so they can be tested without the binaries.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};
use vidcut_config::{CodecMode, TrimConfig};

use crate::engine::{EngineProvider, TranscodeEngine};
use crate::error::{MediaError, MediaResult};

const STDERR_TAIL_LINES: usize = 5;

/// Provider that verifies the executables respond before handing out an engine.
#[derive(Debug, Clone)]
pub struct FfmpegProvider {
    ffmpeg: String,
    ffprobe: String,
    codec_mode: CodecMode,
}

impl FfmpegProvider {
    /// Construct a provider from explicit executable paths.
    #[must_use]
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>, codec_mode: CodecMode) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            codec_mode,
        }
    }

    /// Construct a provider from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &TrimConfig) -> Self {
        Self::new(
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
            config.codec_mode,
        )
    }
}

#[async_trait]
impl EngineProvider for FfmpegProvider {
    type Engine = FfmpegEngine;

    async fn acquire(&self) -> MediaResult<FfmpegEngine> {
        ensure_available(&self.ffprobe).await?;
        ensure_available(&self.ffmpeg).await?;
        info!(
            ffmpeg = %self.ffmpeg,
            ffprobe = %self.ffprobe,
            codec_mode = self.codec_mode.as_str(),
            "ffmpeg engine acquired"
        );
        Ok(FfmpegEngine {
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
            codec_mode: self.codec_mode,
        })
    }
}

/// Engine handle bound to one batch run.
#[derive(Debug)]
pub struct FfmpegEngine {
    ffmpeg: String,
    ffprobe: String,
    codec_mode: CodecMode,
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    async fn probe_duration(&self, path: &Path) -> MediaResult<Duration> {
        let output = run_tool("probe", &self.ffprobe, probe_args(path)).await?;
        let duration = parse_probe_output(path, &output.stdout)?;
        debug!(path = %path.display(), duration_secs = duration.as_secs_f64(), "probed duration");
        Ok(duration)
    }

    async fn extract_suffix(
        &self,
        input: &Path,
        output: &Path,
        seek_start: Duration,
    ) -> MediaResult<()> {
        let args = extract_args(input, output, seek_start, self.codec_mode);
        run_tool("extract", &self.ffmpeg, args).await?;
        Ok(())
    }
}

/// Arguments asking `ffprobe` for the container duration as JSON.
#[must_use]
pub fn probe_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-v", "error", "-show_entries", "format=duration", "-of", "json"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(operand(path));
    args
}

/// Arguments asking `ffmpeg` to write `input` from `seek_start` onwards into `output`.
#[must_use]
pub fn extract_args(
    input: &Path,
    output: &Path,
    seek_start: Duration,
    codec_mode: CodecMode,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-v", "error", "-y", "-ss"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(format_seek(seek_start).into());
    args.push("-i".into());
    args.push(operand(input));
    if codec_mode == CodecMode::Copy {
        for arg in ["-map", "0", "-c", "copy", "-avoid_negative_ts", "make_zero"] {
            args.push(arg.into());
        }
    }
    args.push(operand(output));
    args
}

/// File operand for a tool argument list. Relative names starting with `-`
/// are anchored to the current directory so they are never read as options.
fn operand(path: &Path) -> OsString {
    if path.is_relative() && path.as_os_str().as_encoded_bytes().first() == Some(&b'-') {
        Path::new(".").join(path).into_os_string()
    } else {
        path.as_os_str().to_os_string()
    }
}

/// Seconds with millisecond precision, as accepted by `-ss`.
#[must_use]
pub fn format_seek(seek_start: Duration) -> String {
    format!("{:.3}", seek_start.as_secs_f64())
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Decode `ffprobe -of json` output into a duration.
///
/// # Errors
///
/// Returns an error when the output is not JSON or lacks a finite,
/// non-negative `format.duration`.
pub fn parse_probe_output(path: &Path, stdout: &[u8]) -> MediaResult<Duration> {
    let parsed: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|source| MediaError::ProbeJson {
            path: path.to_path_buf(),
            source,
        })?;
    let raw = parsed
        .format
        .and_then(|format| format.duration)
        .ok_or_else(|| MediaError::Duration {
            path: path.to_path_buf(),
            reason: "missing",
            value: None,
        })?;
    let seconds = raw.trim().parse::<f64>().map_err(|_| MediaError::Duration {
        path: path.to_path_buf(),
        reason: "not_numeric",
        value: Some(raw.clone()),
    })?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(MediaError::Duration {
            path: path.to_path_buf(),
            reason: "out_of_range",
            value: Some(raw),
        });
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| MediaError::Duration {
        path: path.to_path_buf(),
        reason: "out_of_range",
        value: Some(raw),
    })
}

async fn ensure_available(program: &str) -> MediaResult<()> {
    match run_tool("version_check", program, vec![OsString::from("-version")]).await {
        Ok(_) => Ok(()),
        Err(MediaError::Spawn { .. }) => Err(MediaError::Unavailable {
            program: program.to_string(),
            reason: "could not be started",
        }),
        Err(_) => Err(MediaError::Unavailable {
            program: program.to_string(),
            reason: "failed its version check",
        }),
    }
}

async fn run_tool(operation: &'static str, program: &str, args: Vec<OsString>) -> MediaResult<Output> {
    debug!(operation, program, args = ?args, "running media tool");
    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| MediaError::Spawn {
            operation,
            program: program.to_string(),
            source,
        })?;

    if output.status.success() {
        return Ok(output);
    }
    Err(MediaError::Exit {
        operation,
        program: program.to_string(),
        code: output.status.code(),
        stderr: stderr_tail(&output.stderr),
    })
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}
