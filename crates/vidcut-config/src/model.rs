//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers; loading and validation live in `loader.rs` and `validate.rs`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_FFMPEG_PATH, DEFAULT_FFPROBE_PATH, DEFAULT_LOG_LEVEL, DEFAULT_OUTPUT_PREFIX,
};

/// What to do when the derived output path already exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Replace the existing file.
    #[default]
    Overwrite,
    /// Report the file as failed without touching the existing output.
    Fail,
    /// Leave the existing output alone and mark the file as skipped.
    Skip,
}

impl ConflictPolicy {
    /// Render the policy as its lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "fail" => Ok(Self::Fail),
            "skip" => Ok(Self::Skip),
            other => Err(other.to_string()),
        }
    }
}

/// How the transcode engine writes the retained segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CodecMode {
    /// Decode and re-encode with the container's default codecs. Frame accurate.
    #[default]
    Reencode,
    /// Copy the streams without re-encoding. Fast, but cuts snap to keyframes.
    Copy,
}

impl CodecMode {
    /// Render the mode as its lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reencode => "reencode",
            Self::Copy => "copy",
        }
    }
}

impl FromStr for CodecMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reencode" => Ok(Self::Reencode),
            "copy" => Ok(Self::Copy),
            other => Err(other.to_string()),
        }
    }
}

/// Effective configuration for trimming runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TrimConfig {
    /// Prefix prepended to the input file name to form the output name.
    pub output_prefix: String,
    /// Policy applied when the output path already exists.
    pub on_conflict: ConflictPolicy,
    /// Executable used for extraction.
    pub ffmpeg_path: String,
    /// Executable used for duration probing.
    pub ffprobe_path: String,
    /// Codec handling for the retained segment.
    pub codec_mode: CodecMode,
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Log output format (`json` or `pretty`); inferred from the build when absent.
    pub log_format: Option<String>,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            on_conflict: ConflictPolicy::default(),
            ffmpeg_path: DEFAULT_FFMPEG_PATH.to_string(),
            ffprobe_path: DEFAULT_FFPROBE_PATH.to_string(),
            codec_mode: CodecMode::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: None,
        }
    }
}
