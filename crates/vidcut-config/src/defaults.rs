//! Default values for configuration records.

/// Prefix used for trimmed output files.
pub(crate) const DEFAULT_OUTPUT_PREFIX: &str = "Cut ";
/// Extraction executable resolved through `PATH`.
pub(crate) const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
/// Probe executable resolved through `PATH`.
pub(crate) const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
/// Log level used when neither the file nor the environment sets one.
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";
/// Accepted log format labels.
pub(crate) const LOG_FORMATS: &[&str] = &["json", "pretty"];
