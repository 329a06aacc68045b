//! Configuration loading from an optional JSON file and environment overrides.
//!
//! # Design
//! - Layering order: defaults, then the file, then `VIDCUT_*` variables.
//! - Environment access goes through a lookup closure so tests never mutate
//!   the process environment.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{CodecMode, ConflictPolicy, TrimConfig};
use crate::validate::validate_config;

/// Environment variable overriding the ffmpeg executable.
pub const ENV_FFMPEG: &str = "VIDCUT_FFMPEG";
/// Environment variable overriding the ffprobe executable.
pub const ENV_FFPROBE: &str = "VIDCUT_FFPROBE";
/// Environment variable overriding the output prefix.
pub const ENV_OUTPUT_PREFIX: &str = "VIDCUT_OUTPUT_PREFIX";
/// Environment variable overriding the output conflict policy.
pub const ENV_ON_CONFLICT: &str = "VIDCUT_ON_CONFLICT";
/// Environment variable overriding the codec mode.
pub const ENV_CODEC_MODE: &str = "VIDCUT_CODEC_MODE";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "VIDCUT_LOG_LEVEL";
/// Environment variable overriding the log format.
pub const ENV_LOG_FORMAT: &str = "VIDCUT_LOG_FORMAT";

impl TrimConfig {
    /// Load configuration from the optional file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the merged
    /// configuration fails validation.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    /// Load configuration using a caller-supplied environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the merged
    /// configuration fails validation.
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        validate_config(&config, "merged")?;
        debug!(
            output_prefix = %config.output_prefix,
            on_conflict = config.on_conflict.as_str(),
            codec_mode = config.codec_mode.as_str(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        validate_config(&config, "file")?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env(ENV_FFMPEG) {
            self.ffmpeg_path = value;
        }
        if let Some(value) = env(ENV_FFPROBE) {
            self.ffprobe_path = value;
        }
        if let Some(value) = env(ENV_OUTPUT_PREFIX) {
            self.output_prefix = value;
        }
        if let Some(value) = env(ENV_ON_CONFLICT) {
            self.on_conflict = value.parse::<ConflictPolicy>().map_err(|label| {
                ConfigError::invalid("env", "on_conflict", label, "unknown_policy")
            })?;
        }
        if let Some(value) = env(ENV_CODEC_MODE) {
            self.codec_mode = value
                .parse::<CodecMode>()
                .map_err(|label| ConfigError::invalid("env", "codec_mode", label, "unknown_mode"))?;
        }
        if let Some(value) = env(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = env(ENV_LOG_FORMAT) {
            self.log_format = Some(value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let config = TrimConfig::load_with_env(None, no_env)?;
        assert_eq!(config, TrimConfig::default());
        Ok(())
    }

    #[test]
    fn file_values_are_layered_under_env() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("vidcut.json");
        fs::write(
            &path,
            r#"{"output_prefix": "Tail ", "on_conflict": "skip", "codec_mode": "copy"}"#,
        )?;

        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_ON_CONFLICT, "fail"), (ENV_FFMPEG, "/opt/ffmpeg/bin/ffmpeg")]);
        let config = TrimConfig::load_with_env(Some(&path), |name| {
            env.get(name).map(|value| (*value).to_string())
        })?;

        assert_eq!(config.output_prefix, "Tail ");
        assert_eq!(config.codec_mode, CodecMode::Copy);
        assert_eq!(config.on_conflict, ConflictPolicy::Fail);
        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.ffprobe_path, "ffprobe");
        Ok(())
    }

    #[test]
    fn unknown_file_fields_are_rejected() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("vidcut.json");
        fs::write(&path, r#"{"output_prefx": "typo"}"#)?;
        let err = TrimConfig::load_with_env(Some(&path), no_env).err();
        assert!(matches!(err, Some(ConfigError::Parse { .. })));
        Ok(())
    }

    #[test]
    fn unreadable_file_reports_io_error() {
        let err = TrimConfig::load_with_env(Some(Path::new("/nonexistent/vidcut.json")), no_env)
            .err();
        assert!(matches!(err, Some(ConfigError::Io { .. })));
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let err = TrimConfig::load_with_env(None, |name| {
            (name == ENV_ON_CONFLICT).then(|| "sometimes".to_string())
        })
        .err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField {
                section: "env",
                field: "on_conflict",
                ..
            })
        ));

        let err = TrimConfig::load_with_env(None, |name| {
            (name == ENV_OUTPUT_PREFIX).then(|| "nested/".to_string())
        })
        .err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField {
                field: "output_prefix",
                reason: "path_separator",
                ..
            })
        ));
    }
}
