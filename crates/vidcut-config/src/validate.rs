//! Validation helpers for configuration documents.

use crate::defaults::LOG_FORMATS;
use crate::error::{ConfigError, ConfigResult};
use crate::model::TrimConfig;

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for the first field that fails validation.
pub fn validate_config(config: &TrimConfig, section: &'static str) -> ConfigResult<()> {
    validate_output_prefix(&config.output_prefix, section)?;
    validate_executable(&config.ffmpeg_path, section, "ffmpeg_path")?;
    validate_executable(&config.ffprobe_path, section, "ffprobe_path")?;

    if config.log_level.trim().is_empty() {
        return Err(ConfigError::invalid(
            section,
            "log_level",
            config.log_level.clone(),
            "empty",
        ));
    }
    if let Some(format) = &config.log_format {
        let normalised = format.trim().to_ascii_lowercase();
        if !LOG_FORMATS.contains(&normalised.as_str()) {
            return Err(ConfigError::invalid(
                section,
                "log_format",
                format.clone(),
                "unknown_format",
            ));
        }
    }
    Ok(())
}

/// The prefix must be non-empty and must not contain path separators, so the
/// derived output always sits next to the input and never aliases it. A
/// leading `-` is refused because the output is handed to ffmpeg as a file
/// operand.
pub(crate) fn validate_output_prefix(prefix: &str, section: &'static str) -> ConfigResult<()> {
    if prefix.is_empty() {
        return Err(ConfigError::invalid(section, "output_prefix", prefix, "empty"));
    }
    if prefix.contains(['/', '\\']) {
        return Err(ConfigError::invalid(
            section,
            "output_prefix",
            prefix,
            "path_separator",
        ));
    }
    if prefix.starts_with('-') {
        return Err(ConfigError::invalid(
            section,
            "output_prefix",
            prefix,
            "leading_dash",
        ));
    }
    Ok(())
}

fn validate_executable(value: &str, section: &'static str, field: &'static str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(section, field, value, "empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&TrimConfig::default(), "file").is_ok());
    }

    #[test]
    fn prefix_rules_reject_aliasing_values() {
        for (prefix, reason) in [
            ("", "empty"),
            ("out/", "path_separator"),
            ("a\\b", "path_separator"),
            ("-f ", "leading_dash"),
        ] {
            let err = validate_output_prefix(prefix, "file").err();
            assert!(
                matches!(
                    err,
                    Some(ConfigError::InvalidField { field: "output_prefix", reason: r, .. }) if r == reason
                ),
                "prefix {prefix:?} should fail with {reason}"
            );
        }
        assert!(validate_output_prefix("Trimmed-", "file").is_ok());
    }

    #[test]
    fn log_format_and_executables_are_checked() {
        let config = TrimConfig {
            log_format: Some("xml".into()),
            ..TrimConfig::default()
        };
        assert!(matches!(
            validate_config(&config, "env"),
            Err(ConfigError::InvalidField {
                field: "log_format",
                ..
            })
        ));

        let config = TrimConfig {
            ffprobe_path: "  ".into(),
            ..TrimConfig::default()
        };
        assert!(matches!(
            validate_config(&config, "file"),
            Err(ConfigError::InvalidField {
                field: "ffprobe_path",
                reason: "empty",
                ..
            })
        ));
    }
}
