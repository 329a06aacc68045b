//! Output path derivation, staging and in-batch collision checks.

use std::collections::HashSet;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs;

use crate::error::{TrimError, TrimResult};

const STAGING_PREFIX: &str = ".vidcut-";

/// Output path for `input`: same directory, file name prefixed with `prefix`.
///
/// The extension is preserved because the prefix is applied to the whole file
/// name. `/videos/a.mp4` with prefix `"Cut "` becomes `/videos/Cut a.mp4`.
///
/// # Errors
///
/// Returns [`TrimError::InvalidRequest`] when `input` has no file name or the
/// prefix is unusable (see [`validate_prefix`]).
pub fn derive_output_path(input: &Path, prefix: &str) -> TrimResult<PathBuf> {
    validate_prefix(prefix)?;
    let file_name = input.file_name().ok_or_else(|| {
        TrimError::invalid(
            "input_paths",
            "missing_file_name",
            Some(input.display().to_string()),
        )
    })?;

    let mut name = OsString::from(prefix);
    name.push(file_name);
    Ok(input.parent().map_or_else(|| PathBuf::from(&name), |dir| dir.join(&name)))
}

/// A prefix must be non-empty, free of path separators and must not start
/// with `-`, so the output sits next to its input and is never read as a tool
/// option.
pub(crate) fn validate_prefix(prefix: &str) -> TrimResult<()> {
    if prefix.is_empty() {
        return Err(TrimError::invalid("output_prefix", "empty", None));
    }
    if prefix.contains(['/', '\\']) {
        return Err(TrimError::invalid(
            "output_prefix",
            "path_separator",
            Some(prefix.to_string()),
        ));
    }
    if prefix.starts_with('-') {
        return Err(TrimError::invalid(
            "output_prefix",
            "leading_dash",
            Some(prefix.to_string()),
        ));
    }
    Ok(())
}

/// Hidden sibling of `output` that the engine writes into.
///
/// The extension is kept so the engine picks the same container. Dropping the
/// returned path removes the file; `persist` moves it over `output`.
pub(crate) fn staging_path(output: &Path) -> io::Result<TempPath> {
    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let suffix = output.extension().map(|ext| {
        let mut suffix = OsString::from(".");
        suffix.push(ext);
        suffix
    });

    let mut builder = tempfile::Builder::new();
    builder.prefix(STAGING_PREFIX);
    if let Some(suffix) = &suffix {
        builder.suffix(suffix);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Regular file mode, still narrowed by the umask.
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    Ok(builder.tempfile_in(dir)?.into_temp_path())
}

/// Locations of every input in a batch, resolved through their directories so
/// `clip.mp4` and `./clip.mp4` compare equal.
pub(crate) struct BatchInputs {
    locations: HashSet<PathBuf>,
}

impl BatchInputs {
    pub(crate) async fn collect(paths: &[PathBuf]) -> Self {
        let mut locations = HashSet::with_capacity(paths.len());
        for path in paths {
            locations.insert(resolve_location(path).await);
        }
        Self { locations }
    }

    /// Whether writing `output` would replace one of the batch inputs.
    pub(crate) async fn contains(&self, output: &Path) -> bool {
        self.locations.contains(&resolve_location(output).await)
    }
}

async fn resolve_location(path: &Path) -> PathBuf {
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    fs::canonicalize(dir)
        .await
        .map_or_else(|_| path.to_path_buf(), |dir| dir.join(name))
}
