//! Timestamped copies of the settings file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{PilotError, Result};

/// Copy `path` next to itself with a timestamp spliced in before the
/// extension. Returns `None` when there is nothing to back up.
pub fn backup_file(path: &Path, now: DateTime<Utc>) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let target = backup_path(path, now);
    std::fs::copy(path, &target).map_err(|e| PilotError::io("Failed to back up", path, e))?;
    tracing::info!(from = %path.display(), to = %target.display(), "Backed up settings");
    Ok(Some(target))
}

/// `settings.json` -> `settings.backup.2024-05-01T10-20-30-123Z.json`
pub fn backup_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}.backup.{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}.backup.{stamp}"),
    };
    path.with_file_name(file_name)
}
