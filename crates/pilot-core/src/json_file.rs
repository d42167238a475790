//! Whole-document JSON file access.
//!
//! Reads return `None` for a missing file. Writes are pretty-printed and go
//! through a sibling temporary file that is renamed over the target, so a
//! failed write never truncates the existing document. The replaced file
//! keeps its permissions, and symlinks are written through.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{PilotError, Result};

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|e| PilotError::io("Failed to read", path, e))?;
    let value = serde_json::from_slice(&bytes).map_err(|e| PilotError::parse(path, e))?;
    Ok(Some(value))
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(PilotError::Serialize)?;
    bytes.push(b'\n');

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| PilotError::io("Failed to create directory", parent, e))?;
    }

    // A symlinked document is replaced at its target, leaving the link intact.
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(&target).ok().map(|m| m.permissions());

    // Created owner-only; dropped (and removed) on any early return.
    let mut tmp = tempfile::Builder::new()
        .prefix(&tmp_prefix_for(&target))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| PilotError::io("Failed to create temporary file in", dir, e))?;
    tmp.write_all(&bytes)
        .map_err(|e| PilotError::io("Failed to write", tmp.path(), e))?;
    if let Some(permissions) = permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| PilotError::io("Failed to set permissions on", tmp.path(), e))?;
    }
    tmp.persist(&target)
        .map_err(|e| PilotError::io("Failed to replace", &target, e.error))?;

    tracing::debug!(path = %target.display(), bytes = bytes.len(), "Wrote JSON document");
    Ok(())
}

fn tmp_prefix_for(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.json".to_string());
    format!(".{file_name}.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_none() {
        let temp = TempDir::new().unwrap();
        let value: Option<Value> = read_json(&temp.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    fn entries_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn write_creates_parent_and_uses_two_space_indent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/doc.json");

        write_json(&path, &json!({"a": {"b": 1}})).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"a\": {\n    \"b\": 1\n  }"));
        assert_eq!(entries_in(path.parent().unwrap()), vec!["doc.json"]);
    }

    #[test]
    fn failed_replace_leaves_target_and_no_temp_file() {
        let temp = TempDir::new().unwrap();
        // A non-empty directory in the target's place cannot be renamed over.
        let path = temp.path().join("settings.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), "untouched").unwrap();

        let err = write_json(&path, &json!({"env": {}})).unwrap_err();

        assert!(matches!(err, PilotError::Io { .. }));
        assert_eq!(fs::read_to_string(path.join("keep.txt")).unwrap(), "untouched");
        assert_eq!(entries_in(temp.path()), vec!["settings.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn write_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        write_json(&path, &json!({"env": {"ANTHROPIC_API_KEY": "sk-1"}})).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn write_goes_through_symlink() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("dotfiles-settings.json");
        let link = temp.path().join("settings.json");
        fs::write(&real, "{}").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_json(&link, &json!({"env": {"A": "1"}})).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        let written: Value = serde_json::from_slice(&fs::read(&real).unwrap()).unwrap();
        assert_eq!(written, json!({"env": {"A": "1"}}));
        assert_eq!(
            entries_in(temp.path()),
            vec!["dotfiles-settings.json", "settings.json"]
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_json::<Value>(&path).unwrap_err();
        assert!(matches!(err, PilotError::Parse { .. }));
    }
}
