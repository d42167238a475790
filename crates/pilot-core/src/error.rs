//! Error taxonomy shared by the settings and MCP stores.

use std::path::{Path, PathBuf};

/// Errors surfaced by store operations.
///
/// None of these are fatal: a failed operation leaves the file on disk as it
/// was before the call.
#[derive(Debug, thiserror::Error)]
pub enum PilotError {
    /// The file exists but is not valid JSON of the expected shape.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem read, write, mkdir, rename or copy failure.
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Unknown provider template: '{0}'")]
    UnknownProvider(String),

    #[error("{kind} not found: '{id}'")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid headers: {0}")]
    InvalidHeaders(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not determine home directory")]
    HomeDirUnavailable,
}

impl PilotError {
    pub(crate) fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn config_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "Configuration",
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PilotError>;
