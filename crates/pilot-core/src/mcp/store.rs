//! MCP store: read-modify-write cycles over the MCP file.

use std::path::{Path, PathBuf};

use super::input::McpServerInput;
use super::schema::{McpDocument, McpServerEntry, ServiceDescriptor};
use crate::error::Result;
use crate::json_file::{read_json, write_json};

#[derive(Debug, Clone)]
pub struct McpStore {
    path: PathBuf,
}

/// Result of [`McpStore::remove`].
#[derive(Debug, Clone)]
pub struct McpRemoval {
    pub document: McpDocument,
    /// The entry that was deleted, if the name existed.
    pub removed: Option<McpServerEntry>,
}

impl McpStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<McpDocument> {
        let document = read_json::<McpDocument>(&self.path)?.unwrap_or_default();
        let unrecognized: Vec<_> = document
            .mcp_servers
            .iter()
            .filter(|(_, entry)| entry.as_service().is_none())
            .map(|(name, _)| name.as_str())
            .collect();
        if !unrecognized.is_empty() {
            tracing::warn!(
                path = %self.path.display(),
                servers = ?unrecognized,
                "MCP entries in an unrecognized shape will be kept as-is"
            );
        }
        Ok(document)
    }

    pub fn save(&self, document: &McpDocument) -> Result<()> {
        write_json(&self.path, document)
    }

    /// Validate form input and store it under `name`, replacing any
    /// existing entry. Nothing is written if validation fails.
    pub fn upsert(&self, name: &str, input: &McpServerInput) -> Result<McpDocument> {
        let descriptor = input.to_descriptor()?;
        self.upsert_service(name, descriptor)
    }

    pub fn upsert_service(&self, name: &str, descriptor: ServiceDescriptor) -> Result<McpDocument> {
        let mut document = self.load()?;
        document.upsert(name, descriptor)?;
        self.save(&document)?;
        tracing::info!(name = name.trim(), "Saved MCP server");
        Ok(document)
    }

    /// Delete `name`. A missing name is not an error and leaves the file
    /// untouched.
    pub fn remove(&self, name: &str) -> Result<McpRemoval> {
        let mut document = self.load()?;
        let removed = document.remove(name);
        if removed.is_some() {
            self.save(&document)?;
            tracing::info!(name, "Removed MCP server");
        } else {
            tracing::debug!(name, "MCP server not present, nothing to remove");
        }
        Ok(McpRemoval { document, removed })
    }
}
