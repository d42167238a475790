//! Resolution of the two files this tool edits.

use std::path::{Path, PathBuf};

use crate::error::{PilotError, Result};
use crate::mcp::McpStore;
use crate::settings::SettingsStore;

/// Settings path relative to the home directory.
pub const SETTINGS_RELATIVE_PATH: &str = ".claude/settings.json";

/// MCP config path relative to the home directory.
pub const MCP_RELATIVE_PATH: &str = ".claude.json";

/// File locations shared by every frontend.
///
/// Frontends build this once and hand out stores from it.
#[derive(Debug, Clone)]
pub struct PilotContext {
    settings_path: PathBuf,
    mcp_path: PathBuf,
}

impl PilotContext {
    /// Locate both files under the current user's home directory.
    pub fn with_defaults() -> Result<Self> {
        let home = dirs::home_dir().ok_or(PilotError::HomeDirUnavailable)?;
        Ok(Self::from_home(&home))
    }

    /// Default locations with either path replaced when given. The home
    /// directory is only consulted if one of them is missing.
    pub fn with_overrides(settings: Option<PathBuf>, mcp: Option<PathBuf>) -> Result<Self> {
        if let (Some(settings), Some(mcp)) = (&settings, &mcp) {
            return Ok(Self::from_paths(settings.clone(), mcp.clone()));
        }
        let mut ctx = Self::with_defaults()?;
        if let Some(path) = settings {
            ctx.settings_path = path;
        }
        if let Some(path) = mcp {
            ctx.mcp_path = path;
        }
        Ok(ctx)
    }

    pub fn from_home(home: &Path) -> Self {
        Self {
            settings_path: home.join(SETTINGS_RELATIVE_PATH),
            mcp_path: home.join(MCP_RELATIVE_PATH),
        }
    }

    pub fn from_paths(settings_path: PathBuf, mcp_path: PathBuf) -> Self {
        Self {
            settings_path,
            mcp_path,
        }
    }

    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = path;
        self
    }

    pub fn with_mcp_path(mut self, path: PathBuf) -> Self {
        self.mcp_path = path;
        self
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn mcp_path(&self) -> &Path {
        &self.mcp_path
    }

    pub fn settings_store(&self) -> SettingsStore {
        SettingsStore::new(self.settings_path.clone())
    }

    pub fn mcp_store(&self) -> McpStore {
        McpStore::new(self.mcp_path.clone())
    }
}
