//! Pilot Core Library
//!
//! Domain logic for editing the assistant CLI's settings file (provider
//! `env` and configuration history) and its MCP server file.

pub mod context;
pub mod display;
pub mod error;
mod json_file;
pub mod mcp;
pub mod provider;
pub mod settings;

pub use error::{PilotError, Result};

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::context::PilotContext;
    pub use crate::display::mask_secret;
    pub use crate::error::{PilotError, Result};

    // Settings
    pub use crate::settings::{ConfigEntry, MigrationOutcome, SettingsDocument, SettingsStore};

    // MCP
    pub use crate::mcp::{
        McpDocument, McpServerEntry, McpServerInput, McpStore, ServiceDescriptor, TransportType,
    };

    // Providers
    pub use crate::provider::{
        API_KEY_PLACEHOLDER, ProviderTemplate, find_template, is_secret_field, templates,
    };
}
