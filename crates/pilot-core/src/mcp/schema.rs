//! MCP file schema.
//!
//! The MCP file is shared with the assistant CLI, which stores plenty of
//! unrelated state in it. Only `mcpServers` is interpreted; everything else
//! is carried through verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PilotError, Result};

/// Transport kinds understood by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportType {
    #[default]
    Stdio,
    Http,
    Sse,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Stdio => "stdio",
            TransportType::Http => "http",
            TransportType::Sse => "sse",
        }
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, TransportType::Stdio)
    }
}

impl TryFrom<&str> for TransportType {
    type Error = PilotError;

    fn try_from(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "stdio" => Ok(TransportType::Stdio),
            "http" => Ok(TransportType::Http),
            "sse" => Ok(TransportType::Sse),
            _ => Err(PilotError::InvalidInput(format!(
                "Invalid transport: '{}'. Valid values: stdio, http, sse",
                value
            ))),
        }
    }
}

/// A locally spawned server. `command[0]` is the executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StdioService {
    pub command: Vec<String>,
}

impl StdioService {
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }
}

/// A server reached over HTTP or SSE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteService {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServiceDescriptor {
    Stdio(StdioService),
    Http(RemoteService),
    Sse(RemoteService),
}

impl ServiceDescriptor {
    pub fn stdio(command: Vec<String>) -> Self {
        ServiceDescriptor::Stdio(StdioService { command })
    }

    pub fn remote(
        transport: TransportType,
        url: String,
        headers: Option<BTreeMap<String, String>>,
    ) -> Self {
        let service = RemoteService { url, headers };
        match transport {
            TransportType::Sse => ServiceDescriptor::Sse(service),
            _ => ServiceDescriptor::Http(service),
        }
    }

    pub fn transport(&self) -> TransportType {
        match self {
            ServiceDescriptor::Stdio(_) => TransportType::Stdio,
            ServiceDescriptor::Http(_) => TransportType::Http,
            ServiceDescriptor::Sse(_) => TransportType::Sse,
        }
    }

    /// One-line description: the command line or the URL.
    pub fn summary(&self) -> String {
        match self {
            ServiceDescriptor::Stdio(s) => s.command.join(" "),
            ServiceDescriptor::Http(r) | ServiceDescriptor::Sse(r) => r.url.clone(),
        }
    }
}

/// A value under `mcpServers`.
///
/// Entries written by other tools in shapes this editor does not model are
/// kept as raw JSON so that saving never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum McpServerEntry {
    Service(ServiceDescriptor),
    Unrecognized(Value),
}

impl McpServerEntry {
    pub fn as_service(&self) -> Option<&ServiceDescriptor> {
        match self {
            McpServerEntry::Service(service) => Some(service),
            McpServerEntry::Unrecognized(_) => None,
        }
    }

    /// Type label for listings; unrecognized entries report their own
    /// `type` field when they have one.
    pub fn type_label(&self) -> String {
        match self {
            McpServerEntry::Service(service) => service.transport().as_str().to_string(),
            McpServerEntry::Unrecognized(value) => value
                .get("type")
                .and_then(Value::as_str)
                .map(|t| format!("{t}?"))
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpDocument {
    #[serde(default)]
    pub mcp_servers: BTreeMap<String, McpServerEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl McpDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&McpServerEntry> {
        self.mcp_servers.get(name)
    }

    pub fn service(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.get(name).and_then(McpServerEntry::as_service)
    }

    /// Insert or fully replace the entry called `name`.
    pub fn upsert(&mut self, name: &str, descriptor: ServiceDescriptor) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PilotError::InvalidInput(
                "Service name cannot be empty".to_string(),
            ));
        }
        self.mcp_servers
            .insert(name.to_string(), McpServerEntry::Service(descriptor));
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<McpServerEntry> {
        self.mcp_servers.remove(name)
    }
}
