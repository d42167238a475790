//! MCP server entries: schema, form validation and the file store.

pub mod input;
pub mod schema;
pub mod store;

pub use input::{McpServerInput, parse_headers};
pub use schema::{
    McpDocument, McpServerEntry, RemoteService, ServiceDescriptor, StdioService, TransportType,
};
pub use store::{McpRemoval, McpStore};
