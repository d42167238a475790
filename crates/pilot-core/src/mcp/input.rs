//! Free-text form input for MCP servers and its validation.

use std::collections::BTreeMap;

use serde_json::Value;

use super::schema::{ServiceDescriptor, TransportType};
use crate::error::{PilotError, Result};

/// What a user types when adding or editing a server.
///
/// `args` is split on whitespace; quoting is not supported. `headers` is a
/// JSON object in text form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct McpServerInput {
    pub transport: TransportType,
    pub command: String,
    pub args: String,
    pub url: String,
    pub headers: String,
}

impl McpServerInput {
    pub fn stdio(command: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            transport: TransportType::Stdio,
            command: command.into(),
            args: args.into(),
            ..Default::default()
        }
    }

    pub fn remote(
        transport: TransportType,
        url: impl Into<String>,
        headers: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            url: url.into(),
            headers: headers.into(),
            ..Default::default()
        }
    }

    /// Validate the form and build the descriptor to store.
    pub fn to_descriptor(&self) -> Result<ServiceDescriptor> {
        match self.transport {
            TransportType::Stdio => {
                let program = self.command.trim();
                if program.is_empty() {
                    return Err(PilotError::InvalidInput(
                        "Command is required for stdio servers".to_string(),
                    ));
                }
                let mut command = vec![program.to_string()];
                command.extend(self.args.split_whitespace().map(str::to_string));
                Ok(ServiceDescriptor::stdio(command))
            }
            transport => {
                let url = self.url.trim();
                if url.is_empty() {
                    return Err(PilotError::InvalidInput(format!(
                        "URL is required for {} servers",
                        transport.as_str()
                    )));
                }
                let headers = parse_headers(&self.headers)?;
                Ok(ServiceDescriptor::remote(transport, url.to_string(), headers))
            }
        }
    }

    /// Pre-fill a form from a stored descriptor.
    pub fn from_descriptor(descriptor: &ServiceDescriptor) -> Self {
        match descriptor {
            ServiceDescriptor::Stdio(service) => Self::stdio(
                service.program().unwrap_or_default(),
                service.args().join(" "),
            ),
            ServiceDescriptor::Http(remote) | ServiceDescriptor::Sse(remote) => {
                let headers = remote
                    .headers
                    .as_ref()
                    .and_then(|h| serde_json::to_string_pretty(h).ok())
                    .unwrap_or_default();
                Self::remote(descriptor.transport(), remote.url.clone(), headers)
            }
        }
    }
}

/// Blank text means no headers.
pub fn parse_headers(text: &str) -> Result<Option<BTreeMap<String, String>>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(text)
        .map_err(|e| PilotError::InvalidHeaders(format!("not valid JSON ({e})")))?;
    let Value::Object(map) = value else {
        return Err(PilotError::InvalidHeaders(
            "expected a JSON object".to_string(),
        ));
    };

    let mut headers = BTreeMap::new();
    for (name, value) in map {
        match value {
            Value::String(s) => {
                headers.insert(name, s);
            }
            other => {
                return Err(PilotError::InvalidHeaders(format!(
                    "value for '{name}' must be a string, got {other}"
                )));
            }
        }
    }
    Ok(Some(headers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdio_args_split_on_whitespace() {
        let input = McpServerInput::stdio("node", "server.js --port 3");

        let descriptor = input.to_descriptor().unwrap();

        assert_eq!(
            descriptor,
            ServiceDescriptor::stdio(vec![
                "node".into(),
                "server.js".into(),
                "--port".into(),
                "3".into()
            ])
        );
    }

    #[test]
    fn stdio_collapses_repeated_spaces_and_trims_program() {
        let input = McpServerInput::stdio("  uvx ", "  mcp-server-git\t --repo  . ");

        let descriptor = input.to_descriptor().unwrap();

        assert_eq!(descriptor.summary(), "uvx mcp-server-git --repo .");
    }

    #[test]
    fn quoted_args_are_not_grouped() {
        let input = McpServerInput::stdio("echo", "\"hello world\"");

        let descriptor = input.to_descriptor().unwrap();

        assert_eq!(descriptor.summary(), "echo \"hello world\"");
        match descriptor {
            ServiceDescriptor::Stdio(s) => assert_eq!(s.command.len(), 3),
            other => panic!("unexpected descriptor: {other:?}"),
        }
    }

    #[test]
    fn stdio_requires_command() {
        let err = McpServerInput::stdio("  ", "x").to_descriptor().unwrap_err();
        assert!(matches!(err, PilotError::InvalidInput(_)));
    }

    #[test]
    fn remote_requires_url() {
        let err = McpServerInput::remote(TransportType::Http, "", "")
            .to_descriptor()
            .unwrap_err();
        assert!(matches!(err, PilotError::InvalidInput(_)));
    }

    #[test]
    fn invalid_header_json_is_rejected() {
        let err = McpServerInput::remote(TransportType::Http, "https://a", "{invalid json")
            .to_descriptor()
            .unwrap_err();
        assert!(matches!(err, PilotError::InvalidHeaders(_)));
    }

    #[test]
    fn header_array_is_rejected() {
        assert!(matches!(
            parse_headers("[1, 2]"),
            Err(PilotError::InvalidHeaders(_))
        ));
        assert!(matches!(
            parse_headers(r#"{"X-Retries": 3}"#),
            Err(PilotError::InvalidHeaders(_))
        ));
    }

    #[test]
    fn remote_with_headers() {
        let input = McpServerInput::remote(
            TransportType::Sse,
            " https://mcp.example.com/sse ",
            r#"{"Authorization": "Bearer t"}"#,
        );

        let descriptor = input.to_descriptor().unwrap();

        match descriptor {
            ServiceDescriptor::Sse(remote) => {
                assert_eq!(remote.url, "https://mcp.example.com/sse");
                assert_eq!(remote.headers.unwrap()["Authorization"], "Bearer t");
            }
            other => panic!("unexpected descriptor: {other:?}"),
        }
    }

    #[test]
    fn form_prefill_roundtrips() {
        let stdio = ServiceDescriptor::stdio(vec!["npx".into(), "-y".into(), "pkg".into()]);
        let form = McpServerInput::from_descriptor(&stdio);
        assert_eq!(form.command, "npx");
        assert_eq!(form.args, "-y pkg");
        assert_eq!(form.to_descriptor().unwrap(), stdio);

        let remote = ServiceDescriptor::remote(
            TransportType::Http,
            "https://a".into(),
            Some(BTreeMap::from([("K".to_string(), "V".to_string())])),
        );
        let form = McpServerInput::from_descriptor(&remote);
        assert_eq!(form.transport, TransportType::Http);
        assert_eq!(form.to_descriptor().unwrap(), remote);
    }
}
