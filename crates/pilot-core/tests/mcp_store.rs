use serde_json::{Value, json};
use tempfile::TempDir;

use pilot_core::PilotError;
use pilot_core::mcp::{McpServerInput, McpStore, ServiceDescriptor, TransportType};

fn store_in(temp: &TempDir) -> McpStore {
    McpStore::new(temp.path().join(".claude.json"))
}

fn read_file(store: &McpStore) -> Value {
    serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap()
}

#[test]
fn load_missing_returns_empty_servers() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);

    let doc = store.load().unwrap();

    assert!(doc.mcp_servers.is_empty());
    assert!(doc.extra.is_empty());
}

#[test]
fn load_malformed_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    std::fs::write(store.path(), "not json").unwrap();

    assert!(matches!(store.load(), Err(PilotError::Parse { .. })));
}

#[test]
fn upsert_stdio_splits_arguments() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);

    let doc = store
        .upsert("local", &McpServerInput::stdio("node", "server.js --port 3"))
        .unwrap();

    assert_eq!(
        doc.service("local"),
        Some(&ServiceDescriptor::stdio(vec![
            "node".into(),
            "server.js".into(),
            "--port".into(),
            "3".into(),
        ]))
    );
    assert_eq!(
        read_file(&store)["mcpServers"]["local"],
        json!({ "type": "stdio", "command": ["node", "server.js", "--port", "3"] })
    );
}

#[test]
fn invalid_headers_leave_file_untouched() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    store
        .upsert("existing", &McpServerInput::stdio("uvx", "mcp-server-time"))
        .unwrap();
    let before = std::fs::read(store.path()).unwrap();

    let err = store
        .upsert(
            "remote",
            &McpServerInput::remote(TransportType::Http, "https://mcp.dev", "{invalid json"),
        )
        .unwrap_err();

    assert!(matches!(err, PilotError::InvalidHeaders(_)));
    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}

#[test]
fn upsert_preserves_unrelated_state() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    let original = json!({
        "numStartups": 42,
        "projects": { "/work": { "mcpServers": {} } },
        "mcpServers": {
            "legacy": { "command": "npx", "args": ["-y", "thing"] }
        }
    });
    std::fs::write(store.path(), serde_json::to_vec(&original).unwrap()).unwrap();

    store
        .upsert(
            "search",
            &McpServerInput::remote(
                TransportType::Sse,
                "https://search.dev/sse",
                r#"{"Authorization": "Bearer x"}"#,
            ),
        )
        .unwrap();

    let on_disk = read_file(&store);
    assert_eq!(on_disk["numStartups"], 42);
    assert_eq!(on_disk["projects"], original["projects"]);
    assert_eq!(on_disk["mcpServers"]["legacy"], original["mcpServers"]["legacy"]);
    assert_eq!(
        on_disk["mcpServers"]["search"],
        json!({
            "type": "sse",
            "url": "https://search.dev/sse",
            "headers": { "Authorization": "Bearer x" }
        })
    );
}

#[test]
fn upsert_overwrites_same_name() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    store
        .upsert(
            "svc",
            &McpServerInput::remote(TransportType::Http, "https://a", r#"{"K": "V"}"#),
        )
        .unwrap();

    let doc = store
        .upsert("svc", &McpServerInput::remote(TransportType::Http, "https://b", ""))
        .unwrap();

    assert_eq!(
        read_file(&store)["mcpServers"]["svc"],
        json!({ "type": "http", "url": "https://b" })
    );
    assert_eq!(doc.mcp_servers.len(), 1);
}

#[test]
fn upsert_blank_name_is_rejected() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);

    let err = store
        .upsert(" ", &McpServerInput::stdio("node", ""))
        .unwrap_err();

    assert!(matches!(err, PilotError::InvalidInput(_)));
    assert!(!store.path().exists());
}

#[test]
fn remove_missing_is_noop() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);

    let removal = store.remove("ghost").unwrap();

    assert!(removal.removed.is_none());
    assert!(!store.path().exists());
}

#[test]
fn remove_existing_persists() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    store
        .upsert("a", &McpServerInput::stdio("bin-a", ""))
        .unwrap();
    store
        .upsert("b", &McpServerInput::stdio("bin-b", ""))
        .unwrap();

    let removal = store.remove("a").unwrap();

    assert!(removal.removed.is_some());
    assert!(removal.document.get("a").is_none());
    let on_disk = read_file(&store);
    assert!(on_disk["mcpServers"].get("a").is_none());
    assert!(on_disk["mcpServers"].get("b").is_some());
}
