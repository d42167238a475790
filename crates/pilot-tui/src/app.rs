//! Browser state and key handling, independent of the terminal.

use crossterm::event::KeyCode;
use ratatui::widgets::ListState;

use pilot_core::context::PilotContext;
use pilot_core::mcp::McpDocument;
use pilot_core::settings::SettingsDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Environment,
    History,
    Mcp,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Environment, Tab::History, Tab::Mcp];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Environment => "Environment",
            Tab::History => "History",
            Tab::Mcp => "MCP",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Environment => 0,
            Tab::History => 1,
            Tab::Mcp => 2,
        }
    }

    fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

impl Status {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Deletion waiting for a `y` keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDelete {
    Config { id: String, label: String },
    McpServer { name: String },
}

pub struct App {
    ctx: PilotContext,
    pub tab: Tab,
    pub settings: SettingsDocument,
    pub mcp: McpDocument,
    pub env_state: ListState,
    pub history_state: ListState,
    pub mcp_state: ListState,
    pub pending: Option<PendingDelete>,
    pub status: Status,
    pub should_quit: bool,
}

impl App {
    pub fn new(ctx: PilotContext) -> Self {
        let mut app = Self {
            ctx,
            tab: Tab::Environment,
            settings: SettingsDocument::default(),
            mcp: McpDocument::default(),
            env_state: ListState::default(),
            history_state: ListState::default(),
            mcp_state: ListState::default(),
            pending: None,
            status: Status::info("Ready"),
            should_quit: false,
        };
        app.reload();
        app
    }

    pub fn context(&self) -> &PilotContext {
        &self.ctx
    }

    /// Re-read both files. A failure on one leaves the other loaded.
    pub fn reload(&mut self) {
        let mut errors = Vec::new();

        match self.ctx.settings_store().load() {
            Ok(doc) => self.settings = doc,
            Err(err) => errors.push(err.to_string()),
        }
        match self.ctx.mcp_store().load() {
            Ok(doc) => self.mcp = doc,
            Err(err) => errors.push(err.to_string()),
        }

        self.clamp_selections();
        self.status = if errors.is_empty() {
            Status::info("Loaded")
        } else {
            tracing::warn!(?errors, "Reload failed");
            Status::error(errors.join("; "))
        };
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if let Some(pending) = self.pending.take() {
            if matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                self.confirm_delete(pending);
            } else {
                self.status = Status::info("Delete cancelled");
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::Char('1') => self.tab = Tab::Environment,
            KeyCode::Char('2') => self.tab = Tab::History,
            KeyCode::Char('3') => self.tab = Tab::Mcp,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Enter => self.switch_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
    }

    fn len_of(&self, tab: Tab) -> usize {
        match tab {
            Tab::Environment => self.settings.env.len(),
            Tab::History => self.settings.config_history.len(),
            Tab::Mcp => self.mcp.mcp_servers.len(),
        }
    }

    fn state_mut(&mut self, tab: Tab) -> &mut ListState {
        match tab {
            Tab::Environment => &mut self.env_state,
            Tab::History => &mut self.history_state,
            Tab::Mcp => &mut self.mcp_state,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.len_of(self.tab);
        if len == 0 {
            return;
        }
        let state = self.state_mut(self.tab);
        let current = state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        state.select(Some(next));
    }

    fn clamp_selections(&mut self) {
        for tab in Tab::ALL {
            let len = self.len_of(tab);
            let state = self.state_mut(tab);
            match (len, state.selected()) {
                (0, _) => state.select(None),
                (_, None) => state.select(Some(0)),
                (len, Some(i)) if i >= len => state.select(Some(len - 1)),
                _ => {}
            }
        }
    }

    fn selected_config_id(&self) -> Option<String> {
        let index = self.history_state.selected()?;
        self.settings
            .config_history
            .get(index)
            .map(|entry| entry.id.clone())
    }

    fn selected_mcp_name(&self) -> Option<String> {
        let index = self.mcp_state.selected()?;
        self.mcp.mcp_servers.keys().nth(index).cloned()
    }

    fn switch_selected(&mut self) {
        if self.tab != Tab::History {
            return;
        }
        let Some(id) = self.selected_config_id() else {
            return;
        };
        match self.ctx.settings_store().switch_active(&id) {
            Ok(doc) => {
                self.settings = doc;
                let name = self
                    .settings
                    .find_entry(&id)
                    .map(|e| e.name.clone())
                    .unwrap_or_default();
                self.status = Status::info(format!("Switched to {name} ({id})"));
            }
            Err(err) => self.status = Status::error(err.to_string()),
        }
        self.clamp_selections();
    }

    fn request_delete(&mut self) {
        let pending = match self.tab {
            Tab::History => self.selected_config_id().map(|id| {
                let label = self
                    .settings
                    .find_entry(&id)
                    .map(|e| format!("{} ({})", e.name, e.id))
                    .unwrap_or_else(|| id.clone());
                PendingDelete::Config { id, label }
            }),
            Tab::Mcp => self
                .selected_mcp_name()
                .map(|name| PendingDelete::McpServer { name }),
            Tab::Environment => None,
        };

        if let Some(pending) = pending {
            let target = match &pending {
                PendingDelete::Config { label, .. } => format!("configuration {label}"),
                PendingDelete::McpServer { name } => format!("MCP server '{name}'"),
            };
            self.status = Status::info(format!("Delete {target}? (y/n)"));
            self.pending = Some(pending);
        }
    }

    fn confirm_delete(&mut self, pending: PendingDelete) {
        match pending {
            PendingDelete::Config { id, label } => {
                match self.ctx.settings_store().delete_config(&id) {
                    Ok(doc) => {
                        self.settings = doc;
                        self.status = Status::info(format!("Deleted {label}"));
                    }
                    Err(err) => self.status = Status::error(err.to_string()),
                }
            }
            PendingDelete::McpServer { name } => match self.ctx.mcp_store().remove(&name) {
                Ok(removal) => {
                    self.mcp = removal.document;
                    self.status = Status::info(format!("Removed MCP server '{name}'"));
                }
                Err(err) => self.status = Status::error(err.to_string()),
            },
        }
        self.clamp_selections();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn app_with(settings: serde_json::Value, mcp: serde_json::Value) -> (TempDir, App) {
        let temp = TempDir::new().unwrap();
        let settings_path = temp.path().join("settings.json");
        let mcp_path = temp.path().join("mcp.json");
        std::fs::write(&settings_path, serde_json::to_vec(&settings).unwrap()).unwrap();
        std::fs::write(&mcp_path, serde_json::to_vec(&mcp).unwrap()).unwrap();
        let app = App::new(PilotContext::from_paths(settings_path, mcp_path));
        (temp, app)
    }

    fn two_configs() -> serde_json::Value {
        json!({
            "env": { "A": "1" },
            "configHistory": [
                { "id": "1", "name": "Claude", "fields": { "A": "1" }, "isActive": true },
                { "id": "2", "name": "GLM", "fields": { "B": "2" }, "isActive": false }
            ]
        })
    }

    #[test]
    fn tab_cycles_through_all_tabs() {
        let (_temp, mut app) = app_with(json!({}), json!({}));

        app.handle_key(KeyCode::Tab);
        assert_eq!(app.tab, Tab::History);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.tab, Tab::Mcp);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.tab, Tab::Environment);
    }

    #[test]
    fn enter_switches_selected_history_entry() {
        let (_temp, mut app) = app_with(two_configs(), json!({}));

        app.handle_key(KeyCode::Char('2'));
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.settings.active_entry().unwrap().id, "2");
        assert_eq!(app.settings.env.get("B").map(String::as_str), Some("2"));
        assert!(!app.settings.env.contains_key("A"));
        assert!(!app.status.is_error);
    }

    #[test]
    fn delete_requires_confirmation() {
        let (_temp, mut app) = app_with(two_configs(), json!({}));
        app.handle_key(KeyCode::Char('2'));

        app.handle_key(KeyCode::Char('d'));
        assert!(app.pending.is_some());
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.settings.config_history.len(), 2);

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char('y'));
        assert_eq!(app.settings.config_history.len(), 1);
        // The active entry was deleted, so env is cleared.
        assert!(app.settings.env.is_empty());
    }

    #[test]
    fn mcp_delete_updates_file() {
        let (_temp, mut app) = app_with(
            json!({}),
            json!({ "mcpServers": { "a": { "type": "stdio", "command": ["x"] } } }),
        );
        app.handle_key(KeyCode::Char('3'));

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char('y'));

        assert!(app.mcp.mcp_servers.is_empty());
        let on_disk: serde_json::Value =
            serde_json::from_slice(&std::fs::read(app.context().mcp_path()).unwrap()).unwrap();
        assert_eq!(on_disk["mcpServers"], json!({}));
        assert_eq!(app.mcp_state.selected(), None);
    }

    #[test]
    fn malformed_file_is_reported_not_fatal() {
        let temp = TempDir::new().unwrap();
        let settings_path = temp.path().join("settings.json");
        std::fs::write(&settings_path, "{ broken").unwrap();

        let app = App::new(PilotContext::from_paths(
            settings_path,
            temp.path().join("mcp.json"),
        ));

        assert!(app.status.is_error);
        assert!(app.settings.env.is_empty());
    }

    #[test]
    fn selection_wraps_around() {
        let (_temp, mut app) = app_with(two_configs(), json!({}));
        app.handle_key(KeyCode::Char('2'));

        app.handle_key(KeyCode::Up);

        assert_eq!(app.history_state.selected(), Some(1));
    }
}
