use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, List, ListItem, Paragraph, Tabs},
};

use pilot_core::display::mask_secret;
use pilot_core::provider::is_secret_field;

use crate::app::{App, Tab};

const KEY_HELP: &str = "Tab/1-3 tabs  j/k move  Enter switch  d delete  r reload  q quit";

pub fn draw(f: &mut Frame, app: &mut App) {
    let [tabs_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .areas(f.area());

    let titles = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| format!("{} {}", i + 1, tab.title()));
    let tabs = Tabs::new(titles)
        .block(Block::bordered().title("Pilot"))
        .select(app.tab.index())
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, tabs_area);

    let highlight = Style::default().add_modifier(Modifier::REVERSED);
    match app.tab {
        Tab::Environment => {
            let list = List::new(env_items(app))
                .block(Block::bordered().title(app.context().settings_path().display().to_string()))
                .highlight_style(highlight);
            f.render_stateful_widget(list, body_area, &mut app.env_state);
        }
        Tab::History => {
            let list = List::new(history_items(app))
                .block(Block::bordered().title("Configuration history"))
                .highlight_style(highlight);
            f.render_stateful_widget(list, body_area, &mut app.history_state);
        }
        Tab::Mcp => {
            let list = List::new(mcp_items(app))
                .block(Block::bordered().title(app.context().mcp_path().display().to_string()))
                .highlight_style(highlight);
            f.render_stateful_widget(list, body_area, &mut app.mcp_state);
        }
    }

    let message = if app.status.is_error {
        Span::from(app.status.message.as_str()).red()
    } else {
        Span::from(app.status.message.as_str())
    };
    let status = Paragraph::new(Line::from(message)).block(Block::bordered().title(KEY_HELP));
    f.render_widget(status, status_area);
}

fn env_items(app: &App) -> Vec<ListItem<'static>> {
    if app.settings.env.is_empty() {
        return vec![ListItem::new("(no environment variables)".dim())];
    }
    app.settings
        .env
        .iter()
        .map(|(key, value)| {
            let shown = if is_secret_field(key) {
                mask_secret(value)
            } else {
                value.clone()
            };
            ListItem::new(Line::from(vec![
                Span::from(format!("{key:<34}")).bold(),
                Span::from(shown),
            ]))
        })
        .collect()
}

fn history_items(app: &App) -> Vec<ListItem<'static>> {
    app.settings
        .config_history
        .iter()
        .map(|entry| {
            let marker = if entry.is_active { "● " } else { "  " };
            let line = Line::from(vec![
                Span::from(marker).green(),
                Span::from(format!("{} {:<16}", entry.icon, entry.name)),
                Span::from(format!(" {:<10}", entry.provider_key)).dim(),
                Span::from(format!(
                    " {}  {}",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.id
                ))
                .dim(),
            ]);
            ListItem::new(line)
        })
        .collect()
}

fn mcp_items(app: &App) -> Vec<ListItem<'static>> {
    app.mcp
        .mcp_servers
        .iter()
        .map(|(name, entry)| {
            let summary = entry
                .as_service()
                .map(|service| service.summary())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::from(format!("{name:<20}")).bold(),
                Span::from(format!(" {:<8} ", entry.type_label())).cyan(),
                Span::from(summary),
            ]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilot_core::context::PilotContext;
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;
    use tempfile::TempDir;

    fn rendered(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn environment_tab_masks_secrets() {
        let temp = TempDir::new().unwrap();
        let settings_path = temp.path().join("settings.json");
        let settings = json!({
            "env": {
                "ANTHROPIC_AUTH_TOKEN": "sk-abcdefghijklmnop",
                "ANTHROPIC_MODEL": "GLM-4.6"
            }
        });
        std::fs::write(&settings_path, settings.to_string()).unwrap();
        let mut app = App::new(PilotContext::from_paths(
            settings_path,
            temp.path().join("mcp.json"),
        ));

        let screen = rendered(&mut app);

        assert!(screen.contains("sk-abcde****"));
        assert!(!screen.contains("sk-abcdefghijklmnop"));
        assert!(screen.contains("GLM-4.6"));
    }

    #[test]
    fn mcp_tab_lists_type_and_summary() {
        let temp = TempDir::new().unwrap();
        let mcp_path = temp.path().join("mcp.json");
        let mcp = json!({
            "mcpServers": {
                "docs": { "type": "http", "url": "https://example.com/mcp" }
            }
        });
        std::fs::write(&mcp_path, mcp.to_string()).unwrap();
        let mut app = App::new(PilotContext::from_paths(
            temp.path().join("settings.json"),
            mcp_path,
        ));
        app.tab = Tab::Mcp;

        let screen = rendered(&mut app);

        assert!(screen.contains("docs"));
        assert!(screen.contains("http"));
        assert!(screen.contains("https://example.com/mcp"));
    }
}
