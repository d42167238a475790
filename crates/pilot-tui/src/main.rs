//! Pilot TUI - Terminal User Interface
//!
//! Ratatui-based browser for the Claude settings file and MCP servers.

mod app;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pilot_core::context::PilotContext;

use crate::app::App;

#[derive(Parser)]
#[command(name = "pilot-tui")]
#[command(about = "Browse provider settings and MCP servers", long_about = None)]
struct Cli {
    /// Use this settings file instead of ~/.claude/settings.json
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Use this MCP file instead of ~/.claude.json
    #[arg(long, value_name = "PATH")]
    mcp: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs would draw over the screen, so only enable them on request.
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let ctx = PilotContext::with_overrides(cli.settings, cli.mcp)?;
    let mut app = App::new(ctx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_tui(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn run_tui(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code);
        }
    }
    Ok(())
}
