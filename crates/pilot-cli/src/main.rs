//! Pilot - provider & MCP settings editor
//!
//! Usage:
//!   pilot settings show          # Show env and configuration history
//!   pilot provider apply glm ... # Apply a provider template
//!   pilot history switch <id>    # Restore a previous configuration
//!   pilot mcp add <name> ...     # Add or replace an MCP server
//!   pilot-tui                    # Tabbed terminal browser

mod interactive;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pilot_core::context::PilotContext;
use pilot_core::display::mask_secret;
use pilot_core::mcp::{McpDocument, McpServerInput, ServiceDescriptor, TransportType};
use pilot_core::provider::{
    API_KEY_PLACEHOLDER, ProviderTemplate, is_secret_field, require_template, templates,
};
use pilot_core::settings::{ConfigEntry, SettingsDocument};

use crate::interactive::{PrefilledOptions, ProviderWizard};

#[derive(Parser)]
#[command(name = "pilot")]
#[command(about = "Provider & MCP settings editor", long_about = None)]
struct Cli {
    /// Use this settings file instead of ~/.claude/settings.json
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Use this MCP file instead of ~/.claude.json
    #[arg(long, global = true, value_name = "PATH")]
    mcp: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the locations of the settings and MCP files
    Paths {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Inspect or reset the live settings
    Settings(SettingsArgs),

    /// List or apply provider templates
    Provider(ProviderArgs),

    /// Manage previously-applied configurations
    History(HistoryArgs),

    /// Manage MCP servers
    Mcp(McpArgs),

    /// Copy the settings file to a timestamped backup
    Backup {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// No output on success
    Quiet,
}

#[derive(Args)]
struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Subcommand)]
enum SettingsSubcommand {
    /// Show env and configuration history
    Show {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
    /// Remove every env variable and deactivate the history
    Clear {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct ProviderArgs {
    #[command(subcommand)]
    command: ProviderSubcommand,
}

#[derive(Subcommand)]
enum ProviderSubcommand {
    /// List built-in provider templates
    List {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
    /// Write a provider's fields into env and record them in the history
    Apply(Box<ApplyArgs>),
}

#[derive(Args)]
struct ApplyArgs {
    /// Provider key (claude, glm, kimi, openai, deepseek)
    ///
    /// Required unless --interactive is used
    provider: Option<String>,
    /// API key substituted into every credential field of the template
    #[arg(long, short = 'k')]
    api_key: Option<String>,
    /// Field value (KEY=VALUE); an empty value removes the key from env
    #[arg(long = "field", value_name = "KEY=VALUE")]
    fields: Vec<String>,
    /// Interactive mode - prompts for every template field
    #[arg(short, long)]
    interactive: bool,
    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
    #[arg(short = 'o', long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Args)]
struct HistoryArgs {
    #[command(subcommand)]
    command: HistorySubcommand,
}

#[derive(Subcommand)]
enum HistorySubcommand {
    /// List configuration history
    List {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
    /// Make a history entry active and replace env with its fields
    Switch {
        id: String,
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
    /// Delete a history entry (clears env if it was active)
    #[command(alias = "rm")]
    Delete {
        id: String,
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct McpArgs {
    #[command(subcommand)]
    command: McpSubcommand,
}

#[derive(Subcommand)]
enum McpSubcommand {
    /// List MCP servers
    List {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
    /// Add or replace an MCP server
    Add(Box<McpAddArgs>),
    /// Remove an MCP server
    #[command(alias = "rm")]
    Remove {
        name: String,
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct McpAddArgs {
    /// Server name
    name: String,
    /// Transport type (stdio, http, sse)
    #[arg(long, short, default_value = "stdio")]
    transport: String,
    /// Stdio executable
    #[arg(long, short)]
    command: Option<String>,
    /// Stdio arguments as one whitespace-separated string (no quoting)
    #[arg(long, short, allow_hyphen_values = true)]
    args: Option<String>,
    /// Remote server URL
    #[arg(long, short)]
    url: Option<String>,
    /// Remote headers as a JSON object, e.g. '{"Authorization": "Bearer x"}'
    #[arg(long)]
    headers: Option<String>,
    #[arg(short = 'o', long, default_value = "table")]
    format: OutputFormat,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = build_context(cli.settings, cli.mcp)?;

    run_cli(&ctx, cli.command)
}

fn build_context(settings: Option<PathBuf>, mcp: Option<PathBuf>) -> Result<PilotContext> {
    let ctx = PilotContext::with_overrides(settings, mcp)?;
    tracing::debug!(
        settings = %ctx.settings_path().display(),
        mcp = %ctx.mcp_path().display(),
        "Resolved file locations"
    );
    Ok(ctx)
}

fn run_cli(ctx: &PilotContext, command: Commands) -> Result<()> {
    match command {
        Commands::Paths { format } => print_paths(ctx, format)?,
        Commands::Settings(args) => run_settings(ctx, args)?,
        Commands::Provider(args) => run_provider(ctx, args)?,
        Commands::History(args) => run_history(ctx, args)?,
        Commands::Mcp(args) => run_mcp(ctx, args)?,
        Commands::Backup { format } => run_backup(ctx, format)?,
    }
    Ok(())
}

fn print_paths(ctx: &PilotContext, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("Settings: {}", ctx.settings_path().display());
            println!("MCP:      {}", ctx.mcp_path().display());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "settings": ctx.settings_path(),
                "mcp": ctx.mcp_path(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn run_settings(ctx: &PilotContext, args: SettingsArgs) -> Result<()> {
    let store = ctx.settings_store();
    match args.command {
        SettingsSubcommand::Show { format } => {
            let doc = store.load()?;
            match format {
                OutputFormat::Table => {
                    println!("Settings: {}", store.path().display());
                    println!();
                    print_env(&doc.env);
                    println!();
                    print_history_table(&doc);
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&doc)?),
                OutputFormat::Quiet => {}
            }
        }
        SettingsSubcommand::Clear { format } => {
            let doc = store.clear_env()?;
            print_settings_result(format, "Cleared env", &doc)?;
        }
    }
    Ok(())
}

fn run_provider(ctx: &PilotContext, args: ProviderArgs) -> Result<()> {
    match args.command {
        ProviderSubcommand::List { format } => match format {
            OutputFormat::Table => print_templates_table(templates()),
            OutputFormat::Json => print_templates_json(templates())?,
            OutputFormat::Quiet => {}
        },
        ProviderSubcommand::Apply(args) => run_apply(ctx, *args)?,
    }
    Ok(())
}

fn run_apply(ctx: &PilotContext, args: ApplyArgs) -> Result<()> {
    let overrides = parse_field_pairs(&args.fields)?;

    if args.interactive {
        return run_apply_interactive(ctx, args, overrides);
    }

    let key = args
        .provider
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Missing required argument: provider"))?;
    let template = require_template(key)?;
    let store = ctx.settings_store();

    let doc = match (&args.api_key, overrides.is_empty()) {
        (Some(api_key), true) => store.apply_provider_template(key, api_key)?,
        (Some(api_key), false) => {
            let mut fields = template.resolve_non_blank(api_key);
            fields.extend(overrides);
            store.apply_provider_config(key, ensure_filled(fields)?)?
        }
        (None, false) => store.apply_provider_config(key, ensure_filled(overrides)?)?,
        (None, true) => anyhow::bail!(
            "Nothing to apply. Use --api-key, --field KEY=VALUE, or --interactive"
        ),
    };

    print_settings_result(args.format, &format!("Applied {}", template.name), &doc)
}

fn run_apply_interactive(
    ctx: &PilotContext,
    args: ApplyArgs,
    overrides: BTreeMap<String, String>,
) -> Result<()> {
    let prefilled = PrefilledOptions {
        provider: args.provider.clone(),
        api_key: args.api_key.clone(),
        fields: overrides,
        yes: args.yes,
    };

    let mut wizard = ProviderWizard::new(prefilled);
    let result = wizard.collect()?;

    if !result.confirmed {
        println!("Nothing applied.");
        return Ok(());
    }

    let template = require_template(&result.provider)?;
    let doc = ctx
        .settings_store()
        .apply_provider_config(&result.provider, ensure_filled(result.fields)?)?;

    print_settings_result(args.format, &format!("Applied {}", template.name), &doc)
}

fn run_history(ctx: &PilotContext, args: HistoryArgs) -> Result<()> {
    let store = ctx.settings_store();
    match args.command {
        HistorySubcommand::List { format } => {
            let doc = store.load()?;
            match format {
                OutputFormat::Table => print_history_table(&doc),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&doc.config_history)?)
                }
                OutputFormat::Quiet => {}
            }
        }
        HistorySubcommand::Switch { id, format } => {
            let doc = store.switch_active(&id)?;
            let label = doc
                .find_entry(&id)
                .map(|e| format!("Switched to {} ({})", e.name, e.id))
                .unwrap_or_else(|| format!("Switched to {id}"));
            print_settings_result(format, &label, &doc)?;
        }
        HistorySubcommand::Delete { id, format } => {
            let doc = store.delete_config(&id)?;
            print_settings_result(format, &format!("Deleted configuration {id}"), &doc)?;
        }
    }
    Ok(())
}

fn run_mcp(ctx: &PilotContext, args: McpArgs) -> Result<()> {
    let store = ctx.mcp_store();
    match args.command {
        McpSubcommand::List { format } => {
            let doc = store.load()?;
            match format {
                OutputFormat::Table => print_mcp_table(&doc),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&doc.mcp_servers)?)
                }
                OutputFormat::Quiet => {}
            }
        }
        McpSubcommand::Add(args) => {
            let input = mcp_input_from_args(&args)?;
            let doc = store.upsert(&args.name, &input)?;
            match args.format {
                OutputFormat::Table => {
                    let summary = doc
                        .service(args.name.trim())
                        .map(ServiceDescriptor::summary)
                        .unwrap_or_default();
                    println!("✓ Saved MCP server '{}': {}", args.name.trim(), summary);
                }
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "name": args.name.trim(),
                        "server": doc.get(args.name.trim()),
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Quiet => {}
            }
        }
        McpSubcommand::Remove { name, format } => {
            let removal = store.remove(&name)?;
            let removed = removal.removed.is_some();
            match format {
                OutputFormat::Table => {
                    if removed {
                        println!("✓ Removed MCP server '{}'", name);
                    } else {
                        println!("• MCP server '{}' was not configured", name);
                    }
                }
                OutputFormat::Json => {
                    let output = serde_json::json!({ "name": name, "removed": removed });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Quiet => {}
            }
        }
    }
    Ok(())
}

fn run_backup(ctx: &PilotContext, format: OutputFormat) -> Result<()> {
    let backup = ctx.settings_store().backup()?;
    match format {
        OutputFormat::Table => match &backup {
            Some(path) => println!("✓ Settings backed up to {}", path.display()),
            None => println!("• No settings file to back up yet"),
        },
        OutputFormat::Json => {
            let output = serde_json::json!({ "backup": backup });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn mcp_input_from_args(args: &McpAddArgs) -> Result<McpServerInput> {
    let transport = TransportType::try_from(args.transport.as_str())?;
    let input = if transport.is_remote() {
        McpServerInput::remote(
            transport,
            args.url.clone().unwrap_or_default(),
            args.headers.clone().unwrap_or_default(),
        )
    } else {
        McpServerInput::stdio(
            args.command.clone().unwrap_or_default(),
            args.args.clone().unwrap_or_default(),
        )
    };
    Ok(input)
}

/// Parse repeated `KEY=VALUE` arguments. `KEY=` yields an empty value.
fn parse_field_pairs(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut fields = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid field '{}'. Expected KEY=VALUE", pair))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Invalid field '{}'. Key cannot be empty", pair);
        }
        fields.insert(key.to_string(), value.to_string());
    }
    Ok(fields)
}

/// Refuse to write unfilled credential placeholders into env.
fn ensure_filled(fields: BTreeMap<String, String>) -> Result<BTreeMap<String, String>> {
    if let Some((key, _)) = fields.iter().find(|(_, v)| v.contains(API_KEY_PLACEHOLDER)) {
        anyhow::bail!("Field '{}' still needs a value (pass --api-key)", key);
    }
    Ok(fields)
}

fn display_value(key: &str, value: &str) -> String {
    if is_secret_field(key) {
        mask_secret(value)
    } else {
        value.to_string()
    }
}

fn print_env(env: &BTreeMap<String, String>) {
    println!("Environment ({})", env.len());
    if env.is_empty() {
        println!("  (empty)");
        return;
    }
    let width = env.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in env {
        println!("  {:<width$}  {}", key, display_value(key, value));
    }
}

fn print_history_table(doc: &SettingsDocument) {
    println!("History ({})", doc.config_history.len());
    if doc.config_history.is_empty() {
        println!("  No configurations yet.");
        println!("  Apply one with: pilot provider apply <provider> --api-key <key>");
        return;
    }

    println!(
        "  {:<2} {:<16} {:<12} {:<10} Created",
        "", "Id", "Name", "Provider"
    );
    println!("  {}", "-".repeat(66));
    for entry in &doc.config_history {
        print_history_row(entry);
    }
}

fn print_history_row(entry: &ConfigEntry) {
    let marker = if entry.is_active { "*" } else { " " };
    println!(
        "  {:<2} {:<16} {:<12} {:<10} {}",
        marker,
        entry.id,
        format!("{} {}", entry.icon, entry.name),
        entry.provider_key,
        entry.created_at.format("%Y-%m-%d %H:%M:%S")
    );
}

fn print_settings_result(format: OutputFormat, message: &str, doc: &SettingsDocument) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("✓ {}", message);
            if let Some(active) = doc.active_entry() {
                println!("  Active: {} {} ({})", active.icon, active.name, active.id);
            }
            println!("  Env keys: {}", doc.env.len());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "message": message,
                "active": doc.active_entry().map(|e| &e.id),
                "env": doc.env.keys().collect::<Vec<_>>(),
                "history": doc.config_history.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn print_templates_table(templates: &[ProviderTemplate]) {
    println!("{:<10} {:<12} Base URL", "Key", "Name");
    println!("{}", "-".repeat(60));
    for template in templates {
        let base_url = template
            .fields
            .iter()
            .find(|(k, _)| *k == pilot_core::provider::BASE_URL_FIELD)
            .map(|(_, v)| *v)
            .unwrap_or("");
        println!(
            "{:<10} {:<12} {}",
            template.key,
            format!("{} {}", template.icon, template.name),
            base_url
        );
    }
}

fn print_templates_json(templates: &[ProviderTemplate]) -> Result<()> {
    let output: Vec<_> = templates
        .iter()
        .map(|t| {
            serde_json::json!({
                "key": t.key,
                "name": t.name,
                "icon": t.icon,
                "fields": t.default_fields(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_mcp_table(doc: &McpDocument) {
    if doc.mcp_servers.is_empty() {
        println!("No MCP servers configured.");
        println!("Add one with: pilot mcp add <name> --command <exe> --args \"...\"");
        return;
    }

    println!("{:<24} {:<8} Command / URL", "Name", "Type");
    println!("{}", "-".repeat(70));
    for (name, entry) in &doc.mcp_servers {
        let detail = entry
            .as_service()
            .map(ServiceDescriptor::summary)
            .unwrap_or_else(|| "(unrecognized entry, kept as-is)".to_string());
        println!("{:<24} {:<8} {}", name, entry.type_label(), detail);
    }
    println!();
    println!("{} server(s)", doc.mcp_servers.len());
}
