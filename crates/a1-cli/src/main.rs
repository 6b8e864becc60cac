//! A1 Shell CLI
//!
//! Control panel for the locally-running A1 Shell terminal service:
//! - One-shot commands (status, start, stop, copy)
//! - Interactive panel with live status updates
//! - Configuration management

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use a1_shell::commands::{self, AppContext};

#[derive(Parser)]
#[command(name = "a1-shell")]
#[command(author, version, about = "Control panel for the A1 Shell terminal service")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Terminal service address (overrides the configured port)
    #[arg(short, long, global = true, env = "A1_SHELL_ADDRESS")]
    address: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show terminal session status
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start a terminal session and print its credentials
    Start,

    /// Stop the running terminal session
    Stop,

    /// Open the interactive control panel
    Panel,

    /// Copy the session URL to the clipboard
    Copy,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
    /// Create a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Get a config value (e.g. panel.ipc_port)
    Get { key: String },
    /// Set a config value (e.g. panel.notice_ttl 10)
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = cli.config.as_deref();

    let command = cli.command.unwrap_or(Commands::Status { json: false });
    let context = || -> Result<AppContext> {
        let ctx = AppContext::load(config_path, cli.address.clone())?;
        tracing::debug!(address = %ctx.address, "Using terminal service");
        Ok(ctx)
    };

    match command {
        Commands::Status { json } => commands::status_command(&context()?, json).await,
        Commands::Start => commands::start_command(&context()?).await,
        Commands::Stop => commands::stop_command(&context()?).await,
        Commands::Panel => commands::panel_command(&context()?).await,
        Commands::Copy => commands::copy_command(&context()?).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(config_path),
            ConfigAction::Path => commands::config_path(config_path),
            ConfigAction::Init { force } => commands::config_init(config_path, force),
            ConfigAction::Get { key } => commands::config_get(config_path, &key),
            ConfigAction::Set { key, value } => commands::config_set(config_path, &key, &value),
        },
    }
}
