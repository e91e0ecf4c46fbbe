//! Invite Bot - Main Entry Point
//!
//! A Matrix bot that auto-joins rooms it is invited to and answers
//! admin commands from a designated room.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use invite_bot::bot::{BotMessage, EventRunner};
use invite_bot::commands::{CommandDispatcher, CommandRegistry};
use invite_bot::config::{ADMIN_ROOM_KEY, BotSettings, ConnectorConfig, MatrixConfig};
use invite_bot::invite::{AutoInviteToggle, InviteHandler};
use invite_bot::matrix::{MatrixClient, SyncLoop};

/// Matrix bot that accepts room invites and answers admin commands.
#[derive(Parser, Debug)]
#[command(name = "invite_bot")]
#[command(about = "Auto-accept Matrix room invites, with admin-room commands")]
#[command(version)]
struct Args {
    /// Path to the connector JSON configuration file.
    #[arg(short, long, default_value = "connector.json")]
    config: String,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Generate an example configuration file and exit.
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Handle example config generation
    if args.generate_config {
        return generate_example_config();
    }

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let matrix_config = MatrixConfig::from_env()
        .context("Failed to load Matrix configuration from environment")?;

    let bot_settings = BotSettings::from_env_with_defaults();

    let connector_config = ConnectorConfig::load_from_file(&args.config)
        .context("Failed to load connector configuration")?;

    connector_config
        .validate()
        .context("Connector configuration validation failed")?;

    match connector_config.admin_room() {
        Some(room) => info!("Admin room: {}", room),
        None => warn!(
            "No '{}' room in {}; admin commands will be ignored",
            ADMIN_ROOM_KEY, args.config
        ),
    }

    let sync_timeout = Duration::from_secs(bot_settings.sync_timeout_secs);

    // Connect to the homeserver
    let client = MatrixClient::connect(
        &matrix_config,
        connector_config,
        sync_timeout,
        bot_settings.min_send_interval_ms,
    )
    .await
    .context("Failed to connect to Matrix homeserver")?;
    let client = Arc::new(client);

    let runner = EventRunner::new(
        Arc::clone(&client),
        InviteHandler::new(AutoInviteToggle::new(bot_settings.auto_accept_invites)),
        CommandDispatcher::new(CommandRegistry::standard()),
    );

    info!("Starting invite bot...");
    info!(
        "Auto-accept invites: {}",
        if bot_settings.auto_accept_invites { "on" } else { "off" }
    );

    // Create runner channel
    let (tx, rx) = mpsc::channel::<BotMessage>(64);

    let runner_handle = tokio::spawn(async move {
        runner.run(rx).await;
    });

    let sync_loop = SyncLoop::new(Arc::clone(&client), sync_timeout);
    let sync_tx = tx.clone();
    let sync_handle = tokio::spawn(async move {
        sync_loop.run(sync_tx).await;
    });

    info!("Bot is running. Use Ctrl+C to stop.");

    // Wait for Ctrl+C
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    // Cleanup
    info!("Shutting down...");
    sync_handle.abort();
    let _ = tx.send(BotMessage::Shutdown).await;
    let _ = runner_handle.await;

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Generates an example configuration file.
fn generate_example_config() -> Result<()> {
    let example = ConnectorConfig::example();
    example.save_to_file("connector.example.json")?;

    println!("✓ Example configuration written to: connector.example.json");
    println!("\nTo use this bot:");
    println!("1. Copy connector.example.json to connector.json");
    println!("2. Set '{ADMIN_ROOM_KEY}' to your admin room id or alias");
    println!("3. Create a .env file with MATRIX_HOMESERVER and MATRIX_ACCESS_TOKEN");
    println!("4. Run: invite_bot");

    Ok(())
}
