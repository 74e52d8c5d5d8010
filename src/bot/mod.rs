//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the MatchdayBuddy application,
//! including all slash commands, autocomplete handlers, the button-driven
//! pagination channel and bot context management.

/// Discord command implementations (leaderboard, matches, debt)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;
/// Paginated replies with Previous/Next buttons
pub mod pagination;

use crate::config::settings::Settings;
use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the loaded settings.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Page sizes and session timeouts
    pub settings: Settings,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection
    /// and settings.
    #[must_use]
    pub const fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self { database, settings }
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Message shown to the invoking user when a command fails.
#[must_use]
pub fn command_failed_notice(command: &str) -> String {
    format!("An error occurred while executing the {command} command.")
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            let reply = CreateReply::default()
                .content(command_failed_notice(&ctx.command().name))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord, registers the slash commands globally and serves
/// them until the client stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: &str, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::leaderboard(),
                commands::matches(),
                commands::jogo(),
                commands::debtlist(),
                commands::markpaid(),
                commands::playerdebt(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    // Slash commands and button presses need no privileged intents
    let intents = serenity::GatewayIntents::GUILDS;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
