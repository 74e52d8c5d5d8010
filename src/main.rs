use dotenvy::dotenv;
use matchday_buddy::{
    bot::{self, BotData},
    config::{database, settings},
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Reads the bot token, preferring `DISCORD_TOKEN` over `DISCORD_BOT_TOKEN`.
fn discord_token() -> Result<String> {
    env::var("DISCORD_TOKEN")
        .or_else(|_| {
            env::var("DISCORD_BOT_TOKEN")
                .inspect(|_| warn!("DISCORD_TOKEN not set, using DISCORD_BOT_TOKEN"))
        })
        .inspect_err(|e| error!("DISCORD_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file first so RUST_LOG from it is honoured
    dotenv().ok(); // Make it non-fatal, env vars can be set externally

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!("Starting MatchdayBuddy");

    // 3. Load page sizes and timeouts
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Run the bot
    let token = discord_token()?;
    bot::run_bot(&token, BotData::new(db, settings)).await
}
