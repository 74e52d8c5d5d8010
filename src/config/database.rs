//! Database configuration module for `MatchdayBuddy`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. Creation is skipped for tables that already exist, which makes it
//! safe to run on every start.

use crate::entities::{Match, Player, PlayerMatch};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Default location of the database when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/matchday_buddy.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    ensure_sqlite_dir(&database_url)?;
    info!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// File path of an `SQLite` URL, without query parameters.
///
/// Returns None for in-memory databases and non-`SQLite` URLs.
#[must_use]
pub fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(Path::new(path))
}

/// Creates the directory holding the `SQLite` file, since `mode=rwc` only
/// creates the file itself.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(parent) = sqlite_file_path(database_url).and_then(Path::parent) else {
        return Ok(());
    };
    if !parent.as_os_str().is_empty() && !parent.exists() {
        debug!("Creating database directory {}", parent.display());
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Creates the players, matches and participation tables if they are missing.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let player_table = schema
        .create_table_from_entity(Player)
        .if_not_exists()
        .to_owned();
    let match_table = schema
        .create_table_from_entity(Match)
        .if_not_exists()
        .to_owned();
    let player_match_table = schema
        .create_table_from_entity(PlayerMatch)
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&player_table)).await?;
    db.execute(builder.build(&match_table)).await?;
    db.execute(builder.build(&player_match_table)).await?;
    debug!("Database tables ready");

    Ok(())
}
