//! Shared test utilities for `MatchdayBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{matches, player},
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a date for fixtures.
///
/// # Panics
/// On an impossible calendar date.
#[allow(clippy::expect_used)]
#[must_use]
pub fn test_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Creates a test player with sensible defaults.
///
/// # Defaults
/// * `elo`: 1000.0
/// * `matches`: 0
/// * `wins`: 0
pub async fn create_test_player(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::player::Model> {
    player::create_player(db, name.to_string(), 1000.0, 0, 0).await
}

/// Creates a test player with a specific ELO.
pub async fn create_custom_player(
    db: &DatabaseConnection,
    name: &str,
    elo: f64,
) -> Result<entities::player::Model> {
    player::create_player(db, name.to_string(), elo, 0, 0).await
}

/// Creates a test match at 21:00 on `date`.
pub async fn create_custom_match(
    db: &DatabaseConnection,
    date: NaiveDate,
    location: &str,
    price: f64,
) -> Result<entities::matches::Model> {
    matches::create_match(db, date, "21:00".to_string(), location.to_string(), price).await
}
