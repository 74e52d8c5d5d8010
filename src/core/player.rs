//! Player business logic - Lookups, search and the ELO leaderboard.
//!
//! Provides the queries behind `/leaderboard` and the player autocomplete.
//! All functions are async and return Result types for error handling.

use crate::{
    core::pagination::{DataSource, PageRequest},
    entities::{Player, player},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Counts every registered player.
pub async fn count_players(db: &DatabaseConnection) -> Result<u64> {
    Player::find().count(db).await.map_err(Into::into)
}

/// Retrieves one window of players ordered by ELO, best first.
///
/// Ties are broken by id so that consecutive pages never overlap.
pub async fn get_leaderboard_page(
    db: &DatabaseConnection,
    request: PageRequest,
) -> Result<Vec<player::Model>> {
    Player::find()
        .order_by_desc(player::Column::Elo)
        .order_by_asc(player::Column::Id)
        .offset(request.offset)
        .limit(request.limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a player by id, returning None if it does not exist.
pub async fn get_player_by_id(
    db: &DatabaseConnection,
    player_id: i64,
) -> Result<Option<player::Model>> {
    Player::find_by_id(player_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds players whose name contains `partial`, alphabetically, for autocomplete.
pub async fn search_players(
    db: &DatabaseConnection,
    partial: &str,
    limit: u64,
) -> Result<Vec<player::Model>> {
    Player::find()
        .filter(player::Column::Name.contains(partial.trim()))
        .order_by_asc(player::Column::Name)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Registers a new player, trimming the name.
pub async fn create_player(
    db: &DatabaseConnection,
    name: String,
    elo: f64,
    matches: i32,
    wins: i32,
) -> Result<player::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Player name cannot be empty".to_string(),
        });
    }

    let player = player::ActiveModel {
        name: Set(name.trim().to_string()),
        elo: Set(elo),
        matches: Set(matches),
        wins: Set(wins),
        ..Default::default()
    };

    let result = player.insert(db).await?;
    Ok(result)
}

/// Leaderboard rows for the paginator, re-queried on every page.
pub struct LeaderboardSource<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LeaderboardSource<'a> {
    /// Creates a source reading from `db`.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DataSource for LeaderboardSource<'_> {
    type Item = player::Model;

    async fn count(&self) -> Result<u64> {
        count_players(self.db).await
    }

    async fn page(&self, request: PageRequest) -> Result<Vec<player::Model>> {
        get_leaderboard_page(self.db, request).await
    }
}
