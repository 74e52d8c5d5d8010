//! Debt business logic - Who owes what for which match.
//!
//! The pitch price of a match is split evenly between everyone who played
//! in it. A player owes their share for every participation not yet marked
//! as paid.

use crate::{
    core::{matches::get_match_by_id, player::get_player_by_id},
    entities::{Match, Player, PlayerMatch, matches, player, player_match},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;

/// One unpaid participation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnpaidMatch {
    /// The match that was not paid for
    pub record: matches::Model,
    /// Number of players the price was split between
    pub players: u64,
    /// Amount this player owes for the match
    pub share: f64,
}

/// Everything a single player owes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDebt {
    /// The player
    pub player: player::Model,
    /// Sum of all shares
    pub total: f64,
    /// Unpaid matches in sign-up order
    pub unpaid: Vec<UnpaidMatch>,
}

/// One line of the debt list.
#[derive(Debug, Clone, PartialEq)]
pub struct DebtSummary {
    /// Player id
    pub player_id: i64,
    /// Player name
    pub name: String,
    /// Sum of all shares owed
    pub total: f64,
    /// Number of matches not yet paid for
    pub unpaid_games: usize,
}

/// Share of `price` owed by each of `players` participants.
#[must_use]
pub fn share_of(price: f64, players: u64) -> f64 {
    if players == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)] // Player counts are tiny
    let players = players as f64;
    price / players
}

/// Computes how much `player_id` owes, match by match.
pub async fn get_player_debt(db: &DatabaseConnection, player_id: i64) -> Result<PlayerDebt> {
    let player = get_player_by_id(db, player_id)
        .await?
        .ok_or(Error::PlayerNotFound { id: player_id })?;

    let unpaid = PlayerMatch::find()
        .filter(player_match::Column::PlayerId.eq(player_id))
        .filter(player_match::Column::Paid.eq(false))
        .order_by_asc(player_match::Column::Id)
        .find_also_related(Match)
        .all(db)
        .await?;

    let records: Vec<matches::Model> = unpaid.into_iter().filter_map(|(_, m)| m).collect();
    let counts = count_players_per_match(db, records.iter().map(|m| m.id).collect()).await?;

    let unpaid: Vec<UnpaidMatch> = records
        .into_iter()
        .map(|record| {
            let players = counts.get(&record.id).copied().unwrap_or(0);
            UnpaidMatch {
                share: share_of(record.price, players),
                players,
                record,
            }
        })
        .collect();
    let total = unpaid.iter().map(|m| m.share).sum();

    Ok(PlayerDebt {
        player,
        total,
        unpaid,
    })
}

/// Lists every player with at least one unpaid match, biggest debt first.
pub async fn get_debt_list(db: &DatabaseConnection) -> Result<Vec<DebtSummary>> {
    let unpaid = PlayerMatch::find()
        .filter(player_match::Column::Paid.eq(false))
        .find_also_related(Player)
        .all(db)
        .await?;
    if unpaid.is_empty() {
        return Ok(Vec::new());
    }

    let mut match_ids: Vec<i64> = unpaid.iter().map(|(pm, _)| pm.match_id).collect();
    match_ids.sort_unstable();
    match_ids.dedup();

    let prices: HashMap<i64, f64> = Match::find()
        .filter(matches::Column::Id.is_in(match_ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m.price))
        .collect();
    let counts = count_players_per_match(db, match_ids).await?;

    let mut by_player: HashMap<i64, DebtSummary> = HashMap::new();
    for (participation, player) in unpaid {
        let Some(player) = player else {
            continue;
        };
        let Some(price) = prices.get(&participation.match_id) else {
            continue;
        };
        let players = counts.get(&participation.match_id).copied().unwrap_or(0);

        let entry = by_player.entry(player.id).or_insert_with(|| DebtSummary {
            player_id: player.id,
            name: player.name.clone(),
            total: 0.0,
            unpaid_games: 0,
        });
        entry.total += share_of(*price, players);
        entry.unpaid_games += 1;
    }

    let mut list: Vec<DebtSummary> = by_player.into_values().collect();
    list.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    Ok(list)
}

/// Marks a player's participation in a match as paid.
///
/// Returns the player and the match so callers can confirm what was updated.
pub async fn mark_paid(
    db: &DatabaseConnection,
    player_id: i64,
    match_id: i64,
) -> Result<(player::Model, matches::Model)> {
    let player = get_player_by_id(db, player_id)
        .await?
        .ok_or(Error::PlayerNotFound { id: player_id })?;
    let record = get_match_by_id(db, match_id)
        .await?
        .ok_or(Error::MatchNotFound { id: match_id })?;

    let participation = PlayerMatch::find()
        .filter(player_match::Column::PlayerId.eq(player_id))
        .filter(player_match::Column::MatchId.eq(match_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::PlayerNotInMatch {
            player_id,
            match_id,
            player_name: player.name.clone(),
            date: record.date,
            location: record.location.clone(),
        })?;

    let mut active_model: player_match::ActiveModel = participation.into();
    active_model.paid = Set(true);
    active_model.update(db).await?;

    Ok((player, record))
}

async fn count_players_per_match(
    db: &DatabaseConnection,
    match_ids: Vec<i64>,
) -> Result<HashMap<i64, u64>> {
    if match_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let participations = PlayerMatch::find()
        .filter(player_match::Column::MatchId.is_in(match_ids))
        .all(db)
        .await?;

    let mut counts = HashMap::new();
    for participation in participations {
        *counts.entry(participation.match_id).or_insert(0) += 1;
    }
    Ok(counts)
}
