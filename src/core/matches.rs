//! Match business logic - Scheduling, line-ups and match history.
//!
//! Matches are listed newest first. Each listing entry carries its line-up
//! grouped by team so the bot layer can render it without further queries.

use crate::{
    core::pagination::{DataSource, PageRequest},
    entities::{Match, Player, PlayerMatch, matches, player_match},
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{Condition, QueryOrder, QuerySelect, Set, prelude::*};
use std::collections::BTreeMap;

/// Date formats accepted when searching matches by day.
const SEARCH_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// A match together with its line-up.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    /// The match row
    pub record: matches::Model,
    /// Player names keyed by team label, in sign-up order
    pub teams: BTreeMap<String, Vec<String>>,
}

/// Formats a match date as `DD-MM-YYYY`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Interprets a search term as a calendar day, if it looks like one.
#[must_use]
pub fn parse_search_date(term: &str) -> Option<NaiveDate> {
    let term = term.trim();
    SEARCH_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(term, format).ok())
}

/// Counts every recorded match.
pub async fn count_matches(db: &DatabaseConnection) -> Result<u64> {
    Match::find().count(db).await.map_err(Into::into)
}

/// Retrieves one window of matches, newest first, with their line-ups.
pub async fn get_matches_page(
    db: &DatabaseConnection,
    request: PageRequest,
) -> Result<Vec<MatchSummary>> {
    let records = Match::find()
        .order_by_desc(matches::Column::Date)
        .order_by_desc(matches::Column::Id)
        .offset(request.offset)
        .limit(request.limit)
        .all(db)
        .await?;

    attach_teams(db, records).await
}

/// Finds a single match with its line-up.
pub async fn get_match_summary(
    db: &DatabaseConnection,
    match_id: i64,
) -> Result<Option<MatchSummary>> {
    let Some(record) = Match::find_by_id(match_id).one(db).await? else {
        return Ok(None);
    };

    Ok(attach_teams(db, vec![record]).await?.pop())
}

/// Finds a match by id, returning None if it does not exist.
pub async fn get_match_by_id(
    db: &DatabaseConnection,
    match_id: i64,
) -> Result<Option<matches::Model>> {
    Match::find_by_id(match_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds matches for autocomplete, newest first.
///
/// A match is returned when its location contains `term`, or when `term` is a
/// date and the match is played on that day.
pub async fn search_matches(
    db: &DatabaseConnection,
    term: &str,
    limit: u64,
) -> Result<Vec<matches::Model>> {
    let mut condition = Condition::any().add(matches::Column::Location.contains(term.trim()));
    if let Some(date) = parse_search_date(term) {
        condition = condition.add(matches::Column::Date.eq(date));
    }

    Match::find()
        .filter(condition)
        .order_by_desc(matches::Column::Date)
        .order_by_desc(matches::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Schedules a new match.
pub async fn create_match(
    db: &DatabaseConnection,
    date: NaiveDate,
    time: String,
    location: String,
    price: f64,
) -> Result<matches::Model> {
    if location.trim().is_empty() {
        return Err(Error::Config {
            message: "Match location cannot be empty".to_string(),
        });
    }
    if !price.is_finite() || price < 0.0 {
        return Err(Error::Config {
            message: format!("Invalid match price: {price}"),
        });
    }

    let record = matches::ActiveModel {
        date: Set(date),
        time: Set(time.trim().to_string()),
        location: Set(location.trim().to_string()),
        price: Set(price),
        result: Set(None),
        ..Default::default()
    };

    let result = record.insert(db).await?;
    Ok(result)
}

/// Signs a player up for a match on the given team, unpaid.
pub async fn add_player_to_match(
    db: &DatabaseConnection,
    player_id: i64,
    match_id: i64,
    team: String,
) -> Result<player_match::Model> {
    if Player::find_by_id(player_id).one(db).await?.is_none() {
        return Err(Error::PlayerNotFound { id: player_id });
    }
    if Match::find_by_id(match_id).one(db).await?.is_none() {
        return Err(Error::MatchNotFound { id: match_id });
    }

    let participation = player_match::ActiveModel {
        player_id: Set(player_id),
        match_id: Set(match_id),
        team: Set(team),
        paid: Set(false),
        ..Default::default()
    };

    let result = participation.insert(db).await?;
    Ok(result)
}

async fn attach_teams(
    db: &DatabaseConnection,
    records: Vec<matches::Model>,
) -> Result<Vec<MatchSummary>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = records.iter().map(|record| record.id).collect();
    let participations = PlayerMatch::find()
        .filter(player_match::Column::MatchId.is_in(ids))
        .order_by_asc(player_match::Column::Id)
        .find_also_related(Player)
        .all(db)
        .await?;

    let mut teams_by_match: BTreeMap<i64, BTreeMap<String, Vec<String>>> = BTreeMap::new();
    for (participation, player) in participations {
        let Some(player) = player else {
            continue;
        };
        teams_by_match
            .entry(participation.match_id)
            .or_default()
            .entry(participation.team)
            .or_default()
            .push(player.name);
    }

    Ok(records
        .into_iter()
        .map(|record| MatchSummary {
            teams: teams_by_match.remove(&record.id).unwrap_or_default(),
            record,
        })
        .collect())
}

/// Match history for the paginator, re-queried on every page.
pub struct MatchesSource<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MatchesSource<'a> {
    /// Creates a source reading from `db`.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DataSource for MatchesSource<'_> {
    type Item = MatchSummary;

    async fn count(&self) -> Result<u64> {
        count_matches(self.db).await
    }

    async fn page(&self, request: PageRequest) -> Result<Vec<MatchSummary>> {
        get_matches_page(self.db, request).await
    }
}
