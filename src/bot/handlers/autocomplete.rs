//! Autocomplete handlers for Discord slash command parameters.
//!
//! Choices show a readable label and carry the database id as their value,
//! which the commands parse back with `parse_id`.

use crate::{
    bot::Context,
    core::{matches, player},
    entities,
};
use poise::serenity_prelude as serenity;
use tracing::warn;

/// Discord accepts at most this many autocomplete choices.
pub const MAX_CHOICES: u64 = 25;

/// Label shown for a match choice: `DD-MM-YYYY - time - location`.
#[must_use]
pub fn match_label(record: &entities::MatchModel) -> String {
    format!(
        "{} - {} - {}",
        matches::format_date(record.date),
        record.time,
        record.location
    )
}

/// Suggests players whose name contains what the user typed.
pub async fn autocomplete_player(
    ctx: Context<'_>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    match player::search_players(&ctx.data().database, partial, MAX_CHOICES).await {
        Ok(players) => players
            .into_iter()
            .map(|p| serenity::AutocompleteChoice::new(p.name, p.id.to_string()))
            .collect(),
        Err(e) => {
            warn!("Player autocomplete failed: {}", e);
            Vec::new()
        }
    }
}

/// Suggests matches by location, or by day when the input is a date.
pub async fn autocomplete_match(
    ctx: Context<'_>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    match matches::search_matches(&ctx.data().database, partial, MAX_CHOICES).await {
        Ok(records) => records
            .iter()
            .map(|record| {
                serenity::AutocompleteChoice::new(match_label(record), record.id.to_string())
            })
            .collect(),
        Err(e) => {
            warn!("Match autocomplete failed: {}", e);
            Vec::new()
        }
    }
}
