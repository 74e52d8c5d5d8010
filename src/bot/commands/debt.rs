//! Debt Discord commands - who owes money for which match.

use super::colors;
use crate::{
    core::{
        debt::{DebtSummary, PlayerDebt},
        matches::format_date,
        pagination::{PageView, Renderer},
    },
    errors::Result,
};
use chrono::NaiveDate;
use poise::CreateReply;
use poise::serenity_prelude as serenity;
use std::fmt::Write;

/// Body of the "Debt List" field for one page.
pub fn debt_list_lines(page: &PageView<'_, DebtSummary>) -> Result<String> {
    let mut text = String::new();
    for (index, summary) in page.items.iter().enumerate() {
        if index > 0 {
            text.push_str("\n\n");
        }
        let plural = if summary.unpaid_games > 1 { "s" } else { "" };
        write!(
            &mut text,
            "{}. **{}**\n   €{:.2} ({} unpaid game{plural})",
            page.rank_of(index),
            summary.name,
            summary.total,
            summary.unpaid_games
        )?;
    }
    Ok(text)
}

/// "Unpaid Matches" lines for `/playerdebt`.
pub fn unpaid_match_lines(debt: &PlayerDebt) -> Result<String> {
    let mut text = String::new();
    for (index, unpaid) in debt.unpaid.iter().enumerate() {
        writeln!(
            &mut text,
            "{}. {} - {} - {} (€{:.2})",
            index + 1,
            unpaid.record.date.format("%Y-%m-%d"),
            unpaid.record.time,
            unpaid.record.location,
            unpaid.share
        )?;
    }
    Ok(text)
}

/// Reply when a player is marked paid for a match they did not play.
#[must_use]
pub fn not_in_match_notice(player_name: &str, date: NaiveDate, location: &str) -> String {
    format!(
        "No record found for {player_name} in the match on {} at {location}.",
        format_date(date)
    )
}

/// Renders debt list pages. The page counter lives in the title.
pub struct DebtListRenderer;

impl Renderer<DebtSummary> for DebtListRenderer {
    type Payload = CreateReply;

    fn render(&self, page: &PageView<'_, DebtSummary>) -> Result<CreateReply> {
        let embed = serenity::CreateEmbed::new()
            .color(colors::ORANGE_RED)
            .title(format!(
                "Players Owing Money (Page {}/{})",
                page.page_number(),
                page.total_pages
            ))
            .description("List of players with outstanding debts")
            .field("Debt List", debt_list_lines(page)?, false);
        Ok(CreateReply::default().embed(embed))
    }
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{DebtListRenderer, not_in_match_notice, unpaid_match_lines};
    use crate::{
        bot::{
            Context,
            commands::{colors, parse_id},
            handlers::autocomplete,
            pagination::ReplyChannel,
        },
        core::{
            debt,
            matches::format_date,
            pagination::{ActorId, NavigationPolicy, Paginator, PaginatorOptions, VecSource},
        },
        errors::{Error, Result},
    };
    use poise::CreateReply;
    use poise::serenity_prelude as serenity;
    use tracing::{info, warn};

    async fn say_ephemeral(ctx: Context<'_>, content: impl Into<String>) -> Result<()> {
        ctx.send(CreateReply::default().content(content).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Show a list of players who owe money
    ///
    /// The list is computed once and paged in memory. Pages wrap around at
    /// either end.
    #[poise::command(slash_command)]
    pub async fn debtlist(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;

        let data = ctx.data();
        let list = debt::get_debt_list(&data.database).await?;
        if list.is_empty() {
            ctx.say("No players currently owe any money.").await?;
            return Ok(());
        }

        let settings = data.settings.pagination;
        let options = PaginatorOptions::inline(settings.debt_list_page_size)
            .with_timeout(settings.inline_timeout())
            .with_navigation(NavigationPolicy::Wrap);

        let paginator = Paginator::new(
            VecSource::new(list),
            DebtListRenderer,
            ReplyChannel::new(ctx),
            ActorId::from(ctx.author().id),
            options,
        )?;
        let session = paginator.paginate().await?;
        info!(
            user = %ctx.author().name,
            players = session.total_count,
            "Debt list session finished"
        );
        Ok(())
    }

    /// Mark a player as paid for a specific match
    #[poise::command(slash_command)]
    pub async fn markpaid(
        ctx: Context<'_>,
        #[description = "Select the player"]
        #[autocomplete = "autocomplete::autocomplete_player"]
        player: String,
        #[description = "Select the match"]
        #[autocomplete = "autocomplete::autocomplete_match"]
        #[rename = "match"]
        match_choice: String,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let (Ok(player_id), Ok(match_id)) = (parse_id(&player), parse_id(&match_choice)) else {
            return say_ephemeral(ctx, "Invalid player or match selected.").await;
        };

        let (paid_player, record) = match debt::mark_paid(db, player_id, match_id).await {
            Ok(updated) => updated,
            Err(Error::PlayerNotFound { .. } | Error::MatchNotFound { .. }) => {
                return say_ephemeral(ctx, "Invalid player or match selected.").await;
            }
            Err(Error::PlayerNotInMatch {
                player_name,
                date,
                location,
                ..
            }) => {
                return say_ephemeral(
                    ctx,
                    not_in_match_notice(&player_name, date, &location),
                )
                .await;
            }
            Err(e) => return Err(e),
        };
        info!(
            player = %paid_player.name,
            match_id = record.id,
            by = %ctx.author().name,
            "Marked player as paid"
        );

        let embed = serenity::CreateEmbed::new()
            .color(colors::GREEN)
            .title("Payment Marked")
            .description(format!(
                "Successfully marked {} as paid for the match.",
                paid_player.name
            ))
            .field("Date", format_date(record.date), true)
            .field("Time", record.time.clone(), true)
            .field("Location", record.location.clone(), true)
            .timestamp(serenity::Timestamp::now());

        ctx.send(CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Show how much a player owes
    #[poise::command(slash_command)]
    pub async fn playerdebt(
        ctx: Context<'_>,
        #[description = "Select the player"]
        #[autocomplete = "autocomplete::autocomplete_player"]
        player: String,
    ) -> Result<()> {
        let Ok(player_id) = parse_id(&player) else {
            ctx.say("Invalid player selected.").await?;
            return Ok(());
        };

        let debt = match debt::get_player_debt(&ctx.data().database, player_id).await {
            Ok(debt) => debt,
            Err(Error::PlayerNotFound { id }) => {
                warn!(player_id = id, "Debt requested for unknown player");
                ctx.say("Invalid player selected.").await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if debt.unpaid.is_empty() {
            ctx.say(format!("{} doesn't owe any money.", debt.player.name))
                .await?;
            return Ok(());
        }

        let embed = serenity::CreateEmbed::new()
            .color(colors::ORANGE_RED)
            .title(format!("{}'s Debt", debt.player.name))
            .description(format!("Total amount owed: €{:.2}", debt.total))
            .field("Unpaid Matches", unpaid_match_lines(&debt)?, false)
            .field("Current ELO", format!("{:.0}", debt.player.elo), false)
            .field("Total Matches", debt.player.matches.to_string(), false)
            .field("Wins", debt.player.wins.to_string(), false);

        ctx.send(CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
