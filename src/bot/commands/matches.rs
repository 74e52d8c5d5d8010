//! Match Discord commands - paged match history and single match details.
//!
//! `/matches` is open to everyone in the channel. `/jogo` keeps the
//! Portuguese wording the group has always used.

use super::{colors, page_footer};
use crate::{
    core::{
        matches::{MatchSummary, format_date},
        pagination::{PageView, Renderer},
    },
    errors::Result,
};
use poise::CreateReply;
use poise::serenity_prelude as serenity;
use std::fmt::Write;

/// Appends one `**{label} X:** a, b` line per team.
fn write_teams(text: &mut String, summary: &MatchSummary, label: &str) -> Result<()> {
    for (team, players) in &summary.teams {
        writeln!(text, "**{label} {team}:** {}", players.join(", "))?;
    }
    Ok(())
}

/// Field body for one match in the history listing.
pub fn match_details(summary: &MatchSummary) -> Result<String> {
    let record = &summary.record;
    let mut text = format!(
        "📅 {}\n⏰ {}\n📍 {}\n\n",
        record.date.format("%a %b %d %Y"),
        record.time,
        record.location
    );
    write_teams(&mut text, summary, "Team")?;
    if let Some(result) = &record.result {
        write!(&mut text, "\n**Result:** {result}")?;
    }
    Ok(text)
}

/// Field body for `/jogo`.
pub fn jogo_details(summary: &MatchSummary) -> Result<String> {
    let record = &summary.record;
    let mut text = format!(
        "📅 {}\n⏰ {}\n📍 {}\n💰 Preço: €{:.2}\n\n",
        format_date(record.date),
        record.time,
        record.location,
        record.price
    );
    write_teams(&mut text, summary, "Equipe")?;
    if let Some(result) = &record.result {
        write!(&mut text, "\n**Resultado:** {result}")?;
    }
    Ok(text)
}

/// Renders match history pages, one embed field per match.
pub struct MatchesRenderer;

impl Renderer<MatchSummary> for MatchesRenderer {
    type Payload = CreateReply;

    fn render(&self, page: &PageView<'_, MatchSummary>) -> Result<CreateReply> {
        let description = if page.items.is_empty() {
            "No matches recorded yet.".to_string()
        } else {
            format!(
                "Showing matches {}-{} out of {}",
                page.first_item_number(),
                page.last_item_number(),
                page.total_count
            )
        };

        let mut embed = serenity::CreateEmbed::new()
            .color(colors::BLUE)
            .title("⚽ Recent Matches")
            .description(description)
            .footer(serenity::CreateEmbedFooter::new(page_footer(page)));
        for (index, summary) in page.items.iter().enumerate() {
            embed = embed.field(
                format!("Match {}", page.rank_of(index)),
                match_details(summary)?,
                false,
            );
        }
        Ok(CreateReply::default().embed(embed))
    }
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{MatchesRenderer, jogo_details};
    use crate::{
        bot::{
            Context,
            commands::{colors, parse_id},
            handlers::autocomplete,
            pagination::ReplyChannel,
        },
        core::{
            matches::{self as match_core, MatchesSource},
            pagination::{ActorId, Paginator, PaginatorOptions},
        },
        errors::Result,
    };
    use poise::CreateReply;
    use poise::serenity_prelude as serenity;
    use tracing::info;

    /// Show recent matches
    ///
    /// Pages through the match history, newest first. Anyone in the channel
    /// can turn the pages.
    #[poise::command(slash_command)]
    pub async fn matches(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;

        let data = ctx.data();
        let settings = data.settings.pagination;
        let options = PaginatorOptions::deferred(settings.matches_page_size)
            .with_timeout(settings.deferred_timeout())
            .with_owner_restriction(false);

        let paginator = Paginator::new(
            MatchesSource::new(&data.database),
            MatchesRenderer,
            ReplyChannel::new(ctx),
            ActorId::from(ctx.author().id),
            options,
        )?;
        let session = paginator.paginate().await?;
        info!(
            user = %ctx.author().name,
            pages = session.total_pages,
            "Matches session finished"
        );
        Ok(())
    }

    /// Mostrar detalhes de um jogo específico
    #[poise::command(slash_command)]
    pub async fn jogo(
        ctx: Context<'_>,
        #[description = "Selecione o jogo"]
        #[autocomplete = "autocomplete::autocomplete_match"]
        jogo: String,
    ) -> Result<()> {
        ctx.defer().await?;

        let Ok(match_id) = parse_id(&jogo) else {
            ctx.say("Jogo não encontrado.").await?;
            return Ok(());
        };
        let Some(summary) = match_core::get_match_summary(&ctx.data().database, match_id).await?
        else {
            ctx.say("Jogo não encontrado.").await?;
            return Ok(());
        };

        let embed = serenity::CreateEmbed::new()
            .color(colors::BLUE)
            .title("Detalhes do Jogo")
            .description(format!(
                "Jogo em {}",
                match_core::format_date(summary.record.date)
            ))
            .field("Detalhes do Jogo", jogo_details(&summary)?, false);

        ctx.send(CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
