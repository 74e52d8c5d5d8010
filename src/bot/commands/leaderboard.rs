//! Leaderboard Discord command - ELO rankings with Previous/Next paging.

use super::{colors, page_footer};
use crate::{
    core::pagination::{PageView, Renderer},
    entities::player,
    errors::Result,
};
use poise::CreateReply;
use poise::serenity_prelude as serenity;
use std::fmt::Write;

/// Medal or `N.` prefix for a global rank.
#[must_use]
pub fn rank_label(rank: u64) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("{n}."),
    }
}

/// Body of the "Rankings" field for one page.
pub fn leaderboard_lines(page: &PageView<'_, player::Model>) -> Result<String> {
    if page.items.is_empty() {
        return Ok("No players registered yet.".to_string());
    }

    let mut text = String::new();
    for (index, player) in page.items.iter().enumerate() {
        if index > 0 {
            text.push_str("\n\n");
        }
        write!(
            &mut text,
            "{} **{}**\nELO: {:.2} | Matches: {} | Wins: {}",
            rank_label(page.rank_of(index)),
            player.name,
            player.elo,
            player.matches,
            player.wins
        )?;
    }
    Ok(text)
}

/// Embed description: which ranks the page covers.
#[must_use]
pub fn leaderboard_summary(page: &PageView<'_, player::Model>) -> String {
    if page.items.is_empty() {
        return "The leaderboard is empty.".to_string();
    }
    format!(
        "Top players {}-{} out of {}",
        page.first_item_number(),
        page.last_item_number(),
        page.total_count
    )
}

/// Renders leaderboard pages as a gold embed.
pub struct LeaderboardRenderer;

impl Renderer<player::Model> for LeaderboardRenderer {
    type Payload = CreateReply;

    fn render(&self, page: &PageView<'_, player::Model>) -> Result<CreateReply> {
        let embed = serenity::CreateEmbed::new()
            .color(colors::GOLD)
            .title("🏆 Leaderboard")
            .description(leaderboard_summary(page))
            .field("Rankings", leaderboard_lines(page)?, false)
            .footer(serenity::CreateEmbedFooter::new(page_footer(page)));
        Ok(CreateReply::default().embed(embed))
    }
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::LeaderboardRenderer;
    use crate::{
        bot::{Context, pagination::ReplyChannel},
        core::{
            pagination::{ActorId, Paginator, PaginatorOptions},
            player::LeaderboardSource,
        },
        errors::Result,
    };
    use tracing::info;

    /// Show the player leaderboard
    ///
    /// Pages through every player ordered by ELO. Only the invoking user can
    /// turn the pages.
    #[poise::command(slash_command)]
    pub async fn leaderboard(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;

        let data = ctx.data();
        let settings = data.settings.pagination;
        let options = PaginatorOptions::deferred(settings.leaderboard_page_size)
            .with_timeout(settings.deferred_timeout())
            .with_owner_restriction(true);

        let paginator = Paginator::new(
            LeaderboardSource::new(&data.database),
            LeaderboardRenderer,
            ReplyChannel::new(ctx),
            ActorId::from(ctx.author().id),
            options,
        )?;
        let session = paginator.paginate().await?;
        info!(
            user = %ctx.author().name,
            pages = session.total_pages,
            "Leaderboard session finished"
        );
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
