//! Discord side of pagination - buttons, collectors and interaction replies.
//!
//! [`ReplyChannel`] plugs a poise invocation into the framework-agnostic
//! [`Paginator`](crate::core::pagination::Paginator). Button custom ids are
//! prefixed with the invocation id, so presses on another session's message
//! are never picked up.

use crate::{
    bot::Context,
    core::pagination::{ActorId, Channel, Control, ControlEvent, Controls},
    errors::Result,
};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use poise::{CreateReply, ReplyHandle};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, trace};

const PREVIOUS_ID: &str = "previous";
const NEXT_ID: &str = "next";
const EVENT_BUFFER: usize = 16;

impl From<serenity::UserId> for ActorId {
    fn from(value: serenity::UserId) -> Self {
        Self(value.get())
    }
}

/// Builds the custom id of a navigation button for one session.
#[must_use]
pub fn custom_id(session_id: u64, control: Control) -> String {
    let name = match control {
        Control::Previous => PREVIOUS_ID,
        Control::Next => NEXT_ID,
    };
    format!("{session_id}:{name}")
}

/// Reads a navigation button custom id, if it belongs to `session_id`.
#[must_use]
pub fn parse_custom_id(custom_id: &str, session_id: u64) -> Option<Control> {
    let (session, name) = custom_id.split_once(':')?;
    if session.parse::<u64>().ok()? != session_id {
        return None;
    }
    match name {
        PREVIOUS_ID => Some(Control::Previous),
        NEXT_ID => Some(Control::Next),
        _ => None,
    }
}

/// The Previous/Next button row for a page.
#[must_use]
pub fn nav_components(session_id: u64, controls: Controls) -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(custom_id(session_id, Control::Previous))
            .label("◀️ Previous")
            .style(serenity::ButtonStyle::Primary)
            .disabled(controls.previous_disabled),
        serenity::CreateButton::new(custom_id(session_id, Control::Next))
            .label("Next ▶️")
            .style(serenity::ButtonStyle::Primary)
            .disabled(controls.next_disabled),
    ])]
}

/// Delivers pages as the reply to a slash command invocation.
pub struct ReplyChannel<'a> {
    ctx: Context<'a>,
    session_id: u64,
}

impl<'a> ReplyChannel<'a> {
    /// Creates a channel replying to `ctx`.
    #[must_use]
    pub fn new(ctx: Context<'a>) -> Self {
        Self {
            session_id: ctx.id(),
            ctx,
        }
    }
}

#[async_trait]
impl<'a> Channel for ReplyChannel<'a> {
    type Payload = CreateReply;
    type Message = ReplyHandle<'a>;
    type Responder = serenity::ComponentInteraction;

    async fn post(&self, payload: CreateReply, controls: Controls) -> Result<ReplyHandle<'a>> {
        let reply = payload.components(nav_components(self.session_id, controls));
        Ok(self.ctx.send(reply).await?)
    }

    async fn update(
        &self,
        message: &ReplyHandle<'a>,
        payload: CreateReply,
        controls: Controls,
    ) -> Result<()> {
        let reply = payload.components(nav_components(self.session_id, controls));
        Ok(message.edit(self.ctx, reply).await?)
    }

    async fn subscribe(
        &self,
        message: &ReplyHandle<'a>,
        deadline: Instant,
    ) -> Result<mpsc::Receiver<ControlEvent<serenity::ComponentInteraction>>> {
        let message_id = message.message().await?.id;
        let (events, receiver) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(forward_presses(
            self.ctx.serenity_context().clone(),
            message_id,
            self.session_id,
            deadline,
            events,
        ));
        Ok(receiver)
    }

    async fn acknowledge(&self, responder: &serenity::ComponentInteraction) -> Result<()> {
        responder
            .create_response(self.ctx, serenity::CreateInteractionResponse::Acknowledge)
            .await?;
        Ok(())
    }

    async fn notify_actor(
        &self,
        responder: &serenity::ComponentInteraction,
        notice: &str,
    ) -> Result<()> {
        let message = serenity::CreateInteractionResponseMessage::new()
            .content(notice)
            .ephemeral(true);
        responder
            .create_response(self.ctx, serenity::CreateInteractionResponse::Message(message))
            .await?;
        Ok(())
    }

    async fn notify_failure(
        &self,
        responder: &serenity::ComponentInteraction,
        notice: &str,
    ) -> Result<()> {
        let followup = serenity::CreateInteractionResponseFollowup::new()
            .content(notice)
            .ephemeral(true);
        responder.create_followup(self.ctx, followup).await?;
        Ok(())
    }
}

/// Collects button presses on `message_id` and forwards them until the
/// deadline passes or the paginator stops listening.
async fn forward_presses(
    ctx: serenity::Context,
    message_id: serenity::MessageId,
    session_id: u64,
    deadline: Instant,
    events: mpsc::Sender<ControlEvent<serenity::ComponentInteraction>>,
) {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        let Some(press) = serenity::ComponentInteractionCollector::new(&ctx)
            .message_id(message_id)
            .filter(move |press| parse_custom_id(&press.data.custom_id, session_id).is_some())
            .timeout(remaining)
            .await
        else {
            break;
        };

        let Some(control) = parse_custom_id(&press.data.custom_id, session_id) else {
            continue;
        };
        trace!(user = %press.user.name, ?control, "Navigation button pressed");

        let event = ControlEvent {
            actor: ActorId::from(press.user.id),
            control,
            responder: press,
        };
        if events.send(event).await.is_err() {
            break;
        }
    }
    debug!(%message_id, "Stopped collecting navigation buttons");
}
