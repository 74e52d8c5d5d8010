//! Interactive pagination over an ordered result set.
//!
//! A [`Paginator`] turns "count plus fetch a page" into a time-bounded session:
//! it posts the first page with Previous/Next controls, consumes control events
//! one at a time, re-queries and re-renders on every accepted navigation, and
//! disables the controls once the session deadline passes.
//!
//! The paginator knows nothing about Discord. It talks to three collaborators:
//! a [`DataSource`] for items, a [`Renderer`] that turns a page into a payload,
//! and a [`Channel`] that delivers payloads and produces [`ControlEvent`]s.

mod page;
mod paginator;
mod source;

pub use page::{
    Control, Controls, NavigationPolicy, PageRequest, PageResult, PageView, clamp_page,
    page_request, total_pages,
};
pub use paginator::{
    EventOutcome, Paginator, PaginatorOptions, PaginatorSession, SessionState,
};
pub use source::VecSource;

use crate::errors::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Opaque identity of a user driving a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub u64);

/// One button press on a paginated message.
#[derive(Debug)]
pub struct ControlEvent<R> {
    /// Who pressed the button
    pub actor: ActorId,
    /// Which button was pressed
    pub control: Control,
    /// Channel-specific handle used to acknowledge or answer this event
    pub responder: R,
}

/// Supplies the items being paginated.
///
/// Every navigation calls [`DataSource::page`] again; implementations must not
/// fail for an offset past the end and should return an empty page instead.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Item type produced by this source
    type Item: Send + Sync;

    /// Total number of items, queried once per session.
    async fn count(&self) -> Result<u64>;

    /// Items inside the requested window, in display order.
    async fn page(&self, request: PageRequest) -> Result<Vec<Self::Item>>;
}

/// Turns a page of items into something a [`Channel`] can display.
pub trait Renderer<T>: Send + Sync {
    /// Display payload handed to the channel
    type Payload: Clone + Send + Sync;

    /// Renders one page. Must be free of side effects.
    fn render(&self, page: &PageView<'_, T>) -> Result<Self::Payload>;
}

/// Delivers pages and collects button presses for them.
#[async_trait]
pub trait Channel: Send + Sync {
    /// What gets posted
    type Payload: Send + Sync;
    /// Handle to a delivered message
    type Message: Send + Sync;
    /// Handle used to answer a single control event
    type Responder: Send + Sync;

    /// Posts the first page and returns a handle for later edits.
    async fn post(&self, payload: Self::Payload, controls: Controls) -> Result<Self::Message>;

    /// Replaces the content and controls of a delivered message.
    async fn update(
        &self,
        message: &Self::Message,
        payload: Self::Payload,
        controls: Controls,
    ) -> Result<()>;

    /// Starts forwarding control events for `message` until `deadline`.
    ///
    /// The returned stream ends early if the message becomes unreachable.
    async fn subscribe(
        &self,
        message: &Self::Message,
        deadline: Instant,
    ) -> Result<mpsc::Receiver<ControlEvent<Self::Responder>>>;

    /// Tells the platform the event was received, before any page work starts.
    async fn acknowledge(&self, responder: &Self::Responder) -> Result<()>;

    /// Sends a notice visible only to the actor that triggered the event.
    async fn notify_actor(&self, responder: &Self::Responder, notice: &str) -> Result<()>;

    /// Reports a failed navigation to an event that was already acknowledged.
    async fn notify_failure(&self, responder: &Self::Responder, notice: &str) -> Result<()>;
}
