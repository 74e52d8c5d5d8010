//! The pagination session state machine.

use super::{
    ActorId, Channel, ControlEvent, Controls, DataSource, NavigationPolicy, PageResult, PageView,
    Renderer, page_request, total_pages,
};
use crate::errors::{Error, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Shown to anyone but the owner who presses a restricted button.
pub const NOT_AUTHORIZED_NOTICE: &str = "You can't use these buttons.";

/// Shown when a page could not be loaded after a button press.
pub const PAGE_FAILED_NOTICE: &str = "An error occurred while loading that page. Please try again.";

/// Tunables for a single pagination session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatorOptions {
    /// Items per page, must be greater than zero
    pub page_size: u64,
    /// Hard session lifetime measured from `start()`, never extended by activity
    pub session_timeout: Duration,
    /// Behaviour of Previous/Next at the boundaries
    pub navigation: NavigationPolicy,
    /// Only the invoking user may navigate when set
    pub restrict_to_owner: bool,
}

impl PaginatorOptions {
    /// Timeout used by replies that were deferred before the first page.
    pub const DEFERRED_TIMEOUT: Duration = Duration::from_secs(300);
    /// Timeout used by replies sent inline.
    pub const INLINE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Options for a deferred reply: five minute session, clamped, owner only.
    #[must_use]
    pub const fn deferred(page_size: u64) -> Self {
        Self {
            page_size,
            session_timeout: Self::DEFERRED_TIMEOUT,
            navigation: NavigationPolicy::Clamp,
            restrict_to_owner: true,
        }
    }

    /// Options for an inline reply: one minute session, clamped, owner only.
    #[must_use]
    pub const fn inline(page_size: u64) -> Self {
        Self {
            session_timeout: Self::INLINE_TIMEOUT,
            ..Self::deferred(page_size)
        }
    }

    /// Replaces the navigation policy.
    #[must_use]
    pub const fn with_navigation(mut self, navigation: NavigationPolicy) -> Self {
        self.navigation = navigation;
        self
    }

    /// Sets whether only the owner may navigate.
    #[must_use]
    pub const fn with_owner_restriction(mut self, restrict_to_owner: bool) -> Self {
        self.restrict_to_owner = restrict_to_owner;
        self
    }

    /// Replaces the session timeout.
    #[must_use]
    pub const fn with_timeout(mut self, session_timeout: Duration) -> Self {
        self.session_timeout = session_timeout;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidPageSize {
                page_size: self.page_size,
            });
        }
        if self.session_timeout.is_zero() {
            return Err(Error::InvalidSessionTimeout);
        }
        Ok(())
    }
}

/// Lifecycle of a session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, first page not delivered yet
    Starting,
    /// First page delivered, accepting control events
    Awaiting,
    /// Timed out or closed, controls disabled
    Closed,
}

/// Snapshot of the mutable part of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatorSession {
    /// Zero-based page currently shown
    pub current_page: u64,
    /// Pages available, counted once at start
    pub total_pages: u64,
    /// Items available, counted once at start
    pub total_count: u64,
    /// User allowed to navigate
    pub owner: ActorId,
    /// When the session closes, set by `start()`
    pub deadline: Option<Instant>,
    /// Current lifecycle state
    pub state: SessionState,
}

impl PaginatorSession {
    const fn new(owner: ActorId) -> Self {
        Self {
            current_page: 0,
            total_pages: 1,
            total_count: 0,
            owner,
            deadline: None,
            state: SessionState::Starting,
        }
    }

    /// Whether control events are still accepted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Awaiting)
    }
}

/// What happened to a single control event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The page changed and the message was updated
    Navigated {
        /// Page now shown
        page: u64,
    },
    /// Accepted, but the page index did not move
    Unchanged,
    /// Sent by someone other than the owner
    Rejected,
    /// Arrived after the session closed
    Stale,
    /// The new page could not be shown; the previous page stays current
    Failed,
}

/// Drives one interactive pagination session.
pub struct Paginator<S, R, C>
where
    S: DataSource,
    R: Renderer<S::Item>,
    C: Channel<Payload = R::Payload>,
{
    source: S,
    renderer: R,
    channel: C,
    options: PaginatorOptions,
    session: PaginatorSession,
    message: Option<C::Message>,
    last_payload: Option<R::Payload>,
    events: Option<mpsc::Receiver<ControlEvent<C::Responder>>>,
}

impl<S, R, C> Paginator<S, R, C>
where
    S: DataSource,
    R: Renderer<S::Item>,
    C: Channel<Payload = R::Payload>,
{
    /// Builds a paginator without touching the source or the channel.
    ///
    /// # Errors
    /// [`Error::InvalidPageSize`] or [`Error::InvalidSessionTimeout`] for bad options.
    pub fn new(
        source: S,
        renderer: R,
        channel: C,
        owner: ActorId,
        options: PaginatorOptions,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            source,
            renderer,
            channel,
            options,
            session: PaginatorSession::new(owner),
            message: None,
            last_payload: None,
            events: None,
        })
    }

    /// Current session snapshot.
    #[must_use]
    pub const fn session(&self) -> &PaginatorSession {
        &self.session
    }

    /// Handle of the delivered message, once started.
    #[must_use]
    pub const fn message(&self) -> Option<&C::Message> {
        self.message.as_ref()
    }

    /// Counts the items, posts page 0 and starts listening for control events.
    ///
    /// # Errors
    /// [`Error::Delivery`] if the first page could not be fetched, rendered,
    /// posted or subscribed to. The session never becomes active in that case.
    #[instrument(skip(self), fields(owner = self.session.owner.0))]
    pub async fn start(&mut self) -> Result<&C::Message> {
        if self.session.state != SessionState::Starting {
            return Err(Error::Delivery {
                message: "pagination session was already started".to_string(),
            });
        }

        let deadline = Instant::now() + self.options.session_timeout;
        let (message, events) = self
            .deliver_first_page(deadline)
            .await
            .inspect_err(|e| warn!("Failed to start pagination session: {}", e))
            .map_err(|e| Error::delivery(&e))?;

        self.session.deadline = Some(deadline);
        self.session.state = SessionState::Awaiting;
        self.events = Some(events);
        info!(
            total_count = self.session.total_count,
            total_pages = self.session.total_pages,
            "Pagination session started"
        );
        Ok(self.message.insert(message))
    }

    async fn deliver_first_page(
        &mut self,
        deadline: Instant,
    ) -> Result<(C::Message, mpsc::Receiver<ControlEvent<C::Responder>>)> {
        let total_count = self.source.count().await?;
        self.session.total_count = total_count;
        self.session.total_pages = total_pages(total_count, self.options.page_size);
        self.session.current_page = 0;

        let payload = self.render_page(0).await?;
        let controls = self.controls_for(0);
        let message = self.channel.post(payload.clone(), controls).await?;
        self.last_payload = Some(payload);

        let events = match self.channel.subscribe(&message, deadline).await {
            Ok(events) => events,
            Err(e) => {
                self.disable_controls(&message).await;
                return Err(e);
            }
        };
        Ok((message, events))
    }

    /// Whether the session deadline has been reached.
    fn deadline_passed(&self) -> bool {
        self.session
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Pushes the last payload again with both controls disabled, best effort.
    async fn disable_controls(&self, message: &C::Message) {
        let Some(payload) = self.last_payload.clone() else {
            return;
        };
        if let Err(e) = self
            .channel
            .update(message, payload, Controls::disabled())
            .await
        {
            debug!(
                "Failed to disable controls, message may have been deleted: {}",
                e
            );
        }
    }

    /// Applies one control event to the session.
    ///
    /// Never fails: rejections, stale events and failed renders are reported
    /// through the returned [`EventOutcome`] and, where appropriate, a notice
    /// sent through the channel.
    pub async fn handle_event(&mut self, event: ControlEvent<C::Responder>) -> EventOutcome {
        if !self.session.is_active() {
            debug!(actor = event.actor.0, "Dropping control event for inactive session");
            return EventOutcome::Stale;
        }
        if self.deadline_passed() {
            debug!(actor = event.actor.0, "Dropping control event after deadline");
            self.on_timeout().await;
            return EventOutcome::Stale;
        }

        if self.options.restrict_to_owner && event.actor != self.session.owner {
            debug!(actor = event.actor.0, "Rejecting control event from non-owner");
            if let Err(e) = self
                .channel
                .notify_actor(&event.responder, NOT_AUTHORIZED_NOTICE)
                .await
            {
                warn!("Failed to send rejection notice: {}", e);
            }
            return EventOutcome::Rejected;
        }

        if let Err(e) = self.channel.acknowledge(&event.responder).await {
            warn!("Failed to acknowledge control event: {}", e);
        }

        let current = self.session.current_page;
        let target = self
            .options
            .navigation
            .apply(current, event.control, self.session.total_pages);
        if target == current {
            return EventOutcome::Unchanged;
        }

        match self.show_page(target).await {
            Ok(()) => {
                self.session.current_page = target;
                debug!(page = target, "Navigated to page");
                EventOutcome::Navigated { page: target }
            }
            Err(e) => {
                warn!(page = target, "Failed to show page: {}", e);
                if let Err(e) = self
                    .channel
                    .notify_failure(&event.responder, PAGE_FAILED_NOTICE)
                    .await
                {
                    warn!("Failed to send page failure notice: {}", e);
                }
                EventOutcome::Failed
            }
        }
    }

    /// Closes the session because its deadline passed.
    pub async fn on_timeout(&mut self) {
        if self.session.is_active() {
            info!("Pagination session timed out");
        }
        self.close().await;
    }

    /// Closes the session and disables its controls.
    ///
    /// Idempotent. Disabling the controls is best effort: a failure, such as
    /// the message having been deleted, is logged and otherwise ignored.
    pub async fn close(&mut self) {
        if self.session.state == SessionState::Closed {
            return;
        }
        let was_active = self.session.is_active();
        self.session.state = SessionState::Closed;
        self.events = None;

        if !was_active {
            return;
        }
        if let Some(message) = self.message.as_ref() {
            self.disable_controls(message).await;
        }
    }

    /// Consumes control events one by one until the deadline or the end of
    /// the event stream, then closes the session.
    pub async fn run(&mut self) -> PaginatorSession {
        let (Some(mut events), Some(deadline)) = (self.events.take(), self.session.deadline) else {
            return self.session;
        };

        while self.session.is_active() {
            match tokio::time::timeout_at(deadline, events.recv()).await {
                Ok(Some(_)) if self.deadline_passed() => self.on_timeout().await,
                Ok(Some(event)) => {
                    let outcome = self.handle_event(event).await;
                    debug!(?outcome, "Handled control event");
                }
                Ok(None) => {
                    debug!("Control event stream ended");
                    self.close().await;
                }
                Err(_) => self.on_timeout().await,
            }
        }
        self.session
    }

    /// Starts the session and runs it to completion.
    ///
    /// # Errors
    /// Only when the first page cannot be delivered, see [`Paginator::start`].
    pub async fn paginate(mut self) -> Result<PaginatorSession> {
        self.start().await?;
        Ok(self.run().await)
    }

    async fn show_page(&mut self, page_index: u64) -> Result<()> {
        let payload = self.render_page(page_index).await?;
        let controls = self.controls_for(page_index);
        let message = self.message.as_ref().ok_or_else(|| Error::Delivery {
            message: "pagination session has no message".to_string(),
        })?;
        self.channel.update(message, payload.clone(), controls).await?;
        self.last_payload = Some(payload);
        Ok(())
    }

    async fn render_page(&self, page_index: u64) -> Result<R::Payload> {
        let request = page_request(page_index, self.options.page_size);
        debug!(
            page = page_index,
            offset = request.offset,
            limit = request.limit,
            "Fetching page"
        );
        let page = PageResult {
            items: self.source.page(request).await?,
            total_count: self.session.total_count,
        };
        self.renderer.render(&PageView {
            items: &page.items,
            page_index,
            total_pages: self.session.total_pages,
            total_count: page.total_count,
            page_size: self.options.page_size,
        })
    }

    const fn controls_for(&self, page_index: u64) -> Controls {
        Controls::for_page(page_index, self.session.total_pages, self.options.navigation)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;
    use crate::core::pagination::{Control, PageRequest, VecSource};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    const OWNER: ActorId = ActorId(1);
    const STRANGER: ActorId = ActorId(2);

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Post(String, Controls),
        Update(String, Controls),
        Ack(u32),
        NotifyActor(u32),
        NotifyFailure(u32),
    }

    #[derive(Clone, Default)]
    struct FakeChannel {
        calls: Arc<Mutex<Vec<(Instant, Call)>>>,
        sender: Arc<Mutex<Option<mpsc::Sender<ControlEvent<u32>>>>>,
        fail_post: bool,
        fail_subscribe: bool,
        fail_updates: Arc<AtomicBool>,
    }

    impl FakeChannel {
        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push((Instant::now(), call));
        }

        fn calls(&self) -> Vec<Call> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, call)| call.clone())
                .collect()
        }

        fn timed_calls(&self) -> Vec<(Instant, Call)> {
            self.calls.lock().unwrap().clone()
        }

        fn sender(&self) -> mpsc::Sender<ControlEvent<u32>> {
            self.sender.lock().unwrap().clone().expect("not subscribed")
        }

        fn drop_sender(&self) {
            self.sender.lock().unwrap().take();
        }

        fn disabled_updates(&self) -> usize {
            self.calls()
                .iter()
                .filter(|call| matches!(call, Call::Update(_, controls) if *controls == Controls::disabled()))
                .count()
        }
    }

    #[async_trait]
    impl Channel for FakeChannel {
        type Payload = String;
        type Message = u64;
        type Responder = u32;

        async fn post(&self, payload: String, controls: Controls) -> Result<u64> {
            if self.fail_post {
                return Err(Error::Config {
                    message: "channel unavailable".to_string(),
                });
            }
            self.record(Call::Post(payload, controls));
            Ok(42)
        }

        async fn update(&self, message: &u64, payload: String, controls: Controls) -> Result<()> {
            assert_eq!(*message, 42);
            if self.fail_updates.load(Ordering::SeqCst) {
                return Err(Error::Config {
                    message: "message deleted".to_string(),
                });
            }
            self.record(Call::Update(payload, controls));
            Ok(())
        }

        async fn subscribe(
            &self,
            _message: &u64,
            _deadline: Instant,
        ) -> Result<mpsc::Receiver<ControlEvent<u32>>> {
            if self.fail_subscribe {
                return Err(Error::Config {
                    message: "gateway unavailable".to_string(),
                });
            }
            let (tx, rx) = mpsc::channel(8);
            *self.sender.lock().unwrap() = Some(tx);
            Ok(rx)
        }

        async fn acknowledge(&self, responder: &u32) -> Result<()> {
            self.record(Call::Ack(*responder));
            Ok(())
        }

        async fn notify_actor(&self, responder: &u32, _notice: &str) -> Result<()> {
            self.record(Call::NotifyActor(*responder));
            Ok(())
        }

        async fn notify_failure(&self, responder: &u32, _notice: &str) -> Result<()> {
            self.record(Call::NotifyFailure(*responder));
            Ok(())
        }
    }

    struct ListRenderer;

    impl Renderer<u32> for ListRenderer {
        type Payload = String;

        fn render(&self, page: &PageView<'_, u32>) -> Result<String> {
            let items: Vec<String> = page.items.iter().map(ToString::to_string).collect();
            Ok(format!(
                "{}/{}: {}",
                page.page_number(),
                page.total_pages,
                items.join(",")
            ))
        }
    }

    /// Source that can be switched into a failing state mid-session.
    struct FlakySource {
        inner: VecSource<u32>,
        failing: Arc<AtomicBool>,
    }

    #[async_trait]
    impl DataSource for FlakySource {
        type Item = u32;

        async fn count(&self) -> Result<u64> {
            self.inner.count().await
        }

        async fn page(&self, request: PageRequest) -> Result<Vec<u32>> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Config {
                    message: "database unavailable".to_string(),
                });
            }
            self.inner.page(request).await
        }
    }

    type TestPaginator = Paginator<VecSource<u32>, ListRenderer, FakeChannel>;

    fn items(count: u32) -> VecSource<u32> {
        VecSource::new((1..=count).collect())
    }

    fn paginator(count: u32, options: PaginatorOptions) -> (TestPaginator, FakeChannel) {
        let channel = FakeChannel::default();
        let paginator =
            Paginator::new(items(count), ListRenderer, channel.clone(), OWNER, options).unwrap();
        (paginator, channel)
    }

    fn press(actor: ActorId, control: Control, id: u32) -> ControlEvent<u32> {
        ControlEvent {
            actor,
            control,
            responder: id,
        }
    }

    fn csv(range: std::ops::RangeInclusive<u32>) -> String {
        range.map(|n| n.to_string()).collect::<Vec<_>>().join(",")
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let result = Paginator::new(
            items(3),
            ListRenderer,
            FakeChannel::default(),
            OWNER,
            PaginatorOptions::deferred(0),
        );
        assert!(matches!(result, Err(Error::InvalidPageSize { page_size: 0 })));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = Paginator::new(
            items(3),
            ListRenderer,
            FakeChannel::default(),
            OWNER,
            PaginatorOptions::deferred(10).with_timeout(Duration::ZERO),
        );
        assert!(matches!(result, Err(Error::InvalidSessionTimeout)));
    }

    #[test]
    fn test_option_presets() {
        assert_eq!(
            PaginatorOptions::deferred(10).session_timeout,
            Duration::from_secs(300)
        );
        let inline = PaginatorOptions::inline(5);
        assert_eq!(inline.session_timeout, Duration::from_secs(60));
        assert_eq!(inline.page_size, 5);
        assert_eq!(inline.navigation, NavigationPolicy::Clamp);
        assert!(inline.restrict_to_owner);
    }

    #[tokio::test]
    async fn test_walks_through_three_pages() {
        let (mut paginator, channel) = paginator(23, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();
        assert_eq!(paginator.session().total_pages, 3);
        assert_eq!(paginator.session().state, SessionState::Awaiting);

        let outcome = paginator.handle_event(press(OWNER, Control::Next, 1)).await;
        assert_eq!(outcome, EventOutcome::Navigated { page: 1 });
        let outcome = paginator.handle_event(press(OWNER, Control::Next, 2)).await;
        assert_eq!(outcome, EventOutcome::Navigated { page: 2 });

        assert_eq!(
            channel.calls(),
            vec![
                Call::Post(
                    format!("1/3: {}", csv(1..=10)),
                    Controls {
                        previous_disabled: true,
                        next_disabled: false
                    }
                ),
                Call::Ack(1),
                Call::Update(
                    format!("2/3: {}", csv(11..=20)),
                    Controls {
                        previous_disabled: false,
                        next_disabled: false
                    }
                ),
                Call::Ack(2),
                Call::Update(
                    "3/3: 21,22,23".to_string(),
                    Controls {
                        previous_disabled: false,
                        next_disabled: true
                    }
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_result_set_is_single_disabled_page() {
        let (mut paginator, channel) = paginator(0, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();
        assert_eq!(paginator.session().total_pages, 1);

        for (id, control) in [(1, Control::Next), (2, Control::Previous)] {
            let outcome = paginator.handle_event(press(OWNER, control, id)).await;
            assert_eq!(outcome, EventOutcome::Unchanged);
        }
        assert_eq!(paginator.session().current_page, 0);
        assert_eq!(
            channel.calls()[0],
            Call::Post("1/1: ".to_string(), Controls::disabled())
        );
        assert!(
            !channel
                .calls()
                .iter()
                .any(|call| matches!(call, Call::Update(..)))
        );
    }

    #[tokio::test]
    async fn test_previous_on_first_page_is_idempotent() {
        let (mut paginator, channel) = paginator(23, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();

        for id in 0..3 {
            let outcome = paginator
                .handle_event(press(OWNER, Control::Previous, id))
                .await;
            assert_eq!(outcome, EventOutcome::Unchanged);
            assert_eq!(paginator.session().current_page, 0);
        }
        assert_eq!(channel.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_next_on_last_page_is_idempotent() {
        let (mut paginator, _channel) = paginator(15, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();
        paginator.handle_event(press(OWNER, Control::Next, 1)).await;

        for id in 2..5 {
            let outcome = paginator.handle_event(press(OWNER, Control::Next, id)).await;
            assert_eq!(outcome, EventOutcome::Unchanged);
            assert_eq!(paginator.session().current_page, 1);
        }
    }

    #[tokio::test]
    async fn test_non_owner_is_rejected() {
        let (mut paginator, channel) = paginator(23, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();

        paginator.handle_event(press(OWNER, Control::Next, 1)).await;
        let outcome = paginator
            .handle_event(press(STRANGER, Control::Next, 2))
            .await;

        assert_eq!(outcome, EventOutcome::Rejected);
        assert_eq!(paginator.session().current_page, 1);
        let calls = channel.calls();
        assert_eq!(calls.last(), Some(&Call::NotifyActor(2)));
        assert!(!calls.contains(&Call::Ack(2)));
    }

    #[tokio::test]
    async fn test_non_owner_never_moves_page() {
        let (mut paginator, _channel) = paginator(50, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();

        for (id, control) in [Control::Next, Control::Previous, Control::Next]
            .into_iter()
            .enumerate()
        {
            let id = u32::try_from(id).unwrap();
            paginator.handle_event(press(STRANGER, control, id)).await;
            assert_eq!(paginator.session().current_page, 0);
        }
    }

    #[tokio::test]
    async fn test_open_session_accepts_anyone() {
        let options = PaginatorOptions::deferred(5).with_owner_restriction(false);
        let (mut paginator, _channel) = paginator(12, options);
        paginator.start().await.unwrap();

        let outcome = paginator
            .handle_event(press(STRANGER, Control::Next, 1))
            .await;
        assert_eq!(outcome, EventOutcome::Navigated { page: 1 });
    }

    #[tokio::test]
    async fn test_wrap_navigation() {
        let options = PaginatorOptions::inline(10).with_navigation(NavigationPolicy::Wrap);
        let (mut paginator, channel) = paginator(23, options);
        paginator.start().await.unwrap();

        let outcome = paginator
            .handle_event(press(OWNER, Control::Previous, 1))
            .await;
        assert_eq!(outcome, EventOutcome::Navigated { page: 2 });
        let outcome = paginator.handle_event(press(OWNER, Control::Next, 2)).await;
        assert_eq!(outcome, EventOutcome::Navigated { page: 0 });

        let wrap_controls = Controls {
            previous_disabled: false,
            next_disabled: false,
        };
        assert!(
            channel
                .calls()
                .iter()
                .all(|call| !matches!(call, Call::Post(_, c) | Call::Update(_, c) if *c != wrap_controls))
        );
    }

    #[tokio::test]
    async fn test_acknowledges_before_updating() {
        let (mut paginator, channel) = paginator(23, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();
        paginator.handle_event(press(OWNER, Control::Next, 7)).await;

        let calls = channel.calls();
        let ack = calls.iter().position(|c| *c == Call::Ack(7)).unwrap();
        let update = calls
            .iter()
            .position(|c| matches!(c, Call::Update(..)))
            .unwrap();
        assert!(ack < update);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let channel = FakeChannel {
            fail_post: true,
            ..FakeChannel::default()
        };
        let mut paginator = Paginator::new(
            items(5),
            ListRenderer,
            channel,
            OWNER,
            PaginatorOptions::deferred(10),
        )
        .unwrap();

        let err = paginator.start().await.unwrap_err();
        assert!(matches!(err, Error::Delivery { .. }));
        assert!(!paginator.session().is_active());
        assert!(paginator.message().is_none());

        let outcome = paginator.handle_event(press(OWNER, Control::Next, 1)).await;
        assert_eq!(outcome, EventOutcome::Stale);
    }

    #[tokio::test]
    async fn test_subscribe_failure_disables_posted_controls() {
        let channel = FakeChannel {
            fail_subscribe: true,
            ..FakeChannel::default()
        };
        let mut paginator = Paginator::new(
            items(23),
            ListRenderer,
            channel.clone(),
            OWNER,
            PaginatorOptions::deferred(10),
        )
        .unwrap();

        let err = paginator.start().await.unwrap_err();
        assert!(matches!(err, Error::Delivery { .. }));
        assert!(!paginator.session().is_active());
        assert_eq!(
            channel.calls(),
            vec![
                Call::Post(
                    format!("1/3: {}", csv(1..=10)),
                    Controls {
                        previous_disabled: true,
                        next_disabled: false
                    }
                ),
                Call::Update(format!("1/3: {}", csv(1..=10)), Controls::disabled()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_navigation_keeps_session_alive() {
        let failing = Arc::new(AtomicBool::new(false));
        let source = FlakySource {
            inner: items(30),
            failing: Arc::clone(&failing),
        };
        let channel = FakeChannel::default();
        let mut paginator = Paginator::new(
            source,
            ListRenderer,
            channel.clone(),
            OWNER,
            PaginatorOptions::deferred(10),
        )
        .unwrap();
        paginator.start().await.unwrap();

        failing.store(true, Ordering::SeqCst);
        let outcome = paginator.handle_event(press(OWNER, Control::Next, 1)).await;
        assert_eq!(outcome, EventOutcome::Failed);
        assert_eq!(paginator.session().current_page, 0);
        assert!(paginator.session().is_active());
        assert!(channel.calls().contains(&Call::NotifyFailure(1)));

        failing.store(false, Ordering::SeqCst);
        let outcome = paginator.handle_event(press(OWNER, Control::Next, 2)).await;
        assert_eq!(outcome, EventOutcome::Navigated { page: 1 });
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back_page() {
        let (mut paginator, channel) = paginator(30, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();

        channel.fail_updates.store(true, Ordering::SeqCst);
        let outcome = paginator.handle_event(press(OWNER, Control::Next, 1)).await;
        assert_eq!(outcome, EventOutcome::Failed);
        assert_eq!(paginator.session().current_page, 0);
        assert!(paginator.session().is_active());
    }

    #[tokio::test]
    async fn test_close_disables_controls_once() {
        let (mut paginator, channel) = paginator(23, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();
        paginator.handle_event(press(OWNER, Control::Next, 1)).await;

        paginator.close().await;
        paginator.close().await;
        paginator.on_timeout().await;

        assert_eq!(paginator.session().state, SessionState::Closed);
        assert_eq!(channel.disabled_updates(), 1);
        assert_eq!(
            channel.calls().last(),
            Some(&Call::Update(
                format!("2/3: {}", csv(11..=20)),
                Controls::disabled()
            ))
        );
    }

    #[tokio::test]
    async fn test_close_tolerates_deleted_message() {
        let (mut paginator, channel) = paginator(23, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();

        channel.fail_updates.store(true, Ordering::SeqCst);
        paginator.close().await;
        assert_eq!(paginator.session().state, SessionState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_closes_session_and_drops_late_events() {
        let (mut paginator, channel) = paginator(23, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();
        let started = Instant::now();

        let sender = channel.sender();
        sender.send(press(OWNER, Control::Next, 1)).await.unwrap();

        let session = paginator.run().await;
        assert_eq!(session.state, SessionState::Closed);
        assert_eq!(session.current_page, 1);
        assert!(Instant::now() >= started + Duration::from_secs(300));
        assert_eq!(channel.disabled_updates(), 1);

        let outcome = paginator
            .handle_event(press(OWNER, Control::Previous, 2))
            .await;
        assert_eq!(outcome, EventOutcome::Stale);
        assert_eq!(paginator.session().current_page, 1);
        assert!(!channel.calls().contains(&Call::Ack(2)));
        assert_eq!(channel.disabled_updates(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_event_after_deadline_is_dropped() {
        let (mut paginator, channel) = paginator(23, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();

        tokio::time::advance(Duration::from_secs(301)).await;
        let sender = channel.sender();
        sender.send(press(OWNER, Control::Next, 9)).await.unwrap();

        let session = paginator.run().await;
        assert_eq!(session.state, SessionState::Closed);
        assert_eq!(session.current_page, 0);
        assert!(!channel.calls().contains(&Call::Ack(9)));
        assert_eq!(channel.disabled_updates(), 1);
        assert_eq!(
            channel.calls().last(),
            Some(&Call::Update(format!("1/3: {}", csv(1..=10)), Controls::disabled()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_after_deadline_closes_session() {
        let (mut paginator, channel) = paginator(23, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();

        tokio::time::advance(Duration::from_secs(400)).await;
        let outcome = paginator.handle_event(press(OWNER, Control::Next, 4)).await;

        assert_eq!(outcome, EventOutcome::Stale);
        assert_eq!(paginator.session().state, SessionState::Closed);
        assert_eq!(paginator.session().current_page, 0);
        assert!(!channel.calls().contains(&Call::Ack(4)));
        assert_eq!(channel.disabled_updates(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_does_not_extend_deadline() {
        let (mut paginator, channel) = paginator(23, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();
        let deadline = paginator.session().deadline.unwrap();
        let sender = channel.sender();

        let driver = async move {
            tokio::time::sleep(Duration::from_secs(250)).await;
            sender.send(press(OWNER, Control::Next, 1)).await.unwrap();
            sender
        };
        let (session, _sender) = tokio::join!(paginator.run(), driver);

        assert_eq!(session.state, SessionState::Closed);
        assert_eq!(session.current_page, 1);
        let (closed_at, _) = channel
            .timed_calls()
            .into_iter()
            .rfind(|(_, call)| matches!(call, Call::Update(_, c) if *c == Controls::disabled()))
            .unwrap();
        assert!(closed_at >= deadline);
        assert!(closed_at < deadline + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_events_processed_in_arrival_order() {
        let (mut paginator, channel) = paginator(50, PaginatorOptions::deferred(10));
        paginator.start().await.unwrap();
        let sender = channel.sender();

        sender.send(press(OWNER, Control::Next, 1)).await.unwrap();
        sender.send(press(OWNER, Control::Next, 2)).await.unwrap();
        sender.send(press(OWNER, Control::Previous, 3)).await.unwrap();
        drop(sender);
        channel.drop_sender();

        let session = paginator.run().await;
        assert_eq!(session.current_page, 1);
        assert_eq!(session.state, SessionState::Closed);

        let acks: Vec<u32> = channel
            .calls()
            .iter()
            .filter_map(|call| match call {
                Call::Ack(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(acks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_paginate_runs_to_completion() {
        let (paginator, channel) = paginator(5, PaginatorOptions::inline(10));
        let probe = channel.clone();
        let handle = tokio::spawn(paginator.paginate());

        // wait for the subscription, then end the stream
        while probe.sender.lock().unwrap().is_none() {
            tokio::task::yield_now().await;
        }
        probe.drop_sender();

        let session = handle.await.unwrap().unwrap();
        assert_eq!(session.state, SessionState::Closed);
        assert_eq!(probe.disabled_updates(), 1);
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let (mut paginator, _channel) = paginator(5, PaginatorOptions::inline(10));
        paginator.start().await.unwrap();
        assert!(matches!(
            paginator.start().await,
            Err(Error::Delivery { .. })
        ));
    }
}
