//! The event-creation dialog.
//!
//! Each inbound update for a principal loads its session, runs the handler
//! for the stored [`DialogState`], cleans up superseded messages and writes
//! the session back. Nothing is kept in memory between updates, so a restart
//! (or another worker) continues exactly where the store left off.
//!
//! ```text
//! ask_question -> ask_event_type -> ask_options -> ask_deadline -> confirm
//!                                 \______ binary events skip ______/
//! ```

pub mod render;
pub mod validate;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cleanup::MessageCleaner;
use crate::clock::{Clock, SystemClock};
use crate::codec::{self, ContextMap};
use crate::config::DialogConfig;
use crate::context::EventCreationContext;
use crate::error::{DialogError, EventCreationError, SessionError, ValidationError};
use crate::events::{CreatedEvent, EventManager, NewEvent};
use crate::locale::Localizer;
use crate::state::DialogState;
use crate::store::SessionStore;
use crate::transport::{ChatTransport, Keyboard};
use crate::types::{ChatId, MessageId, UserId};

/// An update delivered to a running dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// A text message typed by the administrator.
    Text { message_id: MessageId, text: String },
    /// A press on one of the dialog's inline buttons.
    Callback { callback_id: String, data: String },
}

impl Inbound {
    fn message_id(&self) -> Option<MessageId> {
        match self {
            Inbound::Text { message_id, .. } => Some(*message_id),
            Inbound::Callback { .. } => None,
        }
    }
}

/// What handling an update did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The dialog moved to (or started in) this state.
    Advanced(DialogState),
    /// The input was rejected; the dialog stays in this state.
    Rejected(DialogState, ValidationError),
    /// The event was created and the session removed.
    Created(CreatedEvent),
    /// The event manager refused the event; the dialog stays in `confirm`.
    CreationFailed(EventCreationError),
    /// The dialog was discarded and the session removed.
    Cancelled,
    /// There was no usable session for the principal.
    NoActiveSession,
}

/// Result of a single step handler.
type Step = Result<DialogState, ValidationError>;

/// Drives event-creation dialogs for any number of principals.
///
/// All state lives in the [`SessionStore`]; the dialog itself is cheap to
/// clone and share between tasks.
#[derive(Clone)]
pub struct EventCreationDialog {
    store: Arc<dyn SessionStore>,
    transport: Arc<dyn ChatTransport>,
    events: Arc<dyn EventManager>,
    localizer: Arc<dyn Localizer>,
    clock: Arc<dyn Clock>,
    cleaner: MessageCleaner,
    config: DialogConfig,
}

impl EventCreationDialog {
    pub fn new(
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn ChatTransport>,
        events: Arc<dyn EventManager>,
        localizer: Arc<dyn Localizer>,
        config: DialogConfig,
    ) -> Self {
        let cleaner = MessageCleaner::new(transport.clone(), config.delete_retry_backoff());
        Self {
            store,
            transport,
            events,
            localizer,
            clock: Arc::new(SystemClock),
            cleaner,
            config,
        }
    }

    /// Replaces the clock used to validate deadlines.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Starts a dialog for `principal` in `chat`, replacing any dialog the
    /// principal already had running.
    ///
    /// `trigger` is the command message that opened the dialog; it is
    /// removed along with the messages of a replaced dialog.
    pub async fn begin(
        &self,
        principal: UserId,
        chat: ChatId,
        group_id: i64,
        trigger: Option<MessageId>,
    ) -> Result<DialogOutcome, DialogError> {
        match self.store.get(principal).await {
            Ok((_, map)) => {
                if let Ok(mut previous) = codec::from_map(&map) {
                    self.cleaner
                        .delete_messages(previous.chat_id, previous.take_transient_messages())
                        .await;
                }
                debug!(principal = principal.0, "replacing running dialog");
            }
            Err(SessionError::NotFound | SessionError::Expired | SessionError::Decode(_)) => {}
            Err(e) => return Err(e.into()),
        }

        self.cleaner.delete_messages(chat, trigger).await;

        let mut ctx = EventCreationContext::new(chat, group_id);
        let state = DialogState::AskQuestion;
        let (text, keyboard) = self.prompt(state, &ctx);
        ctx.last_bot_message_id = Some(self.transport.send_text(chat, &text, keyboard).await?);
        self.save(principal, state, &ctx).await?;

        info!(principal = principal.0, chat_id = chat.0, group_id, "event creation dialog started");
        Ok(DialogOutcome::Advanced(state))
    }

    /// Feeds one update into the principal's dialog.
    ///
    /// Missing, expired and corrupt sessions are answered with a "no active
    /// session" notice and reported as [`DialogOutcome::NoActiveSession`].
    pub async fn handle(
        &self,
        principal: UserId,
        chat: ChatId,
        inbound: Inbound,
    ) -> Result<DialogOutcome, DialogError> {
        let callback_id = match &inbound {
            Inbound::Callback { callback_id, .. } => Some(callback_id.as_str()),
            Inbound::Text { .. } => None,
        };
        let Some((state, mut ctx)) = self.load(principal, chat, callback_id).await? else {
            return Ok(DialogOutcome::NoActiveSession);
        };

        if let Some(callback_id) = callback_id {
            self.acknowledge(callback_id, None).await;
        }
        ctx.last_user_message_id = inbound.message_id();

        let step = match state {
            DialogState::AskQuestion => self.on_question(&mut ctx, &inbound),
            DialogState::AskEventType => self.on_event_type(&mut ctx, &inbound),
            DialogState::AskOptions => self.on_options(&mut ctx, &inbound),
            DialogState::AskDeadline => self.on_deadline(&mut ctx, &inbound),
            DialogState::Confirm => return self.on_confirm(principal, ctx, &inbound).await,
        };

        match step {
            Ok(next) => self.advance(principal, ctx, next).await,
            Err(err) => self.reject(principal, state, ctx, err).await,
        }
    }

    /// Cancels the principal's dialog on an explicit command.
    pub async fn cancel(
        &self,
        principal: UserId,
        chat: ChatId,
        trigger: Option<MessageId>,
    ) -> Result<DialogOutcome, DialogError> {
        let Some((_, mut ctx)) = self.load(principal, chat, None).await? else {
            return Ok(DialogOutcome::NoActiveSession);
        };

        ctx.last_user_message_id = trigger;
        self.finish_cancelled(principal, ctx).await
    }

    /// Loads and decodes the session, answering the user when there is none.
    ///
    /// The notice goes to the pending callback when the update was a button
    /// press, otherwise it is sent to `chat`.
    async fn load(
        &self,
        principal: UserId,
        chat: ChatId,
        callback_id: Option<&str>,
    ) -> Result<Option<(DialogState, EventCreationContext)>, DialogError> {
        let notice_key = match self.store.get(principal).await {
            Ok((state, map)) => match codec::from_map(&map) {
                Ok(ctx) => return Ok(Some((state, ctx))),
                Err(e) => {
                    warn!(principal = principal.0, error = %e, "discarding corrupt dialog session");
                    self.store.delete(principal).await?;
                    "dialog.no_session"
                }
            },
            Err(SessionError::NotFound) => "dialog.no_session",
            Err(SessionError::Expired) => "dialog.session_expired",
            Err(SessionError::Decode(e)) => {
                warn!(principal = principal.0, error = %e, "discarding corrupt dialog session");
                self.store.delete(principal).await?;
                "dialog.no_session"
            }
            Err(e) => return Err(e.into()),
        };

        let notice = self.text(notice_key);
        match callback_id {
            Some(callback_id) => self.acknowledge(callback_id, Some(&notice)).await,
            None => {
                self.transport.send_text(chat, &notice, None).await?;
            }
        }
        debug!(principal = principal.0, reason = notice_key, "no active dialog");
        Ok(None)
    }

    fn on_question(&self, ctx: &mut EventCreationContext, inbound: &Inbound) -> Step {
        let question = validate::question(expect_text(inbound)?)?;
        ctx.question = question;
        Ok(DialogState::AskEventType)
    }

    fn on_event_type(&self, ctx: &mut EventCreationContext, inbound: &Inbound) -> Step {
        let raw = match inbound {
            Inbound::Text { text, .. } => text,
            Inbound::Callback { data, .. } => data,
        };
        let event_type = validate::event_type(raw)?;

        ctx.event_type = Some(event_type);
        if event_type.asks_for_options() {
            ctx.options.clear();
            Ok(DialogState::AskOptions)
        } else {
            ctx.options = vec![self.text("option.yes"), self.text("option.no")];
            Ok(DialogState::AskDeadline)
        }
    }

    fn on_options(&self, ctx: &mut EventCreationContext, inbound: &Inbound) -> Step {
        let options = validate::options(expect_text(inbound)?)?;
        ctx.options = options;
        Ok(DialogState::AskDeadline)
    }

    fn on_deadline(&self, ctx: &mut EventCreationContext, inbound: &Inbound) -> Step {
        let deadline = validate::deadline(
            expect_text(inbound)?,
            self.config.display_timezone(),
            self.clock.now(),
        )?;
        ctx.deadline = Some(deadline);
        Ok(DialogState::Confirm)
    }

    async fn on_confirm(
        &self,
        principal: UserId,
        ctx: EventCreationContext,
        inbound: &Inbound,
    ) -> Result<DialogOutcome, DialogError> {
        let confirmed = match inbound {
            Inbound::Text { .. } => Err(ValidationError::ExpectedButton),
            Inbound::Callback { data, .. } => validate::confirmation(data),
        };

        match confirmed {
            Ok(true) => self.finish_confirmed(principal, ctx).await,
            Ok(false) => self.finish_cancelled(principal, ctx).await,
            Err(err) => self.reject(principal, DialogState::Confirm, ctx, err).await,
        }
    }

    async fn finish_confirmed(
        &self,
        principal: UserId,
        mut ctx: EventCreationContext,
    ) -> Result<DialogOutcome, DialogError> {
        let Some(event) = assemble_event(principal, &ctx) else {
            warn!(principal = principal.0, "confirmed dialog is missing fields, discarding");
            self.cleaner
                .delete_messages(ctx.chat_id, ctx.take_transient_messages())
                .await;
            self.store.delete(principal).await?;
            self.transport
                .send_text(ctx.chat_id, &self.text("dialog.no_session"), None)
                .await?;
            return Ok(DialogOutcome::NoActiveSession);
        };

        let created = match self.events.create_event(event).await {
            Ok(created) => created,
            Err(err) => {
                warn!(principal = principal.0, error = %err, "event creation failed");
                let notice = self.text("error.create_failed");
                let error_id = self.transport.send_text(ctx.chat_id, &notice, None).await?;
                let stale = ctx.last_error_message_id.replace(error_id);
                self.cleaner.delete_messages(ctx.chat_id, stale).await;
                self.save(principal, DialogState::Confirm, &ctx).await?;
                return Ok(DialogOutcome::CreationFailed(err));
            }
        };

        // The session must be gone before any message is touched.
        if let Err(err) = self.store.delete(principal).await {
            warn!(
                principal = principal.0,
                event_id = created.id,
                error = %err,
                "failed to remove session of a created event"
            );
        }
        self.cleaner
            .delete_messages(ctx.chat_id, ctx.take_transient_messages())
            .await;
        let summary = render::render_final_summary(
            &ctx,
            &created,
            self.localizer.as_ref(),
            self.config.locale(),
            self.config.display_timezone(),
        );
        self.transport.send_text(ctx.chat_id, &summary, None).await?;

        info!(principal = principal.0, event_id = created.id, "event created from dialog");
        Ok(DialogOutcome::Created(created))
    }

    async fn finish_cancelled(
        &self,
        principal: UserId,
        mut ctx: EventCreationContext,
    ) -> Result<DialogOutcome, DialogError> {
        self.cleaner
            .delete_messages(ctx.chat_id, ctx.take_transient_messages())
            .await;
        self.store.delete(principal).await?;
        self.transport
            .send_text(ctx.chat_id, &self.text("dialog.cancelled"), None)
            .await?;

        info!(principal = principal.0, "event creation dialog cancelled");
        Ok(DialogOutcome::Cancelled)
    }

    /// Accepts the input: clears the previous prompt, input and error, then
    /// prompts for `next`.
    async fn advance(
        &self,
        principal: UserId,
        mut ctx: EventCreationContext,
        next: DialogState,
    ) -> Result<DialogOutcome, DialogError> {
        let stale = [
            ctx.last_bot_message_id.take(),
            ctx.last_user_message_id.take(),
            ctx.last_error_message_id.take(),
        ];
        self.cleaner
            .delete_messages(ctx.chat_id, stale.into_iter().flatten())
            .await;

        let (text, keyboard) = self.prompt(next, &ctx);
        let prompt_id = self.transport.send_text(ctx.chat_id, &text, keyboard).await?;
        if next == DialogState::Confirm {
            ctx.last_confirmation_message_id = Some(prompt_id);
        } else {
            ctx.last_bot_message_id = Some(prompt_id);
        }
        self.save(principal, next, &ctx).await?;

        debug!(principal = principal.0, state = %next, "dialog advanced");
        Ok(DialogOutcome::Advanced(next))
    }

    /// Rejects the input: shows a fresh error prompt, removes the previous
    /// one together with the invalid input, and keeps everything collected
    /// so far.
    async fn reject(
        &self,
        principal: UserId,
        state: DialogState,
        mut ctx: EventCreationContext,
        err: ValidationError,
    ) -> Result<DialogOutcome, DialogError> {
        let notice = self.text(err.message_key());
        let error_id = self.transport.send_text(ctx.chat_id, &notice, None).await?;

        let stale = [
            ctx.last_error_message_id.replace(error_id),
            ctx.last_user_message_id.take(),
        ];
        self.cleaner
            .delete_messages(ctx.chat_id, stale.into_iter().flatten())
            .await;
        self.save(principal, state, &ctx).await?;

        debug!(principal = principal.0, state = %state, reason = %err, "dialog input rejected");
        Ok(DialogOutcome::Rejected(state, err))
    }

    fn prompt(&self, state: DialogState, ctx: &EventCreationContext) -> (String, Option<Keyboard>) {
        let locale = self.config.locale();
        let localizer = self.localizer.as_ref();
        match state {
            DialogState::AskQuestion => (self.text("prompt.question"), None),
            DialogState::AskEventType => (
                self.text("prompt.event_type"),
                Some(render::event_type_keyboard(localizer, locale)),
            ),
            DialogState::AskOptions => (self.text("prompt.options"), None),
            DialogState::AskDeadline => (
                format!(
                    "{} ({})",
                    self.text("prompt.deadline"),
                    self.config.display_timezone().name()
                ),
                None,
            ),
            DialogState::Confirm => {
                let summary = render::render_summary(
                    ctx,
                    localizer,
                    locale,
                    self.config.display_timezone(),
                );
                (
                    format!("{summary}\n\n{}", self.text("prompt.confirm")),
                    Some(render::confirm_keyboard(localizer, locale)),
                )
            }
        }
    }

    async fn save(
        &self,
        principal: UserId,
        state: DialogState,
        ctx: &EventCreationContext,
    ) -> Result<(), DialogError> {
        let map: ContextMap = codec::to_map(ctx);
        self.store.set(principal, state, &map).await?;
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str, text: Option<&str>) {
        if let Err(e) = self.transport.answer_callback(callback_id, text).await {
            debug!(callback_id, error = %e, "failed to answer callback");
        }
    }

    fn text(&self, key: &str) -> String {
        self.localizer.text(self.config.locale(), key)
    }
}

fn expect_text(inbound: &Inbound) -> Result<&str, ValidationError> {
    match inbound {
        Inbound::Text { text, .. } => Ok(text),
        Inbound::Callback { .. } => Err(ValidationError::ExpectedText),
    }
}

fn assemble_event(principal: UserId, ctx: &EventCreationContext) -> Option<NewEvent> {
    Some(NewEvent {
        question: ctx.question.clone(),
        event_type: ctx.event_type?,
        options: ctx.options.clone(),
        deadline: ctx.deadline?,
        group_id: ctx.group_id,
        chat_id: ctx.chat_id,
        created_by: principal,
    })
}
