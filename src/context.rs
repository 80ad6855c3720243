//! The in-progress event an administrator is assembling.

use chrono::{DateTime, Utc};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::types::{ChatId, MessageId};

/// Kind of prediction event being created.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    /// Yes/no outcome.
    Binary,
    /// One winner among several listed options.
    MultiOption,
    /// Participants forecast a probability for each option.
    Probability,
}

impl EventType {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Localizer key of the human-readable label.
    pub fn label_key(&self) -> &'static str {
        match self {
            EventType::Binary => "event_type.binary",
            EventType::MultiOption => "event_type.multi_option",
            EventType::Probability => "event_type.probability",
        }
    }

    /// Whether the administrator types the option list. Binary events use a
    /// fixed yes/no pair.
    pub fn asks_for_options(&self) -> bool {
        !matches!(self, EventType::Binary)
    }
}

/// Fields collected so far by an event-creation dialog.
///
/// The four `last_*` identifiers track transient chat messages that have to
/// be removed once they are superseded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventCreationContext {
    pub question: String,
    pub event_type: Option<EventType>,
    pub options: Vec<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub group_id: i64,
    pub chat_id: ChatId,
    pub last_bot_message_id: Option<MessageId>,
    pub last_user_message_id: Option<MessageId>,
    pub last_error_message_id: Option<MessageId>,
    pub last_confirmation_message_id: Option<MessageId>,
}

impl EventCreationContext {
    /// Empty context for a dialog started in `chat` on behalf of `group_id`.
    pub fn new(chat_id: ChatId, group_id: i64) -> Self {
        Self {
            question: String::new(),
            event_type: None,
            options: Vec::new(),
            deadline: None,
            group_id,
            chat_id,
            last_bot_message_id: None,
            last_user_message_id: None,
            last_error_message_id: None,
            last_confirmation_message_id: None,
        }
    }

    /// Takes every tracked transient message id, leaving the fields empty.
    ///
    /// Ids come back in display order: prompt, input, error, confirmation.
    pub fn take_transient_messages(&mut self) -> Vec<MessageId> {
        [
            self.last_bot_message_id.take(),
            self.last_user_message_id.take(),
            self.last_error_message_id.take(),
            self.last_confirmation_message_id.take(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
