//! Hand-off of a confirmed event to the component that owns events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::context::EventType;
use crate::error::EventCreationError;
use crate::types::{ChatId, UserId};

/// A fully assembled event, ready to be created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEvent {
    pub question: String,
    pub event_type: EventType,
    pub options: Vec<String>,
    pub deadline: DateTime<Utc>,
    pub group_id: i64,
    pub chat_id: ChatId,
    pub created_by: UserId,
}

/// What the event manager reports back after creating an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedEvent {
    pub id: i64,
    /// Reference to where the event was published (e.g. a post link), if any.
    pub publication_ref: Option<String>,
}

/// Creates events. Called once per confirmed dialog.
#[async_trait]
pub trait EventManager: Send + Sync {
    async fn create_event(&self, event: NewEvent) -> Result<CreatedEvent, EventCreationError>;
}
