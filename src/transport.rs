//! The narrow slice of a chat platform the dialog needs.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{ChatId, MessageId};

/// A button attached under a message. Pressing it sends `data` back as a
/// callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Rows of inline buttons.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// Appends a row of buttons.
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    /// Callback payloads in display order.
    pub fn callback_data(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|b| b.data.as_str())
    }
}

/// Chat operations the dialog depends on.
///
/// Any platform binding able to send text with optional buttons, delete a
/// message and acknowledge a button press satisfies it.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends `text` to `chat` and returns the id of the new message.
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageId, TransportError>;

    /// Deletes a single message.
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError>;

    /// Acknowledges a button press, optionally showing a short notice.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), TransportError>;
}
