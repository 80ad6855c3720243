//! Best-effort removal of superseded dialog messages.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::TransportError;
use crate::transport::ChatTransport;
use crate::types::{ChatId, MessageId};

/// Deletes transient prompts, inputs and error messages.
///
/// Deletion failures never reach the caller: a rate-limited deletion is
/// retried once after a fixed backoff, "not found" and "too old" are
/// treated as already gone, anything else is logged. The backoff is awaited
/// inside the calling task only.
#[derive(Clone)]
pub struct MessageCleaner {
    transport: Arc<dyn ChatTransport>,
    retry_backoff: Duration,
}

impl MessageCleaner {
    pub fn new(transport: Arc<dyn ChatTransport>, retry_backoff: Duration) -> Self {
        Self {
            transport,
            retry_backoff,
        }
    }

    /// Deletes `messages` from `chat` in the given order.
    ///
    /// A failure for one message does not stop the remaining deletions.
    pub async fn delete_messages<I>(&self, chat: ChatId, messages: I)
    where
        I: IntoIterator<Item = MessageId>,
    {
        for message in messages {
            self.delete_one(chat, message).await;
        }
    }

    async fn delete_one(&self, chat: ChatId, message: MessageId) {
        let err = match self.transport.delete_message(chat, message).await {
            Ok(()) => return,
            Err(err) => err,
        };

        match err {
            TransportError::RateLimited { retry_after } => {
                debug!(
                    chat_id = chat.0,
                    message_id = message.0,
                    ?retry_after,
                    backoff = ?self.retry_backoff,
                    "message deletion rate limited, retrying once"
                );
                tokio::time::sleep(self.retry_backoff).await;

                match self.transport.delete_message(chat, message).await {
                    Ok(()) => debug!(
                        chat_id = chat.0,
                        message_id = message.0,
                        "message deleted on retry"
                    ),
                    Err(e) => warn!(
                        chat_id = chat.0,
                        message_id = message.0,
                        error = %e,
                        "message deletion failed after retry"
                    ),
                }
            }
            TransportError::NotFound | TransportError::TooOld => {
                debug!(
                    chat_id = chat.0,
                    message_id = message.0,
                    reason = %err,
                    "message already gone, skipping"
                );
            }
            TransportError::Other(_) => {
                warn!(
                    chat_id = chat.0,
                    message_id = message.0,
                    error = %err,
                    "failed to delete message"
                );
            }
        }
    }
}
