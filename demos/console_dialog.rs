//! Runs the event-creation dialog in a terminal.
//!
//! Lines are sent as text messages, `/new` starts a dialog, `/cancel`
//! cancels it and `!<data>` presses a button (e.g. `!event_type:binary`).
//! Sessions are kept in the database at `DATABASE_URL`, so quitting and
//! restarting resumes the dialog.

use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use event_dialog_store::migration::{Migrator, MigratorTrait};
use event_dialog_store::{
    ChatId, ChatTransport, CreatedEvent, DialogConfig, EventCreationDialog, EventCreationError,
    EventManager, Inbound, Keyboard, MessageId, NewEvent, SeaOrmSessionStore, StaticLocalizer,
    TransportError, UserId,
};
use sea_orm::Database;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Message ids for both sides of the conversation. Seeded from the clock so
/// ids stored by an earlier run are never handed out again after a restart.
fn message_ids() -> Arc<AtomicI32> {
    let seconds = Utc::now().timestamp() % 1_000_000;
    Arc::new(AtomicI32::new(seconds as i32 * 1_000))
}

struct ConsoleTransport {
    next_id: Arc<AtomicI32>,
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send_text(
        &self,
        _chat: ChatId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageId, TransportError> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        println!("[bot #{id}] {text}");
        for row in keyboard.iter().flat_map(|k| k.rows.iter()) {
            let buttons: Vec<_> = row
                .iter()
                .map(|b| format!("[{}] !{}", b.label, b.data))
                .collect();
            println!("    {}", buttons.join("   "));
        }
        Ok(id)
    }

    async fn delete_message(&self, _chat: ChatId, message: MessageId) -> Result<(), TransportError> {
        println!("    (deleted #{message})");
        Ok(())
    }

    async fn answer_callback(
        &self,
        _callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), TransportError> {
        if let Some(text) = text {
            println!("[notice] {text}");
        }
        Ok(())
    }
}

struct PrintingEvents {
    next_id: AtomicI64,
}

#[async_trait]
impl EventManager for PrintingEvents {
    async fn create_event(&self, event: NewEvent) -> Result<CreatedEvent, EventCreationError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        println!("[events] created #{id}: {event:?}");
        Ok(CreatedEvent {
            id,
            publication_ref: None,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://dialog_sessions.db?mode=rwc".to_string());
    tracing::info!(%database_url, "connecting to session database");

    let conn = Database::connect(&database_url).await?;
    Migrator::up(&conn, None).await?;

    let ids = message_ids();
    let dialog = EventCreationDialog::new(
        Arc::new(SeaOrmSessionStore::new(conn)),
        Arc::new(ConsoleTransport {
            next_id: ids.clone(),
        }),
        Arc::new(PrintingEvents {
            next_id: AtomicI64::new(1),
        }),
        Arc::new(StaticLocalizer::english()),
        DialogConfig::default(),
    );

    let admin = UserId(1);
    let chat = ChatId(1);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Type /new to start, /cancel to abort, !<data> to press a button.");
    while let Some(line) = lines.next_line().await? {
        let message_id = MessageId(ids.fetch_add(1, Ordering::SeqCst));

        let outcome = match line.trim() {
            "/new" => dialog.begin(admin, chat, 0, Some(message_id)).await?,
            "/cancel" => dialog.cancel(admin, chat, Some(message_id)).await?,
            input => match input.strip_prefix('!') {
                Some(data) => {
                    let inbound = Inbound::Callback {
                        callback_id: format!("console-{}", message_id.0),
                        data: data.to_string(),
                    };
                    dialog.handle(admin, chat, inbound).await?
                }
                None => {
                    let inbound = Inbound::Text {
                        message_id,
                        text: line.clone(),
                    };
                    dialog.handle(admin, chat, inbound).await?
                }
            },
        };
        tracing::debug!(?outcome, "update handled");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bot_and_input_ids_never_collide() {
        let ids = message_ids();
        let transport = ConsoleTransport {
            next_id: ids.clone(),
        };

        let input = MessageId(ids.fetch_add(1, Ordering::SeqCst));
        let sent = transport.send_text(ChatId(1), "prompt", None).await.unwrap();

        assert_ne!(input, sent);
    }
}
