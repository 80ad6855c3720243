//! # Event Dialog Store
//!
//! The conversational core of a prediction-market chat bot: a multi-step
//! event-creation dialog (question, type, options, deadline, confirmation)
//! whose in-flight state is persisted through [Sea-ORM](https://crates.io/crates/sea-orm)
//! so it survives restarts and can be served by several workers.
//!
//! ## Features
//!
//! - One durable session row per administrator with atomic upserts
//! - Inactivity expiry (30 minutes by default), purged on access
//! - Fixed, versioned string-map encoding of the dialog context
//! - Best-effort cleanup of superseded prompts, inputs and error messages
//! - Chat platform, event creation and text lookup behind small traits
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use event_dialog_store::migration::{Migrator, MigratorTrait};
//! use event_dialog_store::{
//!     ChatId, ChatTransport, DialogConfig, EventCreationDialog, EventManager, Inbound,
//!     MessageId, SeaOrmSessionStore, StaticLocalizer, UserId,
//! };
//! use sea_orm::Database;
//!
//! # async fn example(
//! #     transport: Arc<dyn ChatTransport>,
//! #     events: Arc<dyn EventManager>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let conn = Database::connect("sqlite://sessions.db?mode=rwc").await?;
//! Migrator::up(&conn, None).await?;
//!
//! let dialog = EventCreationDialog::new(
//!     Arc::new(SeaOrmSessionStore::new(conn)),
//!     transport,
//!     events,
//!     Arc::new(StaticLocalizer::english()),
//!     DialogConfig::default().with_display_timezone(chrono_tz::Europe::Berlin),
//! );
//!
//! let admin = UserId(42);
//! let chat = ChatId(42);
//! dialog.begin(admin, chat, -100_200, Some(MessageId(1))).await?;
//! dialog
//!     .handle(admin, chat, Inbound::Text { message_id: MessageId(3), text: "Will it rain?".into() })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod clock;
pub mod codec;
pub mod config;
pub mod context;
pub mod dialog;
pub mod entity;
pub mod error;
pub mod events;
pub mod locale;
#[cfg(feature = "migration")]
pub mod migration;
mod seaorm_store;
pub mod state;
pub mod store;
pub mod transport;
pub mod types;

pub use cleanup::MessageCleaner;
pub use clock::{Clock, SystemClock};
pub use codec::ContextMap;
pub use config::DialogConfig;
pub use context::{EventCreationContext, EventType};
pub use dialog::{DialogOutcome, EventCreationDialog, Inbound};
pub use error::{
    CodecError, DialogError, EventCreationError, SessionError, TransportError, ValidationError,
};
pub use events::{CreatedEvent, EventManager, NewEvent};
pub use locale::{Localizer, StaticLocalizer};

/// The Sea-ORM backed session store.
///
/// See [`SeaOrmSessionStore`] documentation for usage details.
pub use seaorm_store::SeaOrmSessionStore;
pub use state::DialogState;
pub use store::SessionStore;
pub use transport::{Button, ChatTransport, Keyboard};
pub use types::{ChatId, MessageId, UserId};
