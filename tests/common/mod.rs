#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use event_dialog_store::migration::{Migrator, MigratorTrait};
use event_dialog_store::{
    ChatId, ChatTransport, Clock, CreatedEvent, EventCreationError, EventManager, Keyboard,
    MessageId, NewEvent, SeaOrmSessionStore, TransportError,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh in-memory SQLite database with the session table created.
///
/// A single pooled connection keeps the in-memory database alive and shared.
pub async fn memory_db() -> DatabaseConnection {
    connect("sqlite::memory:").await
}

/// SQLite database stored in `path`, created when missing.
pub async fn file_db(path: &Path) -> DatabaseConnection {
    connect(&format!("sqlite://{}?mode=rwc", path.display())).await
}

/// SQLite database stored in `path` behind a pool of `connections`
/// connections, as a host running several workers would open it.
pub async fn pooled_file_db(path: &Path, connections: u32) -> DatabaseConnection {
    connect_with(
        &format!("sqlite://{}?mode=rwc", path.display()),
        connections,
    )
    .await
}

async fn connect(url: &str) -> DatabaseConnection {
    connect_with(url, 1).await
}

async fn connect_with(url: &str, connections: u32) -> DatabaseConnection {
    let mut options = ConnectOptions::new(url.to_string());
    options
        .max_connections(connections)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options).await.unwrap();
    Migrator::up(&conn, None).await.unwrap();
    conn
}

pub fn store(conn: DatabaseConnection, clock: Arc<ManualClock>) -> SeaOrmSessionStore {
    SeaOrmSessionStore::new(conn).with_clock(clock)
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, 1, 12, 0, 0).unwrap()
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub chat: ChatId,
    pub id: MessageId,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

/// Chat transport recording every call. Deletions succeed unless a result
/// sequence was scripted for the message.
#[derive(Default)]
pub struct FakeTransport {
    next_id: AtomicI32,
    sent: Mutex<Vec<SentMessage>>,
    delete_attempts: Mutex<Vec<(ChatId, MessageId)>>,
    deleted: Mutex<Vec<MessageId>>,
    delete_script: Mutex<HashMap<MessageId, VecDeque<Result<(), TransportError>>>>,
    callbacks: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI32::new(100),
            ..Default::default()
        })
    }

    /// Results returned by successive deletions of `message`.
    pub fn script_delete(&self, message: MessageId, results: Vec<Result<(), TransportError>>) {
        self.delete_script
            .lock()
            .unwrap()
            .insert(message, results.into());
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> SentMessage {
        self.sent().last().cloned().unwrap()
    }

    pub fn delete_attempts(&self) -> Vec<MessageId> {
        self.delete_attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn attempts_for(&self, message: MessageId) -> usize {
        self.delete_attempts()
            .into_iter()
            .filter(|id| *id == message)
            .count()
    }

    pub fn deleted(&self) -> Vec<MessageId> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn callbacks(&self) -> Vec<(String, Option<String>)> {
        self.callbacks.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
        self.delete_attempts.lock().unwrap().clear();
        self.deleted.lock().unwrap().clear();
        self.callbacks.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageId, TransportError> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().unwrap().push(SentMessage {
            chat,
            id,
            text: text.to_string(),
            keyboard,
        });
        Ok(id)
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError> {
        self.delete_attempts.lock().unwrap().push((chat, message));
        let scripted = self
            .delete_script
            .lock()
            .unwrap()
            .get_mut(&message)
            .and_then(VecDeque::pop_front);
        let result = scripted.unwrap_or(Ok(()));
        if result.is_ok() {
            self.deleted.lock().unwrap().push(message);
        }
        result
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), TransportError> {
        self.callbacks
            .lock()
            .unwrap()
            .push((callback_id.to_string(), text.map(str::to_string)));
        Ok(())
    }
}

/// Event manager recording every creation request.
pub struct FakeEvents {
    next_id: AtomicI64,
    fail: AtomicBool,
    publication_ref: Option<String>,
    calls: Mutex<Vec<NewEvent>>,
}

impl FakeEvents {
    pub fn new() -> Arc<Self> {
        Self::with_publication_ref(None)
    }

    pub fn with_publication_ref(publication_ref: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(1),
            fail: AtomicBool::new(false),
            publication_ref,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<NewEvent> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventManager for FakeEvents {
    async fn create_event(&self, event: NewEvent) -> Result<CreatedEvent, EventCreationError> {
        self.calls.lock().unwrap().push(event);
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(EventCreationError("database unavailable".to_string()));
        }
        Ok(CreatedEvent {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            publication_ref: self.publication_ref.clone(),
        })
    }
}
