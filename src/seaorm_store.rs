use std::fmt::{self, Debug};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Alias, Expr, OnConflict, SimpleExpr};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::codec::ContextMap;
use crate::config::DEFAULT_SESSION_TTL_MINUTES;
use crate::entity::dialog_session::{
    self, ActiveModel as SessionActiveModel, Entity as SessionEntity,
};
use crate::error::SessionError;
use crate::state::DialogState;
use crate::store::{Result, SessionStore};
use crate::types::UserId;

/// A [`SessionStore`] persisting dialog sessions through Sea-ORM.
///
/// Works against any backend Sea-ORM is compiled for; the crate's `sqlite`
/// and `postgres` features select the drivers. Context maps are serialized
/// with MessagePack for compact storage.
///
/// # Usage
///
/// ```no_run
/// use chrono::Duration;
/// use event_dialog_store::migration::{Migrator, MigratorTrait};
/// use event_dialog_store::SeaOrmSessionStore;
/// use sea_orm::Database;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = Database::connect("sqlite://sessions.db?mode=rwc").await?;
/// Migrator::up(&conn, None).await?;
///
/// let store = SeaOrmSessionStore::new(conn).with_ttl(Duration::minutes(30));
/// # Ok(())
/// # }
/// ```
///
/// # Atomicity
///
/// `set` writes state, context and timestamp with a single upsert statement,
/// so concurrent readers never observe a half-written row. The stored
/// timestamp never moves backwards for a principal, even if the clock does.
///
/// # Error Handling
///
/// - Database errors → [`SessionError::Backend`]
/// - Serialization errors → [`SessionError::Encode`]
/// - Deserialization errors and unknown state names → [`SessionError::Decode`]
#[derive(Clone)]
pub struct SeaOrmSessionStore {
    /// The Sea-ORM database connection used for database operations.
    conn: DatabaseConnection,
    /// Inactivity period after which a session is expired.
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SeaOrmSessionStore {
    /// Creates a store with a 30 minute TTL and the system clock.
    ///
    /// The `dialog_session` table must already exist; see the `migration`
    /// module.
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the inactivity period after which sessions expire.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replaces the clock used for timestamps and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Deletes every session idle longer than the TTL and returns how many
    /// were removed.
    ///
    /// `get` already purges expired sessions it runs into; this is a
    /// maintenance hook for hosts that want to reclaim abandoned rows.
    pub async fn delete_expired(&self) -> Result<u64> {
        let cutoff = to_db_time(self.clock.now() - self.ttl);

        let result = SessionEntity::delete_many()
            .filter(dialog_session::Column::UpdatedAt.lt(cutoff))
            .exec(&self.conn)
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;

        if result.rows_affected > 0 {
            debug!(removed = result.rows_affected, "deleted expired dialog sessions");
        }
        Ok(result.rows_affected)
    }
}

impl Debug for SeaOrmSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeaOrmSessionStore")
            .field("conn", &self.conn)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionStore for SeaOrmSessionStore {
    async fn set(&self, principal: UserId, state: DialogState, context: &ContextMap) -> Result<()> {
        // Serialize the context map using MessagePack
        let data =
            rmp_serde::to_vec(context).map_err(|e| SessionError::Encode(e.to_string()))?;

        let session_model = SessionActiveModel {
            principal_id: Set(principal.0),
            state: Set(state.as_str().to_string()),
            context: Set(data),
            updated_at: Set(to_db_time(self.clock.now())),
        };

        // Single statement, no read before the write.
        SessionEntity::insert(session_model)
            .on_conflict(
                OnConflict::column(dialog_session::Column::PrincipalId)
                    .update_columns([dialog_session::Column::State, dialog_session::Column::Context])
                    .value(dialog_session::Column::UpdatedAt, later_updated_at())
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;

        debug!(principal = principal.0, state = %state, "stored dialog session");
        Ok(())
    }

    async fn get(&self, principal: UserId) -> Result<(DialogState, ContextMap)> {
        let model = SessionEntity::find_by_id(principal.0)
            .one(&self.conn)
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?
            .ok_or(SessionError::NotFound)?;

        let cutoff = self.clock.now() - self.ttl;
        if model.updated_at.with_timezone(&Utc) < cutoff {
            // Only remove the row if nobody refreshed it since it was read
            SessionEntity::delete_many()
                .filter(dialog_session::Column::PrincipalId.eq(principal.0))
                .filter(dialog_session::Column::UpdatedAt.lt(to_db_time(cutoff)))
                .exec(&self.conn)
                .await
                .map_err(|e| SessionError::Backend(e.to_string()))?;

            warn!(principal = principal.0, state = %model.state, "dialog session expired");
            return Err(SessionError::Expired);
        }

        let state = DialogState::from_str(&model.state)
            .map_err(|_| SessionError::Decode(format!("unknown state `{}`", model.state)))?;

        // Deserialize the context map using MessagePack
        let context: ContextMap = rmp_serde::from_slice(&model.context)
            .map_err(|e| SessionError::Decode(e.to_string()))?;

        Ok((state, context))
    }

    async fn delete(&self, principal: UserId) -> Result<()> {
        SessionEntity::delete_by_id(principal.0)
            .exec(&self.conn)
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;

        Ok(())
    }
}

fn to_db_time(time: DateTime<Utc>) -> DateTimeWithTimeZone {
    time.fixed_offset()
}

/// `updated_at` on conflict: the later of the incoming and the stored value.
fn later_updated_at() -> SimpleExpr {
    let incoming = Expr::col((Alias::new("excluded"), dialog_session::Column::UpdatedAt));
    let stored = Expr::col((SessionEntity, dialog_session::Column::UpdatedAt));
    Expr::case(incoming.clone().gt(stored.clone()), incoming)
        .finally(stored)
        .into()
}
