//! The storage contract the dialog depends on.

use async_trait::async_trait;

use crate::codec::ContextMap;
use crate::error::SessionError;
use crate::state::DialogState;
use crate::types::UserId;

/// Result type returned by [`SessionStore`] operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Durable mapping from a principal to its dialog state and encoded context.
///
/// Implementations must make `set` atomic: a reader sees either the previous
/// `(state, context, updated_at)` triple or the new one, never a mix.
/// Operations on different principals are independent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates or replaces the session of `principal`, refreshing its
    /// last-updated timestamp.
    async fn set(&self, principal: UserId, state: DialogState, context: &ContextMap) -> Result<()>;

    /// Loads the session of `principal`.
    ///
    /// Returns [`SessionError::NotFound`] when there is none and
    /// [`SessionError::Expired`] when it has been idle past the TTL, in which
    /// case the session is removed before returning.
    async fn get(&self, principal: UserId) -> Result<(DialogState, ContextMap)>;

    /// Removes the session of `principal`. Removing a missing session is not
    /// an error.
    async fn delete(&self, principal: UserId) -> Result<()>;
}
