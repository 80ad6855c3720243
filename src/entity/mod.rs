//! Database entity models for the dialog session store.
//!
//! This module contains the Sea-ORM entity definitions used by
//! [`SeaOrmSessionStore`](crate::SeaOrmSessionStore). They define the table
//! the store reads and writes; the matching schema is created by the
//! `migration` module.

/// Dialog session entity model for Sea-ORM database interaction.
///
/// One row per principal holding the dialog state, the encoded context and
/// the time of the last write.
pub mod dialog_session;
