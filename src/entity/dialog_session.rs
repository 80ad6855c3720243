//! Dialog session entity model for Sea-ORM database interaction.
//!
//! This module defines the database schema representation for in-flight
//! dialogs. It maps to the `dialog_session` table.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing one principal's dialog session.
///
/// # Database Schema
///
/// | Column       | Type                  | Description                                 |
/// |--------------|-----------------------|---------------------------------------------|
/// | principal_id | BIGINT (Primary Key)  | Principal owning the dialog                 |
/// | state        | TEXT                  | Dialog state name, e.g. `ask_deadline`      |
/// | context      | BLOB / BYTEA          | MessagePack-encoded context map             |
/// | updated_at   | TIMESTAMPTZ           | Time of the last write, drives expiration   |
///
/// The primary key on `principal_id` is what guarantees at most one session
/// per principal.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dialog_session")]
pub struct Model {
    /// The principal identifier, supplied by the caller rather than generated.
    #[sea_orm(primary_key, auto_increment = false)]
    pub principal_id: i64,

    /// Snake-case name of a [`DialogState`](crate::DialogState).
    #[sea_orm(column_type = "Text")]
    pub state: String,

    /// The context map produced by [`codec::to_map`](crate::codec::to_map),
    /// serialized with MessagePack.
    pub context: Vec<u8>,

    /// Last write time. Sessions idle longer than the store TTL are expired.
    pub updated_at: DateTimeWithTimeZone,
}

/// Required enum for Sea-ORM entity relations.
///
/// Sessions reference no other table.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
