//! Schema migrations for the dialog session table.
//!
//! ```no_run
//! use event_dialog_store::migration::{Migrator, MigratorTrait};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = Database::connect("sqlite://sessions.db?mode=rwc").await?;
//! Migrator::up(&conn, None).await?;
//! # Ok(())
//! # }
//! ```

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_dialog_session_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Own bookkeeping table so the host application's migrations are unaffected
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("event_dialog_store_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(
            m20240101_000001_create_dialog_session_table::Migration,
        )]
    }
}
