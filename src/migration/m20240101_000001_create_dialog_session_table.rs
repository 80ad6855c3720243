use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DialogSession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DialogSession::PrincipalId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DialogSession::State).text().not_null())
                    .col(ColumnDef::new(DialogSession::Context).blob().not_null())
                    .col(
                        ColumnDef::new(DialogSession::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_dialog_session_updated_at")
                    .table(DialogSession::Table)
                    .col(DialogSession::UpdatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DialogSession::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DialogSession {
    Table,
    PrincipalId,
    State,
    Context,
    UpdatedAt,
}
