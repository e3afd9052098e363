use sea_orm_migration::prelude::*;

use super::m20250401_000001_create_boards::Boards;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Threads::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Threads::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Threads::BoardId).uuid().null())
                    .col(ColumnDef::new(Threads::AuthorId).uuid().null())
                    .col(ColumnDef::new(Threads::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Threads::Content).text().not_null())
                    .col(
                        ColumnDef::new(Threads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Threads::ExpiresAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Threads::IsArchived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Threads::RestoredAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Threads::RestoreCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Threads::PostCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .check(Expr::col(Threads::RestoreCount).between(0, 1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_threads_board_id")
                            .from(Threads::Table, Threads::BoardId)
                            .to(Boards::Table, Boards::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_threads_board_id_created_at")
                    .table(Threads::Table)
                    .col(Threads::BoardId)
                    .col(Threads::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Sweep and stats scan on this pair.
        manager
            .create_index(
                Index::create()
                    .name("idx_threads_archived_expires_at")
                    .table(Threads::Table)
                    .col(Threads::IsArchived)
                    .col(Threads::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Threads::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Threads {
    Table,
    Id,
    BoardId,
    AuthorId,
    Title,
    Content,
    CreatedAt,
    ExpiresAt,
    IsArchived,
    RestoredAt,
    RestoreCount,
    PostCount,
}
