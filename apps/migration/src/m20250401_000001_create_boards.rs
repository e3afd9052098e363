use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Boards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Boards::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Boards::Name).string().not_null())
                    .col(ColumnDef::new(Boards::Category).string_len(16).not_null())
                    .col(ColumnDef::new(Boards::Latitude).double().not_null())
                    .col(ColumnDef::new(Boards::Longitude).double().not_null())
                    .col(ColumnDef::new(Boards::AccessRadiusM).double().not_null())
                    .col(ColumnDef::new(Boards::ViewRadiusM).double().not_null())
                    .col(
                        ColumnDef::new(Boards::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Boards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Boards::AccessRadiusM).gt(0))
                    .check(Expr::col(Boards::ViewRadiusM).gte(Expr::col(Boards::AccessRadiusM)))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Boards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Boards {
    Table,
    Id,
    Name,
    Category,
    Latitude,
    Longitude,
    AccessRadiusM,
    ViewRadiusM,
    Description,
    CreatedAt,
}
