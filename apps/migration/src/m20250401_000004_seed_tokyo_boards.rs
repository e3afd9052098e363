use geoboard_infra::SEED_BOARDS;
use sea_orm_migration::prelude::*;

use super::m20250401_000001_create_boards::Boards;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert.into_table(Boards::Table).columns([
            Boards::Id,
            Boards::Name,
            Boards::Category,
            Boards::Latitude,
            Boards::Longitude,
            Boards::AccessRadiusM,
            Boards::ViewRadiusM,
            Boards::Description,
        ]);

        for seed in SEED_BOARDS {
            let row: [SimpleExpr; 8] = [
                Func::cust(Alias::new("gen_random_uuid")).into(),
                seed.name.into(),
                seed.category.as_str().into(),
                seed.lat.into(),
                seed.lng.into(),
                seed.access_radius_m.into(),
                seed.view_radius_m.into(),
                seed.description.into(),
            ];
            insert.values_panic(row);
        }

        manager.exec_stmt(insert.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let names: Vec<&str> = SEED_BOARDS.iter().map(|seed| seed.name).collect();
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Boards::Table)
                    .and_where(Expr::col(Boards::Name).is_in(names))
                    .to_owned(),
            )
            .await
    }
}
