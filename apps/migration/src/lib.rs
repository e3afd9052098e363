//! Schema migrations for the board database.

pub use sea_orm_migration::prelude::*;

mod m20250401_000001_create_boards;
mod m20250401_000002_create_threads;
mod m20250401_000003_create_posts;
mod m20250401_000004_seed_tokyo_boards;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250401_000001_create_boards::Migration),
            Box::new(m20250401_000002_create_threads::Migration),
            Box::new(m20250401_000003_create_posts::Migration),
            Box::new(m20250401_000004_seed_tokyo_boards::Migration),
        ]
    }
}
