//! Repositories: PostgreSQL via SeaORM, plus an in-memory store used when no
//! database is configured.

mod memory;
mod seed;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use memory::InMemoryStore;
pub use seed::{SEED_BOARDS, SeedBoard, seed_boards};

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, DatabaseConnections};

#[cfg(feature = "postgres")]
pub use postgres_repo::{PostgresBoardRepository, PostgresPostRepository, PostgresThreadRepository};
