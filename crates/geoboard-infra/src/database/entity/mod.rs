//! SeaORM entities for the `boards`, `threads` and `posts` tables.

pub mod board;
pub mod post;
pub mod thread;
