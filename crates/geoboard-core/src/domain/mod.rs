//! Domain entities - the core business objects.

mod board;
mod post;
mod thread;

pub use board::{Board, BoardCategory, NewBoard};
pub use post::Post;
pub use thread::Thread;
