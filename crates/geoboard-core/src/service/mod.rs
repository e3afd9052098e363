//! Services - orchestrate the pure domain rules over the repository ports.
//!
//! Every operation takes `now` explicitly so callers (HTTP handlers, the
//! sweep job, tests) decide the clock.

mod boards;
mod lifecycle;
mod threads;

pub use boards::{BoardQuery, BoardService};
pub use lifecycle::{LifecycleService, SweepReport};
pub use threads::{
    MAX_CONTENT_CHARS, MAX_TITLE_CHARS, NewThreadInput, ThreadDetails, ThreadService, ThreadView,
};
