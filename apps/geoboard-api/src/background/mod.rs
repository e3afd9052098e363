//! In-process background work.

pub mod scheduler;

pub use scheduler::{Scheduler, SchedulerConfig};
