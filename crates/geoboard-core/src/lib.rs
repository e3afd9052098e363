//! # Geoboard Core
//!
//! The domain layer of the location-gated bulletin board.
//! Distance math, geofence predicates and the thread lifecycle state machine
//! live here as pure functions; the services orchestrate them over the
//! repository ports without touching any infrastructure.

pub mod domain;
pub mod error;
pub mod geo;
pub mod geofence;
pub mod lifecycle;
pub mod ports;
pub mod service;

pub use error::DomainError;
