//! Relay controller tying discovery, playlist state and scheduling together.
//!
//! One `RelayController` drives one stream. It is constructed explicitly
//! and cloned into whatever needs it (HTTP handlers, the ticker task), so
//! several independent streams can coexist in one process.

pub mod controller;
pub mod outcomes;

pub use controller::RelayController;
pub use outcomes::{RelayStatus, StartOutcome, StopOutcome, TickOutcome};
