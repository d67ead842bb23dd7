//! Deterministic arena simulation core.
//!
//! Everything under this module is presentation-free: the host feeds
//! [`simulation::commands::Command`]s in, advances whole ticks, and reads back
//! [`simulation::events::SimEvent`]s plus read-only views of the world.

pub mod collections;
pub mod config;
pub mod error;
pub mod fixed_math;
pub mod replay;
pub mod runner;
pub mod simulation;
