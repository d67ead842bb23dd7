//! Tick systems, run by [`Simulation::tick`](super::Simulation::tick) in a fixed order:
//!
//! 1. **command_processor**: apply the commands due this tick
//! 2. **ai**: enemy retargeting and steering
//! 3. **physics**: movement integration, arena clamping, projectile expiry
//! 4. **combat**: hero fire, projectile hits, enemy attacks, defeat check
//! 5. **waves**: wave director and per-level continuous spawning
//!
//! Systems receive the world, the locked config and an event buffer; they
//! never see the command queue or the recorder.

pub mod ai;
pub mod combat;
pub mod command_processor;
pub mod physics;
pub mod spawn;
pub mod targeting;
pub mod waves;
