//! Match recording and playback.
//!
//! A [`Recorder`] rides along inside a [`Simulation`](crate::Simulation) and
//! captures every command a tick consumes, plus a [`StateHash`] every
//! `hash_interval` ticks. The resulting [`ReplayLog`] is replayed by
//! [`ReplayPlayer`] against a fresh session; any hash mismatch is a
//! [`Divergence`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::game::config::SimConfig;
use crate::game::simulation::commands::Command;
use crate::game::simulation::hash::{compute_state_hash, StateHash};
use crate::game::simulation::world::World;
use crate::game::simulation::Tick;

pub mod file;
pub mod player;


pub use file::{CommandRecord, HashRecord, ReplayFile, REPLAY_VERSION};
pub use player::{PlaybackSummary, ReplayPlayer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordOptions {
    pub capture_hashes: bool,
    /// Capture a hash on ticks divisible by this. Zero is treated as one.
    pub hash_interval: u64,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self { capture_hashes: true, hash_interval: 1 }
    }
}

impl RecordOptions {
    pub fn from_config(config: &SimConfig) -> Self {
        Self { capture_hashes: true, hash_interval: config.hash_interval }
    }

    pub fn without_hashes() -> Self {
        Self { capture_hashes: false, ..Self::default() }
    }
}

pub struct Recorder {
    options: RecordOptions,
    commands: Vec<Command>,
    hashes: BTreeMap<Tick, StateHash>,
}

impl Recorder {
    pub fn new(options: RecordOptions) -> Self {
        Self { options, commands: Vec::new(), hashes: BTreeMap::new() }
    }

    /// Log `command` as consumed on `tick`.
    pub fn record_command(&mut self, tick: Tick, command: &Command) {
        self.commands.push(Command { tick: Some(tick), kind: command.kind.clone() });
    }

    /// Called once the world has finished `tick`.
    pub fn capture(&mut self, tick: Tick, world: &World) {
        if !self.options.capture_hashes || tick % self.options.hash_interval.max(1) != 0 {
            return;
        }
        match compute_state_hash(world) {
            Ok(hash) => {
                self.hashes.insert(tick, hash);
            }
            Err(err) => warn!(tick, %err, "state hash capture failed"),
        }
    }

    pub fn finish(self, ticks: Tick) -> ReplayLog {
        ReplayLog { ticks, commands: self.commands, hashes: self.hashes }
    }
}

/// A recorded match: how many ticks ran, the commands each tick consumed (in
/// consumption order, every one stamped with its tick) and the reference hashes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayLog {
    pub ticks: Tick,
    pub commands: Vec<Command>,
    pub hashes: BTreeMap<Tick, StateHash>,
}

impl ReplayLog {
    pub fn expected_hash(&self, tick: Tick) -> Option<StateHash> {
        self.hashes.get(&tick).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A replayed tick whose state hash differs from the recorded one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub tick: Tick,
    pub expected: StateHash,
    pub actual: StateHash,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "replay diverged at tick {}: expected state {}, got {}",
            self.tick, self.expected, self.actual
        )
    }
}

/// What a [`ReplayPlayer`] does on a hash mismatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivergencePolicy {
    /// Stop and return [`ReplayError::Diverged`](crate::ReplayError::Diverged).
    #[default]
    Halt,
    /// Emit `DivergenceDetected` and keep playing.
    Report,
}
