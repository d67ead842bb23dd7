//! Simulation layer - deterministic game logic.
//!
//! This module is organized into:
//! - **entities**: Hero, enemy and projectile records plus capability traits
//! - **world**: The insertion-ordered entity store and director state
//! - **commands**: Player/director intents and the pending-command queue
//! - **events**: Per-tick event batches and the observer funnel
//! - **lookups**: Injected hero progression and weapon data
//! - **systems**: The fixed-order tick pipeline
//! - **hash**: Portable world digest used by replays
//!
//! [`Simulation`] ties them together: it owns one world, one queue and an
//! optional replay recorder, and is the only thing that mutates the world.

use gauntlet_macros::profile;
use tracing::{debug, trace, warn};

use crate::game::config::SimConfig;
use crate::game::error::SimError;
use crate::game::replay::{RecordOptions, Recorder, ReplayLog};

pub mod commands;
pub mod entities;
pub mod events;
pub mod hash;
pub mod lookups;
pub mod systems;
pub mod world;

#[cfg(test)]
mod tests;

pub use commands::{Command, CommandKind, CommandQueue, UpgradeKind};
pub use entities::{Damageable, Enemy, EntityId, Hero, Projectile, SimEntity};
pub use events::{EventBuffer, EventFunnel, EventKind, SimEvent};
pub use hash::{compute_state_hash, StateHash};
pub use lookups::{HeroLevelBonuses, HeroProgression, Lookups, WeaponCatalog};
pub use world::World;

/// Simulation time, in whole ticks since the start of the match.
pub type Tick = u64;

/// One match's worth of deterministic simulation.
///
/// Hosts enqueue [`Command`]s, call [`Simulation::tick`] and read back events
/// plus a shared view of the [`World`]. Given the same config, lookups and
/// command stream, two sessions produce identical events and state hashes.
pub struct Simulation {
    config: SimConfig,
    lookups: Lookups,
    world: World,
    queue: CommandQueue,
    recorder: Option<Recorder>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self::with_lookups(config, Lookups::default())
    }

    pub fn with_lookups(config: SimConfig, lookups: Lookups) -> Self {
        let world = World::new(config.limits);
        Self {
            config,
            lookups,
            world,
            queue: CommandQueue::new(),
            recorder: None,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn current_tick(&self) -> Tick {
        self.world.current_tick()
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// Queue a command. Unscheduled commands are stamped with the current
    /// tick; commands scheduled in the past are rejected without touching
    /// any state. Returns the tick the command will apply on.
    pub fn enqueue(&mut self, mut command: Command) -> Result<Tick, SimError> {
        let current = self.current_tick();
        let scheduled = *command.tick.get_or_insert(current);
        if scheduled < current {
            warn!(scheduled, current, command = command.kind.name(), "rejecting stale command");
            return Err(SimError::StaleCommand { scheduled, current });
        }
        self.queue.push(command);
        Ok(scheduled)
    }

    /// Replay injection: a command recorded for a tick that has already
    /// passed is restamped to the current tick instead of being rejected.
    pub(crate) fn inject_replayed(&mut self, mut command: Command) {
        let current = self.current_tick();
        match command.tick {
            Some(scheduled) if scheduled < current => {
                debug!(scheduled, current, command = command.kind.name(), "catching up late replay command");
                command.tick = Some(current);
            }
            None => command.tick = Some(current),
            Some(_) => {}
        }
        self.queue.push(command);
    }

    /// Enqueue `commands` (logging any that are rejected) and run one tick.
    pub fn tick_with(&mut self, commands: impl IntoIterator<Item = Command>) -> Vec<SimEvent> {
        for command in commands {
            // Rejection is already logged by enqueue.
            let _ = self.enqueue(command);
        }
        self.tick()
    }

    /// Advance the simulation by exactly one tick and return its events.
    ///
    /// Order: due commands (in enqueue order), enemy AI, movement, combat,
    /// waves. The hash for this tick, when recording, is taken afterwards.
    #[profile(16)]
    pub fn tick(&mut self) -> Vec<SimEvent> {
        let tick = self.current_tick();
        let mut events = EventBuffer::new(tick);

        for command in self.queue.drain_due(tick) {
            if let Some(recorder) = self.recorder.as_mut() {
                recorder.record_command(tick, &command);
            }
            if let Err(err) =
                systems::command_processor::apply_command(&mut self.world, &self.config, &self.lookups, &command, &mut events)
            {
                warn!(tick, command = command.kind.name(), %err, "command dropped");
            }
        }

        systems::ai::steer_enemies(&mut self.world);
        systems::physics::integrate(&mut self.world, &self.config, &mut events);
        systems::combat::run(&mut self.world, &self.config, &self.lookups, &mut events);
        systems::waves::update(&mut self.world, &self.config, &mut events);

        self.world.advance_tick();

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.capture(tick, &self.world);
        }

        trace!(
            tick,
            events = events.len(),
            heroes = self.world.hero_count(),
            enemies = self.world.enemy_count(),
            projectiles = self.world.projectile_count(),
            "tick complete"
        );
        events.into_events()
    }

    pub fn state_hash(&self) -> Result<StateHash, SimError> {
        Ok(compute_state_hash(&self.world)?)
    }

    /// Start capturing consumed commands (and hashes, per `options`).
    /// A log is only replayable from a fresh session, so recording should
    /// begin at tick 0.
    pub fn start_recording(&mut self, options: RecordOptions) {
        if self.current_tick() != 0 {
            warn!(tick = self.current_tick(), "recording started mid-match; the log will not replay from a fresh session");
        }
        self.recorder = Some(Recorder::new(options));
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Finish recording and return the log covering every tick run so far.
    pub fn stop_recording(&mut self) -> Option<ReplayLog> {
        let ticks = self.current_tick();
        self.recorder.take().map(|recorder| recorder.finish(ticks))
    }

    /// Discard all state and return to tick 0 with the same config and lookups.
    pub fn reset(&mut self) {
        self.world = World::new(self.config.limits);
        self.queue.clear();
        self.recorder = None;
    }
}
