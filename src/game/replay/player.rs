use tracing::{error, info};

use crate::game::config::SimConfig;
use crate::game::error::ReplayError;
use crate::game::simulation::events::{EventKind, SimEvent};
use crate::game::simulation::hash::StateHash;
use crate::game::simulation::lookups::Lookups;
use crate::game::simulation::{Simulation, Tick};

use super::{Divergence, DivergencePolicy, ReplayLog};

/// Totals for a finished playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub ticks: Tick,
    pub commands: usize,
    pub events: usize,
    pub divergences: usize,
    pub final_hash: StateHash,
}

/// Drives a fresh [`Simulation`] through a [`ReplayLog`].
///
/// Each step injects every logged command scheduled at or before the current
/// tick, runs the tick and, when the log holds a hash for it, compares.
pub struct ReplayPlayer {
    simulation: Simulation,
    log: ReplayLog,
    next_command: usize,
    policy: DivergencePolicy,
    divergences: Vec<Divergence>,
}

impl ReplayPlayer {
    pub fn new(config: SimConfig, lookups: Lookups, log: ReplayLog) -> Self {
        Self {
            simulation: Simulation::with_lookups(config, lookups),
            log,
            next_command: 0,
            policy: DivergencePolicy::default(),
            divergences: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: DivergencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn log(&self) -> &ReplayLog {
        &self.log
    }

    pub fn divergences(&self) -> &[Divergence] {
        &self.divergences
    }

    pub fn is_finished(&self) -> bool {
        self.simulation.current_tick() >= self.log.ticks
    }

    /// Run one tick. Under [`DivergencePolicy::Halt`] a hash mismatch is
    /// returned as [`ReplayError::Diverged`]; under `Report` the tick's
    /// events gain a trailing `DivergenceDetected`.
    pub fn step(&mut self) -> Result<Vec<SimEvent>, ReplayError> {
        let tick = self.simulation.current_tick();
        while let Some(command) = self.log.commands.get(self.next_command) {
            if command.tick.is_some_and(|scheduled| scheduled > tick) {
                break;
            }
            self.simulation.inject_replayed(command.clone());
            self.next_command += 1;
        }

        let mut events = self.simulation.tick();

        if let Some(expected) = self.log.expected_hash(tick) {
            let actual = self.simulation.state_hash()?;
            if actual != expected {
                let divergence = Divergence { tick, expected, actual };
                error!(%divergence, policy = ?self.policy, "replay divergence");
                self.divergences.push(divergence);
                if self.policy == DivergencePolicy::Halt {
                    return Err(ReplayError::Diverged(divergence));
                }
                events.push(SimEvent { tick, kind: EventKind::DivergenceDetected { tick, expected, actual } });
            }
        }
        Ok(events)
    }

    pub fn run_to_end(&mut self) -> Result<PlaybackSummary, ReplayError> {
        self.run_with(|_| {})
    }

    /// Play every remaining tick, handing each batch to `on_tick`.
    pub fn run_with(&mut self, mut on_tick: impl FnMut(&[SimEvent])) -> Result<PlaybackSummary, ReplayError> {
        let mut events = 0;
        while !self.is_finished() {
            let batch = self.step()?;
            events += batch.len();
            on_tick(&batch);
        }

        let summary = PlaybackSummary {
            ticks: self.simulation.current_tick(),
            commands: self.next_command,
            events,
            divergences: self.divergences.len(),
            final_hash: self.simulation.state_hash()?,
        };
        info!(
            ticks = summary.ticks,
            commands = summary.commands,
            events = summary.events,
            divergences = summary.divergences,
            final_hash = %summary.final_hash,
            "replay finished"
        );
        Ok(summary)
    }

    pub fn into_simulation(self) -> Simulation {
        self.simulation
    }
}
