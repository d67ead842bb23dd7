//! Fixed-timestep driver for a [`Simulation`].
//!
//! Hosts feed wall-clock deltas into [`MatchRunner::advance`]; the runner
//! converts them to whole ticks at the configured rate and hands each tick's
//! events to its [`EventFunnel`]. Time is accumulated in integer nanoseconds
//! so the tick count never depends on float rounding.

use std::time::Duration;

use tracing::warn;

use crate::game::error::SimError;
use crate::game::simulation::commands::Command;
use crate::game::simulation::events::{EventFunnel, SimEvent};
use crate::game::simulation::{Simulation, Tick};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

pub struct MatchRunner {
    simulation: Simulation,
    funnel: EventFunnel,
    accumulator_nanos: u128,
    tick_nanos: u128,
    max_ticks_per_advance: u32,
}

impl MatchRunner {
    pub fn new(simulation: Simulation) -> Self {
        let config = simulation.config();
        let tick_nanos = NANOS_PER_SECOND / u128::from(config.tick_rate.max(1));
        let max_ticks_per_advance = config.max_ticks_per_advance.max(1);
        Self {
            simulation,
            funnel: EventFunnel::new(),
            accumulator_nanos: 0,
            tick_nanos,
            max_ticks_per_advance,
        }
    }

    pub fn funnel_mut(&mut self) -> &mut EventFunnel {
        &mut self.funnel
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    /// Queue a command for the current tick unless it already carries one.
    pub fn queue(&mut self, command: Command) -> Result<Tick, SimError> {
        self.simulation.enqueue(command)
    }

    /// Accumulate `elapsed` and run every whole tick it covers, up to
    /// `max_ticks_per_advance`. Backlog beyond the cap is discarded.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator_nanos = self.accumulator_nanos.saturating_add(elapsed.as_nanos());

        let mut ran = 0;
        while self.accumulator_nanos >= self.tick_nanos && ran < self.max_ticks_per_advance {
            self.accumulator_nanos -= self.tick_nanos;
            self.step();
            ran += 1;
        }

        if self.accumulator_nanos >= self.tick_nanos {
            let dropped = self.accumulator_nanos / self.tick_nanos;
            warn!(
                tick = self.simulation.current_tick(),
                dropped_ticks = dropped as u64,
                "simulation falling behind, dropping backlog"
            );
            self.accumulator_nanos %= self.tick_nanos;
        }
        ran
    }

    /// Run exactly one tick regardless of accumulated time.
    pub fn step(&mut self) -> Vec<SimEvent> {
        let events = self.simulation.tick();
        self.funnel.dispatch(&events);
        events
    }

    pub fn into_simulation(self) -> Simulation {
        self.simulation
    }
}
