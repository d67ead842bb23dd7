use thiserror::Error;

use crate::game::replay::Divergence;
use crate::game::simulation::entities::EntityId;
use crate::game::simulation::Tick;

/// Failures of the fixed-point arithmetic layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("fixed-point division by zero")]
    DivisionByZero,
    #[error("square root of a negative fixed-point value")]
    NegativeSqrt,
}

/// Failures raised while mutating the world. Inside a tick these are logged
/// and the offending command skipped; they never abort the tick.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("command scheduled for tick {scheduled} but simulation is already at tick {current}")]
    StaleCommand { scheduled: Tick, current: Tick },
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    #[error("unknown archetype '{0}'")]
    UnknownArchetype(String),
    #[error("{category} capacity of {limit} reached")]
    CapacityExceeded { category: &'static str, limit: usize },
    #[error(transparent)]
    Math(#[from] MathError),
    #[error("failed to serialize world state: {0}")]
    StateEncoding(#[from] bincode::Error),
}

/// Failures while loading, validating or playing back a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed replay document: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to write replay document: {0}")]
    Format(#[from] ron::Error),
    #[error("malformed replay archive: {0}")]
    Binary(#[from] bincode::Error),
    #[error("unsupported replay version {0}")]
    UnsupportedVersion(u32),
    #[error("command #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },
    #[error("command #{index} has invalid {field} '{value}'")]
    InvalidField { index: usize, field: &'static str, value: String },
    #[error("unknown command type '{0}'")]
    UnknownCommandType(String),
    #[error("command #{index} is scheduled before the command preceding it")]
    OutOfOrder { index: usize },
    #[error("command #{index} is scheduled for tick {tick} but the replay only covers {ticks} ticks")]
    CommandBeyondEnd { index: usize, tick: Tick, ticks: Tick },
    #[error("hash record #{index} is not in strictly increasing tick order")]
    HashOutOfOrder { index: usize },
    #[error("simulation error during playback: {0}")]
    Sim(#[from] SimError),
    #[error("{0}")]
    Diverged(Divergence),
}
