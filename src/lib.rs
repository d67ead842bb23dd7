pub mod game;

pub use game::{
    config::{InitialConfig, SimConfig},
    error::{MathError, ReplayError, SimError},
    fixed_math::{FixedNum, FixedVec2, FixedVec3},
    replay::{DivergencePolicy, ReplayLog, ReplayPlayer},
    runner::MatchRunner,
    simulation::{
        commands::{Command, CommandKind, UpgradeKind},
        events::{EventFunnel, EventKind, SimEvent},
        Simulation, StateHash, Tick,
    },
};

// ============================================================================
// Profiling Macros
// ============================================================================

/// Conditionally log messages based on tick interval when perf_stats feature is enabled.
///
/// This macro logs a message every 100 ticks. When the perf_stats feature is disabled,
/// this macro compiles to nothing - zero runtime cost.
///
/// # Example
/// ```ignore
/// profile_log!(world.current_tick(), "Steered {} enemies", world.enemy_count());
/// ```
///
/// # Zero-Cost Abstraction
/// When compiled without the `perf_stats` feature, this expands to an empty block.
/// Even the arguments (e.g., `world.enemy_count()`) are not evaluated.
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick % 100 == 0 {
            ::tracing::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
