//! Wave director and per-level continuous spawner.
//!
//! Nothing here runs until a start-wave command arrives: a match with no
//! commands stays empty.

use gauntlet_macros::profile;
use tracing::{info, warn};

use crate::game::config::SimConfig;
use crate::game::error::SimError;
use crate::game::fixed_math::FixedNum;
use crate::game::simulation::events::{EventBuffer, EventKind};
use crate::game::simulation::world::{SpawnTimer, World};
use crate::game::simulation::Tick;

use super::spawn::{ring_position, spawn_enemy};

/// Continuous spawn intervals shrink every this many ticks of level time.
pub const RATE_STEP_TICKS: u64 = 150;
/// Interval multiplier per step is `RATE_STEP_DEN / RATE_STEP_NUM` (10% faster spawning).
const RATE_STEP_NUM: i64 = 11;
const RATE_STEP_DEN: i64 = 10;
/// Beyond this many steps the interval has bottomed out at one tick anyway.
const MAX_RATE_STEPS: u64 = 64;

/// Ring slots used for continuous spawns; the stride spreads consecutive spawns apart.
const SPAWN_RING_SLOTS: u32 = 100;
const SPAWN_RING_STRIDE: u32 = 37;
const SPAWN_RING_SCHEDULE_OFFSET: u32 = 11;

/// Enemy type for slot `index` of wave `wave_number`.
pub fn enemy_type_for_wave(wave_number: u32, index: u32) -> &'static str {
    if index == 0 && wave_number % 5 == 0 {
        return "Boss";
    }
    if index == 0 && wave_number % 3 == 0 {
        return "MiniBoss";
    }
    if wave_number > 3 {
        match index % 3 {
            0 => return "FastRunner",
            1 => return "Tank",
            _ => {}
        }
    }
    "BasicGrunt"
}

pub fn wave_enemy_count(config: &SimConfig, wave_number: u32) -> u32 {
    config
        .wave_initial_enemies
        .saturating_add(wave_number.saturating_sub(1).saturating_mul(config.wave_enemy_increase))
}

/// `base_interval` shortened by 10% for every [`RATE_STEP_TICKS`] of `elapsed`, never below one tick.
pub fn scaled_interval(base_interval: u64, elapsed: Tick) -> u64 {
    let steps = (elapsed / RATE_STEP_TICKS).min(MAX_RATE_STEPS);
    let step_factor = FixedNum::from_ratio(RATE_STEP_DEN, RATE_STEP_NUM);
    let mut interval = FixedNum::from_int(base_interval.min(i32::MAX as u64) as i32);
    for _ in 0..steps {
        interval = interval * step_factor;
    }
    interval.to_int().max(1) as u64
}

/// Activate wave `wave_number` of level `level_number` and spawn its enemies on the ring.
pub fn start_wave(
    world: &mut World,
    config: &SimConfig,
    wave_number: u32,
    level_number: u32,
    events: &mut EventBuffer,
) -> Result<(), SimError> {
    let tick = world.current_tick();
    let wave_number = wave_number.max(1);
    let planned = wave_enemy_count(config, wave_number);

    world.waves.started = true;
    world.waves.current_wave = wave_number;
    world.waves.level = level_number;
    world.waves.active = true;
    world.waves.enemies_planned = planned;
    world.waves.enemies_spawned = 0;
    world.waves.next_wave_tick = None;

    info!(tick, wave_number, level_number, planned, "wave started");
    events.emit(EventKind::WaveStarted { wave_number, level_number, enemy_count: planned });

    // No more than `limits.enemies` spawns can ever succeed at once.
    let attempts = planned.min(u32::try_from(world.limits().enemies).unwrap_or(u32::MAX));
    let mut capped = attempts < planned;
    for index in 0..attempts {
        let position = ring_position(index, planned, config.wave_spawn_radius);
        let enemy_type = enemy_type_for_wave(wave_number, index);
        match spawn_enemy(world, config, enemy_type, position, FixedNum::ONE, events) {
            Ok(_) => {}
            Err(SimError::CapacityExceeded { .. }) => {
                capped = true;
                break;
            }
            Err(err) => warn!(tick, wave_number, index, %err, "wave spawn skipped"),
        }
    }
    if capped {
        warn!(tick, wave_number, planned, "enemy cap reached, remaining wave spawns skipped");
    }
    // Skipped spawns still count, so a capped wave can complete.
    world.waves.enemies_spawned = planned;

    if world.level_spawner.active_level != Some(level_number) {
        activate_level_spawner(world, config, level_number);
    }
    Ok(())
}

fn activate_level_spawner(world: &mut World, config: &SimConfig, level_number: u32) {
    let timers: Vec<SpawnTimer> = config
        .schedules_for_level(level_number)
        .map(|schedule| SpawnTimer { schedule, next_spawn_tick: None })
        .collect();
    let tick = world.current_tick();
    let spawner = &mut world.level_spawner;
    spawner.level_start_tick = tick;
    if timers.is_empty() {
        spawner.active_level = None;
        spawner.timers.clear();
        return;
    }
    info!(level_number, schedules = timers.len(), "level spawner active");
    spawner.active_level = Some(level_number);
    spawner.timers = timers;
}

#[profile]
pub fn update(world: &mut World, config: &SimConfig, events: &mut EventBuffer) {
    run_level_spawner(world, config, events);
    advance_waves(world, config, events);
}

fn run_level_spawner(world: &mut World, config: &SimConfig, events: &mut EventBuffer) {
    if world.level_spawner.active_level.is_none() {
        return;
    }
    let tick = world.current_tick();
    let elapsed = tick.saturating_sub(world.level_spawner.level_start_tick);

    for timer_index in 0..world.level_spawner.timers.len() {
        let timer = world.level_spawner.timers[timer_index].clone();
        let Some(schedule) = config.level_schedules.get(timer.schedule) else {
            continue;
        };
        if elapsed < schedule.start_tick {
            continue;
        }
        let due = timer.next_spawn_tick.unwrap_or(tick);
        if tick < due {
            continue;
        }

        let spawned_total = world.level_spawner.spawned_total;
        let slot = spawned_total
            .wrapping_mul(SPAWN_RING_STRIDE)
            .wrapping_add((timer.schedule as u32).wrapping_mul(SPAWN_RING_SCHEDULE_OFFSET))
            % SPAWN_RING_SLOTS;
        let position = ring_position(slot, SPAWN_RING_SLOTS, config.wave_spawn_radius);
        if let Err(err) = spawn_enemy(world, config, &schedule.enemy_type, position, schedule.health_multiplier, events) {
            warn!(tick, enemy_type = %schedule.enemy_type, %err, "scheduled spawn skipped");
        }

        let spawner = &mut world.level_spawner;
        spawner.spawned_total = spawner.spawned_total.wrapping_add(1);
        spawner.timers[timer_index].next_spawn_tick =
            Some(tick + scaled_interval(schedule.spawn_interval_ticks, elapsed));
    }
}

fn advance_waves(world: &mut World, config: &SimConfig, events: &mut EventBuffer) {
    if !world.waves.started {
        return;
    }
    let tick = world.current_tick();

    if world.waves.active {
        let all_spawned = world.waves.enemies_spawned >= world.waves.enemies_planned;
        if all_spawned && world.enemy_count() == 0 {
            complete_wave(world, config, events);
        }
        return;
    }

    if let Some(next_tick) = world.waves.next_wave_tick {
        if tick >= next_tick {
            let (next_wave, level) = (world.waves.current_wave.saturating_add(1), world.waves.level);
            if let Err(err) = start_wave(world, config, next_wave, level, events) {
                warn!(tick, next_wave, %err, "failed to start next wave");
            }
        }
    }
}

fn complete_wave(world: &mut World, config: &SimConfig, events: &mut EventBuffer) {
    let tick = world.current_tick();
    let (wave_number, level_number) = (world.waves.current_wave, world.waves.level);
    world.waves.active = false;
    info!(tick, wave_number, level_number, "wave completed");
    events.emit(EventKind::WaveCompleted { wave_number, level_number });

    if wave_number % config.waves_per_level.max(1) != 0 {
        world.waves.next_wave_tick = Some(tick + config.wave_delay_ticks);
        return;
    }

    world.waves.next_wave_tick = None;
    world.level_spawner.active_level = None;
    world.level_spawner.timers.clear();
    info!(tick, level_number, "level completed");
    events.emit(EventKind::LevelCompleted { level_number });

    if level_number >= config.levels && !world.game_over {
        world.game_over = true;
        info!(tick, "final level cleared, match won");
        events.emit(EventKind::GameOver { victory: true });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::simulation::world::WaveState;

    #[test]
    fn test_wave_composition() {
        assert_eq!(enemy_type_for_wave(1, 0), "BasicGrunt");
        assert_eq!(enemy_type_for_wave(3, 0), "MiniBoss");
        assert_eq!(enemy_type_for_wave(3, 1), "BasicGrunt");
        assert_eq!(enemy_type_for_wave(4, 0), "FastRunner");
        assert_eq!(enemy_type_for_wave(4, 1), "Tank");
        assert_eq!(enemy_type_for_wave(4, 2), "BasicGrunt");
        assert_eq!(enemy_type_for_wave(5, 0), "Boss");
        assert_eq!(enemy_type_for_wave(15, 0), "Boss", "Boss wins over mini-boss");
    }

    #[test]
    fn test_wave_enemy_count() {
        let config = SimConfig::default();
        assert_eq!(wave_enemy_count(&config, 1), 5);
        assert_eq!(wave_enemy_count(&config, 3), 9);
        assert_eq!(wave_enemy_count(&config, u32::MAX), u32::MAX);
    }

    #[test]
    fn test_huge_wave_stops_at_enemy_cap() {
        let config = SimConfig::default();
        let mut world = World::new(config.limits);
        let mut events = EventBuffer::new(0);

        start_wave(&mut world, &config, u32::MAX, 1, &mut events).unwrap();

        assert_eq!(world.enemy_count(), config.limits.enemies);
        assert_eq!(world.waves.enemies_planned, u32::MAX);
        assert_eq!(world.waves.enemies_spawned, u32::MAX, "Skipped spawns are credited at once");
        let spawned = events
            .into_events()
            .iter()
            .filter(|e| matches!(e.kind, EventKind::EnemySpawned { .. }))
            .count();
        assert_eq!(spawned, config.limits.enemies);
    }

    #[test]
    fn test_next_wave_number_saturates() {
        let config = SimConfig::default();
        let mut world = World::new(config.limits);
        world.waves = WaveState {
            started: true,
            current_wave: u32::MAX,
            level: 1,
            active: false,
            next_wave_tick: Some(0),
            ..Default::default()
        };
        let mut events = EventBuffer::new(0);

        advance_waves(&mut world, &config, &mut events);

        assert_eq!(world.waves.current_wave, u32::MAX);
        assert!(world.waves.active);
    }

    #[test]
    fn test_scaled_interval_shrinks_every_step() {
        assert_eq!(scaled_interval(60, 0), 60);
        assert_eq!(scaled_interval(60, 149), 60);
        // 60 * 10/11 = 54.5
        assert_eq!(scaled_interval(60, 150), 54);
        assert!(scaled_interval(60, 450) < scaled_interval(60, 300));
        assert_eq!(scaled_interval(60, u64::MAX), 1);
    }
}
