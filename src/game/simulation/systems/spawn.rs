//! Construction of heroes and enemies from archetype tables.

use tracing::debug;

use crate::game::config::SimConfig;
use crate::game::error::SimError;
use crate::game::fixed_math::{cos, sin, FixedNum, FixedVec2};
use crate::game::simulation::entities::{Enemy, EntityId, Hero};
use crate::game::simulation::events::{EventBuffer, EventKind};
use crate::game::simulation::lookups::Lookups;
use crate::game::simulation::world::World;

/// Whole ticks between shots at `attacks_per_second`, floored.
pub fn cooldown_ticks(tick_rate: u32, attacks_per_second: FixedNum) -> Result<u64, SimError> {
    let ticks = FixedNum::from_int(tick_rate as i32).try_div(attacks_per_second)?;
    Ok(ticks.to_int().max(0) as u64)
}

/// Point `index` of `count` evenly spaced around a circle of `radius`.
pub fn ring_position(index: u32, count: u32, radius: FixedNum) -> FixedVec2 {
    let count = count.max(1) as i64;
    let angle = (FixedNum::TAU * FixedNum::from_int((index as i64 % count) as i32))
        .checked_div_int(count)
        .unwrap_or(FixedNum::ZERO);
    FixedVec2::new(cos(angle) * radius, sin(angle) * radius)
}

pub fn spawn_hero(
    world: &mut World,
    config: &SimConfig,
    lookups: &Lookups,
    hero_type: &str,
    position: FixedVec2,
    events: &mut EventBuffer,
) -> Result<EntityId, SimError> {
    let archetype = config
        .hero_archetype(hero_type)
        .ok_or_else(|| SimError::UnknownArchetype(hero_type.to_string()))?;
    let bonuses = lookups.level_bonuses(hero_type);

    let max_health = archetype.max_health + bonuses.health;
    let attack_speed = archetype.attack_speed + bonuses.attack_speed;
    let hero = Hero {
        id: EntityId(0),
        hero_type: hero_type.to_string(),
        position,
        velocity: FixedVec2::ZERO,
        health: max_health,
        max_health,
        move_speed: archetype.move_speed + bonuses.move_speed,
        damage: archetype.damage + bonuses.damage,
        attack_speed,
        shot_cooldown_ticks: cooldown_ticks(config.tick_rate, attack_speed)?,
        last_shot_tick: None,
        weapon_type: archetype.weapon_type.clone(),
        weapon_tier: archetype.weapon_tier,
        stars: 0,
        level: 1,
        current_xp: 0,
        xp_to_next_level: config.hero_xp_first_level,
        alive: true,
    };

    let hero_id = world.try_spawn_hero(hero)?;
    let Some(hero) = world.hero(hero_id) else {
        return Err(SimError::UnknownEntity(hero_id));
    };
    debug!(tick = events.tick(), %hero_id, hero_type, "hero spawned");
    events.emit(EventKind::HeroSpawned {
        hero_id,
        hero_type: hero.hero_type.clone(),
        position: hero.position,
        max_health: hero.max_health,
        move_speed: hero.move_speed,
        damage: hero.damage,
        attack_speed: hero.attack_speed,
        weapon_type: hero.weapon_type.clone(),
    });
    Ok(hero_id)
}

/// Spawn an enemy, scaling its health pool by `health_multiplier`.
pub fn spawn_enemy(
    world: &mut World,
    config: &SimConfig,
    enemy_type: &str,
    position: FixedVec2,
    health_multiplier: FixedNum,
    events: &mut EventBuffer,
) -> Result<EntityId, SimError> {
    let archetype = config
        .enemy_archetype(enemy_type)
        .ok_or_else(|| SimError::UnknownArchetype(enemy_type.to_string()))?;

    let max_health = archetype.max_health * health_multiplier;
    let enemy = Enemy {
        id: EntityId(0),
        enemy_type: enemy_type.to_string(),
        position,
        velocity: FixedVec2::ZERO,
        health: max_health,
        max_health,
        move_speed: archetype.move_speed,
        damage: archetype.damage,
        attack_range: archetype.attack_range,
        attack_cooldown_ticks: archetype.attack_cooldown_ticks,
        last_attack_tick: world.current_tick(),
        target: None,
        alive: true,
        is_boss: archetype.is_boss,
        is_mini_boss: archetype.is_mini_boss,
    };

    let enemy_id = world.try_spawn_enemy(enemy)?;
    debug!(tick = events.tick(), %enemy_id, enemy_type, "enemy spawned");
    events.emit(EventKind::EnemySpawned {
        enemy_id,
        enemy_type: enemy_type.to_string(),
        position,
        max_health,
        is_boss: archetype.is_boss,
        is_mini_boss: archetype.is_mini_boss,
    });
    Ok(enemy_id)
}
