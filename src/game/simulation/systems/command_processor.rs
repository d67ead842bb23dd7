use tracing::debug;

use crate::game::config::SimConfig;
use crate::game::error::SimError;
use crate::game::fixed_math::FixedNum;
use crate::game::simulation::commands::{Command, CommandKind, UpgradeKind};
use crate::game::simulation::entities::{EntityId, MAX_STARS};
use crate::game::simulation::events::{EventBuffer, EventKind};
use crate::game::simulation::lookups::Lookups;
use crate::game::simulation::world::World;

use super::spawn::{cooldown_ticks, spawn_enemy, spawn_hero};
use super::waves::start_wave;

/// Upgrade tiers above this are treated as this tier.
pub const MAX_UPGRADE_TIER: u32 = 10;

/// Apply one command to the world. On error the world is left untouched.
pub fn apply_command(
    world: &mut World,
    config: &SimConfig,
    lookups: &Lookups,
    command: &Command,
    events: &mut EventBuffer,
) -> Result<(), SimError> {
    match &command.kind {
        CommandKind::SpawnHero { hero_type, position } => {
            spawn_hero(world, config, lookups, hero_type, *position, events).map(drop)
        }
        CommandKind::SpawnEnemy { enemy_type, position } => {
            spawn_enemy(world, config, enemy_type, *position, FixedNum::ONE, events).map(drop)
        }
        CommandKind::ChooseUpgrade { hero_id, upgrade, tier } => {
            apply_upgrade(world, config, *hero_id, *upgrade, *tier, events)
        }
        CommandKind::ChooseWeapon { hero_id, weapon_type } => {
            choose_weapon(world, *hero_id, weapon_type, events)
        }
        CommandKind::StartWave { wave_number, level_number } => {
            start_wave(world, config, *wave_number, *level_number, events)
        }
    }
}

fn apply_upgrade(
    world: &mut World,
    config: &SimConfig,
    hero_id: EntityId,
    upgrade: UpgradeKind,
    tier: u32,
    events: &mut EventBuffer,
) -> Result<(), SimError> {
    let mut hero = world.hero(hero_id).cloned().ok_or(SimError::UnknownEntity(hero_id))?;
    let scale = FixedNum::from_int(tier.clamp(1, MAX_UPGRADE_TIER) as i32);

    match upgrade {
        UpgradeKind::Damage => hero.damage += FixedNum::from_int(10) * scale,
        UpgradeKind::AttackSpeed => {
            hero.attack_speed += FixedNum::HALF * scale;
            hero.shot_cooldown_ticks = cooldown_ticks(config.tick_rate, hero.attack_speed)?;
        }
        UpgradeKind::MoveSpeed => hero.move_speed += FixedNum::ONE * scale,
        UpgradeKind::Health => {
            let bonus = FixedNum::from_int(30) * scale;
            hero.max_health += bonus;
            if hero.alive {
                hero.health = (hero.health + bonus).min(hero.max_health);
            }
        }
        UpgradeKind::Star => {
            if hero.supports_stars() && hero.stars < MAX_STARS {
                hero.stars += 1;
                if hero.stars == MAX_STARS {
                    hero.attack_speed = hero.attack_speed * FixedNum::from_ratio(3, 2);
                    hero.shot_cooldown_ticks = cooldown_ticks(config.tick_rate, hero.attack_speed)?;
                }
            } else {
                debug!(tick = events.tick(), %hero_id, stars = hero.stars, "star upgrade has no effect");
            }
        }
    }

    world.update_hero(hero_id, hero)?;
    events.emit(EventKind::UpgradeChosen { hero_id, upgrade, tier });
    Ok(())
}

fn choose_weapon(
    world: &mut World,
    hero_id: EntityId,
    weapon_type: &str,
    events: &mut EventBuffer,
) -> Result<(), SimError> {
    let mut hero = world.hero(hero_id).cloned().ok_or(SimError::UnknownEntity(hero_id))?;
    hero.weapon_type = weapon_type.to_string();
    hero.weapon_tier += 1;
    let weapon_tier = hero.weapon_tier;

    world.update_hero(hero_id, hero)?;
    events.emit(EventKind::WeaponChosen { hero_id, weapon_type: weapon_type.to_string(), weapon_tier });
    Ok(())
}
