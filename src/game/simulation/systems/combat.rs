//! Combat resolution.
//!
//! Runs after movement, in this order:
//! 1. Heroes whose cooldown elapsed fire at the nearest living enemy
//! 2. Projectiles are swept against enemies (segment vs circle)
//! 3. Enemies in range attack their target hero
//! 4. Defeat check once every spawned hero is dead

use gauntlet_macros::profile;
use tracing::{debug, info, warn};

use crate::game::config::SimConfig;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::simulation::entities::{Damageable, Enemy, EntityId, Projectile};
use crate::game::simulation::events::{EventBuffer, EventKind};
use crate::game::simulation::lookups::Lookups;
use crate::game::simulation::world::{IdList, World};
use crate::game::simulation::Tick;
use crate::profile_log;

use super::targeting::nearest_living;

/// Spread between adjacent projectiles of a multi-shot volley: π/12 (15°).
const SPREAD_DIVISOR: i64 = 12;

#[profile]
pub fn run(world: &mut World, config: &SimConfig, lookups: &Lookups, events: &mut EventBuffer) {
    let tick = world.current_tick();
    heroes_fire(world, config, lookups, events);
    resolve_projectile_hits(world, config, events);
    enemies_attack(world, events);
    check_defeat(world, events);
    profile_log!(tick, "[COMBAT] {} events so far this tick", events.len());
}

/// Angle offset of projectile `index` in a volley of `count`, centred on the aim direction.
pub fn spread_angle(index: u32, count: u32) -> FixedNum {
    let step = 2 * index as i32 - (count as i32 - 1);
    (FixedNum::PI * FixedNum::from_int(step))
        .checked_div_int(2 * SPREAD_DIVISOR)
        .unwrap_or(FixedNum::ZERO)
}

/// Swept hit test: does the segment `from..to` pass within `radius` of `center`?
pub fn segment_hits_circle(from: FixedVec2, to: FixedVec2, center: FixedVec2, radius: FixedNum) -> bool {
    let closest = center.closest_point_on_segment(from, to);
    closest.distance_squared(center) <= radius * radius
}

fn heroes_fire(world: &mut World, config: &SimConfig, lookups: &Lookups, events: &mut EventBuffer) {
    let tick = world.current_tick();

    for hero_id in world.hero_ids() {
        let Some(mut hero) = world.hero(hero_id).cloned() else {
            continue;
        };
        if !hero.can_shoot(tick) {
            continue;
        }
        let Some(target_id) = nearest_living(world.enemies(), hero.position) else {
            continue;
        };
        let Some(target) = world.enemy(target_id) else {
            continue;
        };

        let mut aim = (target.position - hero.position).normalize();
        if aim.is_zero() {
            aim = FixedVec2::X;
        }

        let count = hero.projectile_count();
        let piercing = lookups.is_piercing(&hero.weapon_type);
        let damage = hero.projectile_damage();

        let mut fired = 0;
        for index in 0..count {
            let direction = if count > 1 { aim.rotate(spread_angle(index, count)).normalize() } else { aim };
            let projectile = Projectile {
                id: EntityId(0),
                owner: hero_id,
                position: hero.position,
                previous_position: hero.position,
                velocity: direction * config.projectile_speed,
                damage,
                spawn_tick: tick,
                lifetime_ticks: config.projectile_lifetime_ticks,
                piercing,
                struck: Default::default(),
                active: true,
            };
            let velocity = projectile.velocity;
            match world.try_spawn_projectile(projectile) {
                Ok(projectile_id) => {
                    fired += 1;
                    events.emit(EventKind::ProjectileSpawned {
                        projectile_id,
                        owner_id: hero_id,
                        position: hero.position,
                        velocity,
                        piercing,
                    });
                }
                Err(err) => {
                    warn!(tick, %hero_id, %err, "volley cut short");
                    break;
                }
            }
        }

        // A volley blocked by the projectile cap is retried next tick.
        if fired == 0 {
            continue;
        }
        hero.last_shot_tick = Some(tick);
        let _ = world.update_hero(hero_id, hero);
        events.emit(EventKind::HeroShoot { hero_id, target_id, direction: aim, projectile_count: fired });
    }
}

fn resolve_projectile_hits(world: &mut World, config: &SimConfig, events: &mut EventBuffer) {
    let tick = world.current_tick();
    let mut spent = IdList::new();
    let mut killed = IdList::new();

    for projectile_id in world.projectile_ids() {
        // Inactive projectiles left the arena this tick; their last segment still counts.
        let Some(mut projectile) = world.projectile(projectile_id).cloned() else {
            continue;
        };

        let mut struck_any = false;
        for enemy_id in world.enemy_ids() {
            if projectile.struck.contains(&enemy_id) {
                continue;
            }
            let Some(mut enemy) = world.enemy(enemy_id).cloned() else {
                continue;
            };
            if !enemy.alive
                || !segment_hits_circle(
                    projectile.previous_position,
                    projectile.position,
                    enemy.position,
                    config.enemy_hit_radius,
                )
            {
                continue;
            }

            let died = enemy.take_damage(projectile.damage);
            events.emit(EventKind::EnemyDamaged {
                enemy_id,
                attacker_id: projectile.owner,
                damage: projectile.damage,
                remaining_health: enemy.health,
                position: enemy.position,
            });
            if died {
                award_kill_xp(world, config, projectile.owner, &enemy, events);
                events.emit(EventKind::EnemyKilled {
                    enemy_id,
                    killer_id: projectile.owner,
                    position: enemy.position,
                    is_boss: enemy.is_boss,
                    is_mini_boss: enemy.is_mini_boss,
                });
                debug!(tick, %enemy_id, killer = %projectile.owner, "enemy killed");
                killed.push(enemy_id);
            }
            let _ = world.update_enemy(enemy_id, enemy);

            projectile.struck.push(enemy_id);
            struck_any = true;
            if !projectile.piercing {
                break;
            }
        }

        if struck_any {
            if projectile.piercing {
                let _ = world.update_projectile(projectile_id, projectile);
            } else {
                spent.push(projectile_id);
            }
        }
    }

    for projectile_id in spent {
        if let Some(projectile) = world.remove_projectile(projectile_id) {
            events.emit(EventKind::ProjectileDestroyed {
                projectile_id,
                position: projectile.position,
                hit_target: true,
            });
        }
    }
    for enemy_id in killed {
        world.remove_enemy(enemy_id);
    }
}

fn award_kill_xp(world: &mut World, config: &SimConfig, killer: EntityId, enemy: &Enemy, events: &mut EventBuffer) {
    let Some(mut hero) = world.hero(killer).cloned() else {
        return;
    };
    let amount = if enemy.is_boss {
        config.xp_reward_boss
    } else if enemy.is_mini_boss {
        config.xp_reward_mini_boss
    } else {
        config.xp_reward_default
    };

    let levels_gained = hero.gain_xp(amount);
    let (current_xp, level) = (hero.current_xp, hero.level);
    let _ = world.update_hero(killer, hero);

    events.emit(EventKind::XpGained { hero_id: killer, amount, current_xp, level });
    if levels_gained > 0 {
        info!(tick = events.tick(), hero_id = %killer, level, "hero levelled up");
        events.emit(EventKind::HeroLevelUp { hero_id: killer, new_level: level });
    }
}

fn enemies_attack(world: &mut World, events: &mut EventBuffer) {
    let tick: Tick = world.current_tick();

    for enemy_id in world.enemy_ids() {
        let Some(mut enemy) = world.enemy(enemy_id).cloned() else {
            continue;
        };
        if !enemy.can_attack(tick) {
            continue;
        }
        let Some(hero_id) = enemy.target else {
            continue;
        };
        let Some(mut hero) = world.hero(hero_id).cloned() else {
            continue;
        };
        let range = enemy.attack_range;
        if !hero.alive || hero.position.distance_squared(enemy.position) > range * range {
            continue;
        }

        let died = hero.take_damage(enemy.damage);
        events.emit(EventKind::HeroDamaged {
            hero_id,
            attacker_id: enemy_id,
            damage: enemy.damage,
            remaining_health: hero.health,
        });
        if died {
            info!(tick, %hero_id, killer = %enemy_id, "hero killed");
            events.emit(EventKind::HeroKilled { hero_id, killer_id: enemy_id, position: hero.position });
        }
        let _ = world.update_hero(hero_id, hero);

        enemy.last_attack_tick = tick;
        let _ = world.update_enemy(enemy_id, enemy);
    }
}

fn check_defeat(world: &mut World, events: &mut EventBuffer) {
    if world.game_over || world.heroes_spawned == 0 || world.living_hero_count() > 0 {
        return;
    }
    world.game_over = true;
    info!(tick = world.current_tick(), "all heroes dead, match lost");
    events.emit(EventKind::GameOver { victory: false });
}
