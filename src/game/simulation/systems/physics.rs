//! Movement integration.
//!
//! This module handles:
//! - Velocity integration (`position += velocity * fixed_delta`)
//! - Arena bounds for heroes and enemies
//! - Projectile expiry by lifetime or leaving the arena (one tick late, so the
//!   final segment is still swept for hits)

use gauntlet_macros::profile;
use tracing::trace;

use crate::game::config::SimConfig;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::simulation::events::{EventBuffer, EventKind};
use crate::game::simulation::world::{IdList, World};
use crate::profile_log;

/// Pull `position` back onto the arena circle if it left it.
/// Returns `true` when clamping happened.
fn clamp_to_arena(position: &mut FixedVec2, radius: FixedNum) -> bool {
    if position.length_squared() > radius * radius {
        *position = position.normalize() * radius;
        return true;
    }
    false
}

#[profile]
pub fn integrate(world: &mut World, config: &SimConfig, events: &mut EventBuffer) {
    let tick = world.current_tick();
    let dt = config.fixed_delta;

    // Heroes hold position unless something sets their velocity; no command
    // does yet, so this pass is idle until hero movement input exists.
    for hero_id in world.hero_ids() {
        let Some(mut hero) = world.hero(hero_id).cloned() else {
            continue;
        };
        if !hero.alive || hero.velocity.is_zero() {
            continue;
        }
        hero.position += hero.velocity * dt;
        if clamp_to_arena(&mut hero.position, config.arena_radius) {
            hero.velocity = FixedVec2::ZERO;
        }
        let _ = world.update_hero(hero_id, hero);
    }

    for enemy_id in world.enemy_ids() {
        let Some(mut enemy) = world.enemy(enemy_id).cloned() else {
            continue;
        };
        if !enemy.alive || enemy.velocity.is_zero() {
            continue;
        }
        enemy.position += enemy.velocity * dt;
        clamp_to_arena(&mut enemy.position, config.arena_radius);
        let _ = world.update_enemy(enemy_id, enemy);
    }

    let mut expired = IdList::new();
    for projectile_id in world.projectile_ids() {
        let Some(mut projectile) = world.projectile(projectile_id).cloned() else {
            continue;
        };
        if !projectile.active || projectile.is_expired(tick) {
            expired.push(projectile_id);
            continue;
        }
        projectile.previous_position = projectile.position;
        projectile.position += projectile.velocity * dt;
        let radius = config.arena_radius;
        if projectile.position.length_squared() > radius * radius {
            projectile.active = false;
        }
        let _ = world.update_projectile(projectile_id, projectile);
    }

    for projectile_id in expired.iter().copied() {
        if let Some(projectile) = world.remove_projectile(projectile_id) {
            trace!(tick, %projectile_id, "projectile expired");
            events.emit(EventKind::ProjectileDestroyed {
                projectile_id,
                position: projectile.position,
                hit_target: false,
            });
        }
    }

    profile_log!(tick, "[PHYSICS] {} projectiles, {} expired", world.projectile_count(), expired.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::simulation::entities::{EntityId, Projectile};

    fn projectile(position: FixedVec2, velocity: FixedVec2, spawn_tick: u64) -> Projectile {
        Projectile {
            id: EntityId(0),
            owner: EntityId(0),
            position,
            previous_position: position,
            velocity,
            damage: FixedNum::ONE,
            spawn_tick,
            lifetime_ticks: 150,
            piercing: false,
            struck: Default::default(),
            active: true,
        }
    }

    #[test]
    fn test_clamp_to_arena() {
        let radius = FixedNum::from_int(10);
        let mut inside = FixedVec2::from_int(3, 4);
        assert!(!clamp_to_arena(&mut inside, radius));
        assert_eq!(inside, FixedVec2::from_int(3, 4));

        let mut outside = FixedVec2::from_int(30, 40);
        assert!(clamp_to_arena(&mut outside, radius));
        assert!((outside.length() - radius).abs().raw() <= 64);
        assert!(outside.x > FixedNum::ZERO && outside.y > outside.x, "Direction is preserved");
    }

    #[test]
    fn test_moving_hero_stops_at_arena_edge() {
        use crate::game::simulation::lookups::Lookups;
        use crate::game::simulation::systems::spawn::spawn_hero;

        let config = SimConfig::default();
        let mut world = World::new(config.limits);
        let mut events = EventBuffer::new(0);
        let id = spawn_hero(&mut world, &config, &Lookups::default(), "Default", FixedVec2::ZERO, &mut events).unwrap();
        let still = world.hero(id).cloned().unwrap();

        integrate(&mut world, &config, &mut events);
        assert_eq!(world.hero(id).unwrap().position, FixedVec2::ZERO, "Spawned heroes stand still");

        let mut runner = still;
        runner.velocity = FixedVec2::from_int(6000, 0);
        world.update_hero(id, runner).unwrap();
        integrate(&mut world, &config, &mut events);

        let clamped = world.hero(id).unwrap();
        assert!((clamped.position.length() - config.arena_radius).abs().raw() <= 64);
        assert!(clamped.velocity.is_zero(), "Hitting the edge stops the hero");
    }

    #[test]
    fn test_projectile_moves_and_records_previous_position() {
        let config = SimConfig::default();
        let mut world = World::new(config.limits);
        let id = world
            .try_spawn_projectile(projectile(FixedVec2::ZERO, FixedVec2::from_int(30, 0), 0))
            .unwrap();
        let mut events = EventBuffer::new(0);

        integrate(&mut world, &config, &mut events);

        let moved = world.projectile(id).unwrap();
        assert_eq!(moved.previous_position, FixedVec2::ZERO);
        assert_eq!(moved.position, FixedVec2::from_int(30, 0) * config.fixed_delta);
        assert!(events.is_empty());
    }

    #[test]
    fn test_projectile_leaving_arena_is_destroyed() {
        let config = SimConfig::default();
        let mut world = World::new(config.limits);
        let start = FixedVec2::new(FixedNum::from_int(10) - FixedNum::EPSILON, FixedNum::ZERO);
        let id = world
            .try_spawn_projectile(projectile(start, FixedVec2::from_int(45, 0), 0))
            .unwrap();
        let mut events = EventBuffer::new(0);

        integrate(&mut world, &config, &mut events);
        let outside = world.projectile(id).unwrap();
        assert!(!outside.active, "Leaving the arena deactivates first");
        assert!(events.is_empty());

        world.advance_tick();
        let mut events = EventBuffer::new(1);
        integrate(&mut world, &config, &mut events);

        assert!(world.projectile(id).is_none());
        let events = events.into_events();
        assert!(matches!(events[0].kind, EventKind::ProjectileDestroyed { hit_target: false, .. }));
    }

    #[test]
    fn test_projectile_expires_after_lifetime() {
        let config = SimConfig::default();
        let mut world = World::new(config.limits);
        // Zero lifetime expires on the first integration
        let mut stale = projectile(FixedVec2::ZERO, FixedVec2::ZERO, 0);
        stale.lifetime_ticks = 0;
        let id = world.try_spawn_projectile(stale).unwrap();
        let mut events = EventBuffer::new(0);

        integrate(&mut world, &config, &mut events);

        assert!(world.projectile(id).is_none());
        assert_eq!(events.len(), 1);
    }
}
