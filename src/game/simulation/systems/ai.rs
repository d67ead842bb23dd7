use gauntlet_macros::profile;
use tracing::trace;

use crate::game::fixed_math::FixedVec2;
use crate::game::simulation::world::World;
use crate::profile_log;

use super::targeting::nearest_living;

/// Steer every living enemy toward its target hero, stopping once inside
/// attack range. Targets stick until the hero dies or is removed; only then
/// does the enemy pick the nearest living hero.
#[profile]
pub fn steer_enemies(world: &mut World) {
    let tick = world.current_tick();
    let mut steered = 0usize;

    for enemy_id in world.enemy_ids() {
        let Some(mut enemy) = world.enemy(enemy_id).cloned() else {
            continue;
        };
        if !enemy.alive {
            continue;
        }

        let target_valid = enemy
            .target
            .and_then(|id| world.hero(id))
            .is_some_and(|hero| hero.alive);
        if !target_valid {
            let retarget = nearest_living(world.heroes(), enemy.position);
            if retarget != enemy.target {
                trace!(tick, %enemy_id, target = ?retarget, "enemy retargeted");
            }
            enemy.target = retarget;
        }

        enemy.velocity = match enemy.target.and_then(|id| world.hero(id)) {
            Some(hero) => {
                let offset = hero.position - enemy.position;
                let range = enemy.attack_range;
                if offset.length_squared() > range * range {
                    offset.normalize() * enemy.move_speed
                } else {
                    FixedVec2::ZERO
                }
            }
            None => FixedVec2::ZERO,
        };

        if world.update_enemy(enemy_id, enemy).is_ok() {
            steered += 1;
        }
    }

    profile_log!(tick, "[AI] steered {} enemies", steered);
}
