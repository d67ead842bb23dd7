use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::game::fixed_math::{FixedNum, FixedVec2};

use super::Tick;

/// Unique entity identifier, allocated from one counter shared by every
/// category and never reused within a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything with an identity and a place on the ground plane.
pub trait SimEntity {
    fn id(&self) -> EntityId;
    fn position(&self) -> FixedVec2;
    fn is_alive(&self) -> bool;
}

/// Anything with a health pool.
pub trait Damageable {
    fn health(&self) -> FixedNum;
    fn max_health(&self) -> FixedNum;
    /// Apply damage (negative amounts are ignored); health floors at zero.
    /// Returns `true` if this hit killed the entity.
    fn take_damage(&mut self, amount: FixedNum) -> bool;
}

pub const MAX_STARS: u32 = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hero {
    pub id: EntityId,
    pub hero_type: String,
    pub position: FixedVec2,
    pub velocity: FixedVec2,
    pub health: FixedNum,
    pub max_health: FixedNum,
    pub move_speed: FixedNum,
    pub damage: FixedNum,
    /// Shots per second.
    pub attack_speed: FixedNum,
    pub shot_cooldown_ticks: u64,
    pub last_shot_tick: Option<Tick>,
    pub weapon_type: String,
    pub weapon_tier: u32,
    pub stars: u32,
    pub level: u32,
    pub current_xp: u32,
    pub xp_to_next_level: u32,
    pub alive: bool,
}

impl Hero {
    pub fn can_shoot(&self, tick: Tick) -> bool {
        self.alive
            && self
                .last_shot_tick
                .map_or(true, |last| tick.saturating_sub(last) >= self.shot_cooldown_ticks)
    }

    /// Only the archer family gains stars.
    pub fn supports_stars(&self) -> bool {
        self.hero_type == "Archer" || self.hero_type == "IceArcher"
    }

    /// One projectile per star plus the base shot.
    pub fn projectile_count(&self) -> u32 {
        self.stars.min(MAX_STARS) + 1
    }

    pub fn projectile_damage(&self) -> FixedNum {
        if self.hero_type == "Archer" && self.stars >= MAX_STARS {
            self.damage * FixedNum::from_int(2)
        } else {
            self.damage
        }
    }

    /// Add experience, carrying overflow into following levels.
    /// Each level-up multiplies the requirement by 12/10.
    /// Returns the number of levels gained.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.current_xp = self.current_xp.saturating_add(amount);
        let mut gained = 0;
        while self.xp_to_next_level > 0 && self.current_xp >= self.xp_to_next_level {
            self.current_xp -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = self.xp_to_next_level.saturating_mul(12) / 10;
            gained += 1;
        }
        gained
    }
}

impl SimEntity for Hero {
    fn id(&self) -> EntityId {
        self.id
    }
    fn position(&self) -> FixedVec2 {
        self.position
    }
    fn is_alive(&self) -> bool {
        self.alive
    }
}

impl Damageable for Hero {
    fn health(&self) -> FixedNum {
        self.health
    }
    fn max_health(&self) -> FixedNum {
        self.max_health
    }
    fn take_damage(&mut self, amount: FixedNum) -> bool {
        apply_damage(&mut self.health, &mut self.alive, amount)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Enemy {
    pub id: EntityId,
    pub enemy_type: String,
    pub position: FixedVec2,
    pub velocity: FixedVec2,
    pub health: FixedNum,
    pub max_health: FixedNum,
    pub move_speed: FixedNum,
    pub damage: FixedNum,
    pub attack_range: FixedNum,
    pub attack_cooldown_ticks: u64,
    /// Initialised to the spawn tick, so a fresh enemy waits one cooldown.
    pub last_attack_tick: Tick,
    pub target: Option<EntityId>,
    pub alive: bool,
    pub is_boss: bool,
    pub is_mini_boss: bool,
}

impl Enemy {
    pub fn can_attack(&self, tick: Tick) -> bool {
        self.alive && tick.saturating_sub(self.last_attack_tick) >= self.attack_cooldown_ticks
    }
}

impl SimEntity for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }
    fn position(&self) -> FixedVec2 {
        self.position
    }
    fn is_alive(&self) -> bool {
        self.alive
    }
}

impl Damageable for Enemy {
    fn health(&self) -> FixedNum {
        self.health
    }
    fn max_health(&self) -> FixedNum {
        self.max_health
    }
    fn take_damage(&mut self, amount: FixedNum) -> bool {
        apply_damage(&mut self.health, &mut self.alive, amount)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: EntityId,
    pub position: FixedVec2,
    /// Position at the start of the current tick; hits are swept from here.
    pub previous_position: FixedVec2,
    pub velocity: FixedVec2,
    pub damage: FixedNum,
    pub spawn_tick: Tick,
    pub lifetime_ticks: u64,
    pub piercing: bool,
    /// Enemies already struck, so a piercing shot hits each target once.
    pub struck: SmallVec<[EntityId; 4]>,
    /// Cleared when the projectile leaves the arena. It still gets that
    /// tick's hit sweep and is removed on the next movement pass.
    pub active: bool,
}

impl Projectile {
    pub fn is_expired(&self, tick: Tick) -> bool {
        tick.saturating_sub(self.spawn_tick) >= self.lifetime_ticks
    }
}

impl SimEntity for Projectile {
    fn id(&self) -> EntityId {
        self.id
    }
    fn position(&self) -> FixedVec2 {
        self.position
    }
    fn is_alive(&self) -> bool {
        self.active
    }
}

fn apply_damage(health: &mut FixedNum, alive: &mut bool, amount: FixedNum) -> bool {
    if !*alive || amount <= FixedNum::ZERO {
        return false;
    }
    *health = (*health - amount).max(FixedNum::ZERO);
    if health.is_zero() {
        *alive = false;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero(hero_type: &str) -> Hero {
        Hero {
            id: EntityId(1),
            hero_type: hero_type.to_string(),
            position: FixedVec2::ZERO,
            velocity: FixedVec2::ZERO,
            health: FixedNum::from_int(100),
            max_health: FixedNum::from_int(100),
            move_speed: FixedNum::from_int(5),
            damage: FixedNum::from_int(10),
            attack_speed: FixedNum::from_int(2),
            shot_cooldown_ticks: 15,
            last_shot_tick: None,
            weapon_type: "Pistol".to_string(),
            weapon_tier: 1,
            stars: 0,
            level: 1,
            current_xp: 0,
            xp_to_next_level: 100,
            alive: true,
        }
    }

    #[test]
    fn test_xp_overflow_carries_over() {
        let mut h = hero("Default");
        assert_eq!(h.gain_xp(250), 2);
        // 100 for level 2, 120 for level 3
        assert_eq!(h.level, 3);
        assert_eq!(h.current_xp, 30);
        assert_eq!(h.xp_to_next_level, 144);
    }

    #[test]
    fn test_shot_cooldown() {
        let mut h = hero("Default");
        assert!(h.can_shoot(0), "Fresh hero fires immediately");
        h.last_shot_tick = Some(10);
        assert!(!h.can_shoot(24));
        assert!(h.can_shoot(25));
        h.alive = false;
        assert!(!h.can_shoot(100));
    }

    #[test]
    fn test_damage_floors_at_zero_and_kills_once() {
        let mut h = hero("Default");
        assert!(!h.take_damage(FixedNum::from_int(40)));
        assert!(!h.take_damage(-FixedNum::from_int(40)), "Negative damage ignored");
        assert_eq!(h.health(), FixedNum::from_int(60));
        assert!(h.take_damage(FixedNum::from_int(500)));
        assert_eq!(h.health(), FixedNum::ZERO);
        assert!(!h.take_damage(FixedNum::ONE), "Dead entities cannot die again");
    }

    #[test]
    fn test_star_projectiles_and_archer_damage() {
        let mut archer = hero("Archer");
        assert!(archer.supports_stars());
        assert!(!hero("Tank").supports_stars());
        assert_eq!(archer.projectile_count(), 1);
        archer.stars = 3;
        assert_eq!(archer.projectile_count(), 4);
        assert_eq!(archer.projectile_damage(), FixedNum::from_int(20));

        let mut ice = hero("IceArcher");
        ice.stars = 3;
        assert_eq!(ice.projectile_damage(), FixedNum::from_int(10));
    }
}
