//! Injection seams for game data that lives outside the simulation core.
//!
//! Both lookups are consulted only while applying commands or firing, and must
//! be pure functions of their input: a replay builds a fresh simulation with
//! the same [`Lookups`] and expects the same answers.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::game::fixed_math::FixedNum;

/// Additive stat bonuses granted to a hero type by meta progression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroLevelBonuses {
    pub level: u32,
    pub health: FixedNum,
    pub damage: FixedNum,
    pub move_speed: FixedNum,
    pub attack_speed: FixedNum,
}

pub trait HeroProgression: Send + Sync {
    /// Bonuses for `hero_type`, or `None` for no progression.
    fn level_bonuses(&self, hero_type: &str) -> Option<HeroLevelBonuses>;
}

impl<F> HeroProgression for F
where
    F: Fn(&str) -> Option<HeroLevelBonuses> + Send + Sync,
{
    fn level_bonuses(&self, hero_type: &str) -> Option<HeroLevelBonuses> {
        self(hero_type)
    }
}

pub trait WeaponCatalog: Send + Sync {
    /// `Some(piercing)` for known weapons. Names containing "ice" pierce whatever this answers.
    fn is_piercing(&self, weapon_type: &str) -> Option<bool>;
}

impl<F> WeaponCatalog for F
where
    F: Fn(&str) -> Option<bool> + Send + Sync,
{
    fn is_piercing(&self, weapon_type: &str) -> Option<bool> {
        self(weapon_type)
    }
}

/// Neutral progression: nobody gets bonuses.
pub struct NoProgression;

impl HeroProgression for NoProgression {
    fn level_bonuses(&self, _hero_type: &str) -> Option<HeroLevelBonuses> {
        None
    }
}

/// Empty catalog: piercing follows the weapon name alone.
pub struct NameBasedWeapons;

impl WeaponCatalog for NameBasedWeapons {
    fn is_piercing(&self, _weapon_type: &str) -> Option<bool> {
        None
    }
}

#[derive(Clone)]
pub struct Lookups {
    pub progression: Arc<dyn HeroProgression>,
    pub weapons: Arc<dyn WeaponCatalog>,
}

impl Default for Lookups {
    fn default() -> Self {
        Self {
            progression: Arc::new(NoProgression),
            weapons: Arc::new(NameBasedWeapons),
        }
    }
}

impl fmt::Debug for Lookups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookups").finish_non_exhaustive()
    }
}

impl Lookups {
    pub fn with_progression(mut self, progression: impl HeroProgression + 'static) -> Self {
        self.progression = Arc::new(progression);
        self
    }

    pub fn with_weapons(mut self, weapons: impl WeaponCatalog + 'static) -> Self {
        self.weapons = Arc::new(weapons);
        self
    }

    pub fn level_bonuses(&self, hero_type: &str) -> HeroLevelBonuses {
        self.progression.level_bonuses(hero_type).unwrap_or_default()
    }

    /// Any weapon whose name contains "ice" pierces; the catalog decides the rest.
    pub fn is_piercing(&self, weapon_type: &str) -> bool {
        weapon_type.to_ascii_lowercase().contains("ice") || self.weapons.is_piercing(weapon_type).unwrap_or(false)
    }
}
