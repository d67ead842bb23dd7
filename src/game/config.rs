use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::game::fixed_math::FixedNum;

/// Static configuration loaded once before a match. These values define the
/// rules of the arena (tick rate, archetype stats, wave tuning). Changing them
/// mid-match would break determinism, so they are converted once into a
/// [`SimConfig`] and locked for the lifetime of a [`Simulation`].
///
/// Floats are allowed here because this is hand-authored RON; nothing in the
/// tick path ever reads an `InitialConfig`.
///
/// [`Simulation`]: crate::game::simulation::Simulation
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    // Timing
    pub tick_rate: u32,
    pub max_ticks_per_advance: u32,

    // Arena
    pub arena_radius: f32,
    pub max_heroes: usize,
    pub max_enemies: usize,
    pub max_projectiles: usize,

    // Projectiles
    pub projectile_speed: f32,
    pub projectile_lifetime_ticks: u64,
    pub enemy_hit_radius: f32,

    // Progression
    pub xp_reward_boss: u32,
    pub xp_reward_mini_boss: u32,
    pub xp_reward_default: u32,
    pub hero_xp_first_level: u32,

    // Waves
    pub wave_initial_enemies: u32,
    pub wave_enemy_increase: u32,
    pub wave_spawn_radius: f32,
    pub wave_delay_ticks: u64,
    pub waves_per_level: u32,
    pub levels: u32,

    // Replay
    pub hash_interval: u64,

    // Archetype tables
    pub heroes: Vec<HeroArchetypeConfig>,
    pub enemies: Vec<EnemyArchetypeConfig>,
    pub level_schedules: Vec<LevelScheduleConfig>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct HeroArchetypeConfig {
    pub hero_type: String,
    pub max_health: f32,
    pub move_speed: f32,
    pub damage: f32,
    /// Shots per second.
    pub attack_speed: f32,
    pub weapon_type: String,
    #[serde(default = "default_weapon_tier")]
    pub weapon_tier: u32,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct EnemyArchetypeConfig {
    pub enemy_type: String,
    pub max_health: f32,
    pub move_speed: f32,
    pub damage: f32,
    pub attack_range: f32,
    pub attack_cooldown_ticks: u64,
    #[serde(default)]
    pub is_boss: bool,
    #[serde(default)]
    pub is_mini_boss: bool,
}

/// Continuous spawning for one enemy type while a level is active.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct LevelScheduleConfig {
    pub level: u32,
    pub enemy_type: String,
    /// Ticks after the level starts before the first spawn.
    pub start_tick: u64,
    pub spawn_interval_ticks: u64,
    #[serde(default = "default_health_multiplier")]
    pub health_multiplier: f32,
}

fn default_weapon_tier() -> u32 {
    1
}

fn default_health_multiplier() -> f32 {
    1.0
}

impl HeroArchetypeConfig {
    fn new(hero_type: &str, max_health: f32, move_speed: f32, damage: f32, attack_speed: f32, weapon_type: &str) -> Self {
        Self {
            hero_type: hero_type.to_string(),
            max_health,
            move_speed,
            damage,
            attack_speed,
            weapon_type: weapon_type.to_string(),
            weapon_tier: 1,
        }
    }
}

impl EnemyArchetypeConfig {
    fn new(enemy_type: &str, max_health: f32, move_speed: f32, damage: f32, attack_range: f32, attack_cooldown_ticks: u64) -> Self {
        Self {
            enemy_type: enemy_type.to_string(),
            max_health,
            move_speed,
            damage,
            attack_range,
            attack_cooldown_ticks,
            is_boss: false,
            is_mini_boss: false,
        }
    }
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            max_ticks_per_advance: 8,
            arena_radius: 10.0,
            max_heroes: 10,
            max_enemies: 100,
            max_projectiles: 200,
            projectile_speed: 45.0,
            projectile_lifetime_ticks: 150,
            enemy_hit_radius: 0.5,
            xp_reward_boss: 100,
            xp_reward_mini_boss: 50,
            xp_reward_default: 10,
            hero_xp_first_level: 100,
            wave_initial_enemies: 5,
            wave_enemy_increase: 2,
            wave_spawn_radius: 10.0,
            wave_delay_ticks: 90,
            waves_per_level: 5,
            levels: 3,
            hash_interval: 1,
            heroes: vec![
                HeroArchetypeConfig::new("Default", 100.0, 5.0, 10.0, 2.0, "Pistol"),
                HeroArchetypeConfig::new("Fast", 80.0, 7.0, 8.0, 3.0, "SMG"),
                HeroArchetypeConfig::new("Tank", 150.0, 3.0, 15.0, 1.0, "Shotgun"),
                HeroArchetypeConfig::new("Archer", 90.0, 5.0, 12.0, 1.5, "Bow"),
                HeroArchetypeConfig::new("IceArcher", 90.0, 5.0, 10.0, 1.5, "IceBow"),
            ],
            enemies: vec![
                EnemyArchetypeConfig::new("BasicGrunt", 30.0, 2.0, 5.0, 0.5, 30),
                EnemyArchetypeConfig::new("FastRunner", 20.0, 4.0, 3.0, 0.5, 20),
                EnemyArchetypeConfig::new("Tank", 80.0, 1.0, 10.0, 0.5, 45),
                EnemyArchetypeConfig {
                    is_mini_boss: true,
                    ..EnemyArchetypeConfig::new("MiniBoss", 200.0, 1.5, 15.0, 1.0, 60)
                },
                EnemyArchetypeConfig {
                    is_boss: true,
                    ..EnemyArchetypeConfig::new("Boss", 500.0, 1.0, 25.0, 1.5, 90)
                },
            ],
            level_schedules: Vec::new(),
        }
    }
}

impl InitialConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(contents)
    }
}

/// Load static initial configuration synchronously before a match.
/// Falls back to [`InitialConfig::default`] when the file is missing or malformed.
pub fn load_initial_config(path: impl AsRef<Path>) -> InitialConfig {
    let path = path.as_ref();

    match std::fs::read_to_string(path) {
        Ok(contents) => match InitialConfig::from_ron_str(&contents) {
            Ok(config) => {
                info!("Loaded initial config from {}", path.display());
                config
            }
            Err(e) => {
                error!("Failed to parse initial config: {}", e);
                error!("Using default InitialConfig");
                InitialConfig::default()
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            error!("Using default InitialConfig");
            InitialConfig::default()
        }
    }
}

// ============================================================================
// Fixed-point configuration (locked per match)
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeroArchetype {
    pub hero_type: String,
    pub max_health: FixedNum,
    pub move_speed: FixedNum,
    pub damage: FixedNum,
    pub attack_speed: FixedNum,
    pub weapon_type: String,
    pub weapon_tier: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnemyArchetype {
    pub enemy_type: String,
    pub max_health: FixedNum,
    pub move_speed: FixedNum,
    pub damage: FixedNum,
    pub attack_range: FixedNum,
    pub attack_cooldown_ticks: u64,
    pub is_boss: bool,
    pub is_mini_boss: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelSchedule {
    pub level: u32,
    pub enemy_type: String,
    pub start_tick: u64,
    pub spawn_interval_ticks: u64,
    pub health_multiplier: FixedNum,
}

/// Per-category entity caps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EntityLimits {
    pub heroes: usize,
    pub enemies: usize,
    pub projectiles: usize,
}

/// Deterministic simulation parameters, derived once from [`InitialConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimConfig {
    pub tick_rate: u32,
    /// Seconds per tick, `1 / tick_rate` rounded to the nearest raw unit.
    pub fixed_delta: FixedNum,
    pub max_ticks_per_advance: u32,
    pub arena_radius: FixedNum,
    pub limits: EntityLimits,
    pub projectile_speed: FixedNum,
    pub projectile_lifetime_ticks: u64,
    pub enemy_hit_radius: FixedNum,
    pub xp_reward_boss: u32,
    pub xp_reward_mini_boss: u32,
    pub xp_reward_default: u32,
    pub hero_xp_first_level: u32,
    pub wave_initial_enemies: u32,
    pub wave_enemy_increase: u32,
    pub wave_spawn_radius: FixedNum,
    pub wave_delay_ticks: u64,
    pub waves_per_level: u32,
    pub levels: u32,
    pub hash_interval: u64,
    pub heroes: Vec<HeroArchetype>,
    pub enemies: Vec<EnemyArchetype>,
    pub level_schedules: Vec<LevelSchedule>,
}

impl SimConfig {
    /// One-time float to fixed conversion. Degenerate values (zero tick rate,
    /// zero hash interval) are raised to 1 with a warning.
    pub fn from_initial(initial: &InitialConfig) -> Self {
        let tick_rate = if initial.tick_rate == 0 {
            warn!("tick_rate of 0 is invalid, using 1");
            1
        } else {
            initial.tick_rate
        };
        let hash_interval = if initial.hash_interval == 0 {
            warn!("hash_interval of 0 is invalid, using 1");
            1
        } else {
            initial.hash_interval
        };

        Self {
            tick_rate,
            fixed_delta: FixedNum::from_ratio(1, tick_rate as i64),
            max_ticks_per_advance: initial.max_ticks_per_advance.max(1),
            arena_radius: FixedNum::from_f32(initial.arena_radius),
            limits: EntityLimits {
                heroes: initial.max_heroes,
                enemies: initial.max_enemies,
                projectiles: initial.max_projectiles,
            },
            projectile_speed: FixedNum::from_f32(initial.projectile_speed),
            projectile_lifetime_ticks: initial.projectile_lifetime_ticks,
            enemy_hit_radius: FixedNum::from_f32(initial.enemy_hit_radius),
            xp_reward_boss: initial.xp_reward_boss,
            xp_reward_mini_boss: initial.xp_reward_mini_boss,
            xp_reward_default: initial.xp_reward_default,
            hero_xp_first_level: initial.hero_xp_first_level,
            wave_initial_enemies: initial.wave_initial_enemies,
            wave_enemy_increase: initial.wave_enemy_increase,
            wave_spawn_radius: FixedNum::from_f32(initial.wave_spawn_radius),
            wave_delay_ticks: initial.wave_delay_ticks,
            waves_per_level: initial.waves_per_level.max(1),
            levels: initial.levels,
            hash_interval,
            heroes: initial
                .heroes
                .iter()
                .map(|h| HeroArchetype {
                    hero_type: h.hero_type.clone(),
                    max_health: FixedNum::from_f32(h.max_health),
                    move_speed: FixedNum::from_f32(h.move_speed),
                    damage: FixedNum::from_f32(h.damage),
                    attack_speed: FixedNum::from_f32(h.attack_speed),
                    weapon_type: h.weapon_type.clone(),
                    weapon_tier: h.weapon_tier,
                })
                .collect(),
            enemies: initial
                .enemies
                .iter()
                .map(|e| EnemyArchetype {
                    enemy_type: e.enemy_type.clone(),
                    max_health: FixedNum::from_f32(e.max_health),
                    move_speed: FixedNum::from_f32(e.move_speed),
                    damage: FixedNum::from_f32(e.damage),
                    attack_range: FixedNum::from_f32(e.attack_range),
                    attack_cooldown_ticks: e.attack_cooldown_ticks,
                    is_boss: e.is_boss,
                    is_mini_boss: e.is_mini_boss,
                })
                .collect(),
            level_schedules: initial
                .level_schedules
                .iter()
                .map(|s| LevelSchedule {
                    level: s.level,
                    enemy_type: s.enemy_type.clone(),
                    start_tick: s.start_tick,
                    spawn_interval_ticks: s.spawn_interval_ticks.max(1),
                    health_multiplier: FixedNum::from_f32(s.health_multiplier),
                })
                .collect(),
        }
    }

    pub fn hero_archetype(&self, hero_type: &str) -> Option<&HeroArchetype> {
        self.heroes.iter().find(|h| h.hero_type == hero_type)
    }

    pub fn enemy_archetype(&self, enemy_type: &str) -> Option<&EnemyArchetype> {
        self.enemies.iter().find(|e| e.enemy_type == enemy_type)
    }

    /// Schedule indices (into `level_schedules`) that belong to `level`.
    pub fn schedules_for_level(&self, level: u32) -> impl Iterator<Item = usize> + '_ {
        self.level_schedules
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.level == level)
            .map(|(index, _)| index)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_initial(&InitialConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_converted_default() {
        assert_eq!(SimConfig::default(), SimConfig::from_initial(&InitialConfig::default()));
    }

    #[test]
    fn test_conversion_is_exact_for_authored_values() {
        let config = SimConfig::default();
        assert_eq!(config.arena_radius, FixedNum::from_int(10));
        assert_eq!(config.enemy_hit_radius, FixedNum::HALF);
        assert_eq!(config.fixed_delta.raw(), 2185, "1/30 rounded to nearest raw unit");

        let boss = config.enemy_archetype("Boss").unwrap();
        assert!(boss.is_boss);
        assert_eq!(boss.attack_range, FixedNum::from_ratio(3, 2));
        assert_eq!(config.hero_archetype("Fast").unwrap().weapon_type, "SMG");
        assert!(config.hero_archetype("Nope").is_none());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = InitialConfig::from_ron_str("(tick_rate: 60, arena_radius: 25.0)").unwrap();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.arena_radius, 25.0);
        assert_eq!(config.heroes, InitialConfig::default().heroes);
    }

    #[test]
    fn test_ron_round_trip() {
        let mut initial = InitialConfig::default();
        initial.level_schedules.push(LevelScheduleConfig {
            level: 1,
            enemy_type: "BasicGrunt".to_string(),
            start_tick: 30,
            spawn_interval_ticks: 60,
            health_multiplier: 1.5,
        });
        let text = ron::ser::to_string_pretty(&initial, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(InitialConfig::from_ron_str(&text).unwrap(), initial);
    }

    #[test]
    fn test_degenerate_values_are_raised() {
        let initial = InitialConfig { tick_rate: 0, hash_interval: 0, ..Default::default() };
        let config = SimConfig::from_initial(&initial);
        assert_eq!(config.tick_rate, 1);
        assert_eq!(config.hash_interval, 1);
        assert_eq!(config.fixed_delta, FixedNum::ONE);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = load_initial_config("definitely/not/here.ron");
        assert_eq!(config, InitialConfig::default());
    }

    #[test]
    fn test_schedules_for_level() {
        let mut initial = InitialConfig::default();
        for level in [1, 2, 1] {
            initial.level_schedules.push(LevelScheduleConfig {
                level,
                enemy_type: "BasicGrunt".to_string(),
                start_tick: 0,
                spawn_interval_ticks: 10,
                health_multiplier: 1.0,
            });
        }
        let config = SimConfig::from_initial(&initial);
        assert_eq!(config.schedules_for_level(1).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(config.schedules_for_level(3).count(), 0);
    }
}
