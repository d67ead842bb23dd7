//! The authoritative simulation state.
//!
//! One `OrderedStore` per entity category, all keyed by ids from a single
//! counter. Iteration is always insertion order. Callers outside the
//! simulation only ever see `&World`; all mutation happens inside
//! [`Simulation::tick`](super::Simulation::tick).

use serde::Serialize;
use smallvec::SmallVec;

use crate::game::collections::{InsertResult, OrderedStore};
use crate::game::config::EntityLimits;
use crate::game::error::SimError;

use super::entities::{Enemy, EntityId, Hero, Projectile};
use super::Tick;

/// Stack-allocated id snapshot for iterating while mutating.
pub type IdList = SmallVec<[EntityId; 32]>;

/// Progress of the wave director.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WaveState {
    pub started: bool,
    pub current_wave: u32,
    pub level: u32,
    pub active: bool,
    pub enemies_planned: u32,
    pub enemies_spawned: u32,
    pub next_wave_tick: Option<Tick>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpawnTimer {
    /// Index into `SimConfig::level_schedules`.
    pub schedule: usize,
    pub next_spawn_tick: Option<Tick>,
}

/// Continuous per-level spawning, active alongside waves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LevelSpawnState {
    pub active_level: Option<u32>,
    pub level_start_tick: Tick,
    pub timers: Vec<SpawnTimer>,
    pub spawned_total: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct World {
    tick: Tick,
    next_id: u32,
    #[serde(skip)]
    limits: EntityLimits,
    heroes: OrderedStore<EntityId, Hero>,
    enemies: OrderedStore<EntityId, Enemy>,
    projectiles: OrderedStore<EntityId, Projectile>,
    pub(crate) waves: WaveState,
    pub(crate) level_spawner: LevelSpawnState,
    pub(crate) heroes_spawned: u32,
    pub(crate) game_over: bool,
}

impl World {
    pub fn new(limits: EntityLimits) -> Self {
        Self {
            tick: 0,
            next_id: 1,
            limits,
            heroes: OrderedStore::with_capacity(limits.heroes),
            enemies: OrderedStore::with_capacity(limits.enemies),
            projectiles: OrderedStore::with_capacity(limits.projectiles),
            waves: WaveState::default(),
            level_spawner: LevelSpawnState::default(),
            heroes_spawned: 0,
            game_over: false,
        }
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) {
        self.tick += 1;
    }

    pub fn limits(&self) -> EntityLimits {
        self.limits
    }

    pub fn waves(&self) -> &WaveState {
        &self.waves
    }

    pub fn level_spawner(&self) -> &LevelSpawnState {
        &self.level_spawner
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    /// Insert a hero, overwriting its `id` with a freshly allocated one.
    pub fn try_spawn_hero(&mut self, mut hero: Hero) -> Result<EntityId, SimError> {
        check_capacity("hero", self.heroes.len(), self.limits.heroes)?;
        let id = self.allocate_id();
        hero.id = id;
        insert_fresh(&mut self.heroes, id, hero);
        self.heroes_spawned += 1;
        Ok(id)
    }

    pub fn try_spawn_enemy(&mut self, mut enemy: Enemy) -> Result<EntityId, SimError> {
        check_capacity("enemy", self.enemies.len(), self.limits.enemies)?;
        let id = self.allocate_id();
        enemy.id = id;
        insert_fresh(&mut self.enemies, id, enemy);
        Ok(id)
    }

    pub fn try_spawn_projectile(&mut self, mut projectile: Projectile) -> Result<EntityId, SimError> {
        check_capacity("projectile", self.projectiles.len(), self.limits.projectiles)?;
        let id = self.allocate_id();
        projectile.id = id;
        insert_fresh(&mut self.projectiles, id, projectile);
        Ok(id)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn hero(&self, id: EntityId) -> Option<&Hero> {
        self.heroes.get(id)
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.get(id)
    }

    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.get(id)
    }

    pub fn heroes(&self) -> impl Iterator<Item = &Hero> + '_ {
        self.heroes.values()
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.values()
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> + '_ {
        self.projectiles.values()
    }

    pub fn hero_ids(&self) -> IdList {
        self.heroes.keys().collect()
    }

    pub fn enemy_ids(&self) -> IdList {
        self.enemies.keys().collect()
    }

    pub fn projectile_ids(&self) -> IdList {
        self.projectiles.keys().collect()
    }

    pub fn hero_count(&self) -> usize {
        self.heroes.len()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn living_hero_count(&self) -> usize {
        self.heroes.values().filter(|h| h.alive).count()
    }

    // ========================================================================
    // Updates (full replace) and removal
    // ========================================================================

    pub fn update_hero(&mut self, id: EntityId, hero: Hero) -> Result<(), SimError> {
        self.heroes.replace(id, hero).map(drop).map_err(|_| SimError::UnknownEntity(id))
    }

    pub fn update_enemy(&mut self, id: EntityId, enemy: Enemy) -> Result<(), SimError> {
        self.enemies.replace(id, enemy).map(drop).map_err(|_| SimError::UnknownEntity(id))
    }

    pub fn update_projectile(&mut self, id: EntityId, projectile: Projectile) -> Result<(), SimError> {
        self.projectiles.replace(id, projectile).map(drop).map_err(|_| SimError::UnknownEntity(id))
    }

    pub fn remove_hero(&mut self, id: EntityId) -> Option<Hero> {
        self.heroes.remove(id)
    }

    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        self.enemies.remove(id)
    }

    pub fn remove_projectile(&mut self, id: EntityId) -> Option<Projectile> {
        self.projectiles.remove(id)
    }
}

fn check_capacity(category: &'static str, count: usize, limit: usize) -> Result<(), SimError> {
    if count >= limit {
        return Err(SimError::CapacityExceeded { category, limit });
    }
    Ok(())
}

fn insert_fresh<V>(store: &mut OrderedStore<EntityId, V>, id: EntityId, value: V) {
    // Ids come from a monotonic counter, so a collision means the counter was corrupted.
    let result = store.insert(id, value);
    debug_assert!(matches!(result, InsertResult::Inserted(_)), "entity id {id} reused");
}
