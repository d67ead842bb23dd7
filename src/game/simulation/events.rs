//! Events emitted by the simulation.
//!
//! Every tick returns an ordered batch of [`SimEvent`]s. Hosts either consume
//! the batch directly or hand it to an [`EventFunnel`], which forwards each
//! event to every subscribed observer in subscription order.

use serde::{Deserialize, Serialize};

use crate::game::fixed_math::{FixedNum, FixedVec2};

use super::commands::UpgradeKind;
use super::entities::EntityId;
use super::hash::StateHash;
use super::Tick;

// ============================================================================
// Event payloads
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    HeroSpawned {
        hero_id: EntityId,
        hero_type: String,
        position: FixedVec2,
        max_health: FixedNum,
        move_speed: FixedNum,
        damage: FixedNum,
        attack_speed: FixedNum,
        weapon_type: String,
    },
    EnemySpawned {
        enemy_id: EntityId,
        enemy_type: String,
        position: FixedVec2,
        max_health: FixedNum,
        is_boss: bool,
        is_mini_boss: bool,
    },
    ProjectileSpawned {
        projectile_id: EntityId,
        owner_id: EntityId,
        position: FixedVec2,
        velocity: FixedVec2,
        piercing: bool,
    },
    HeroShoot {
        hero_id: EntityId,
        target_id: EntityId,
        direction: FixedVec2,
        projectile_count: u32,
    },
    HeroDamaged {
        hero_id: EntityId,
        attacker_id: EntityId,
        damage: FixedNum,
        remaining_health: FixedNum,
    },
    EnemyDamaged {
        enemy_id: EntityId,
        attacker_id: EntityId,
        damage: FixedNum,
        remaining_health: FixedNum,
        position: FixedVec2,
    },
    HeroKilled {
        hero_id: EntityId,
        killer_id: EntityId,
        position: FixedVec2,
    },
    EnemyKilled {
        enemy_id: EntityId,
        killer_id: EntityId,
        position: FixedVec2,
        is_boss: bool,
        is_mini_boss: bool,
    },
    XpGained {
        hero_id: EntityId,
        amount: u32,
        current_xp: u32,
        level: u32,
    },
    HeroLevelUp {
        hero_id: EntityId,
        new_level: u32,
    },
    ProjectileDestroyed {
        projectile_id: EntityId,
        position: FixedVec2,
        hit_target: bool,
    },
    UpgradeChosen {
        hero_id: EntityId,
        upgrade: UpgradeKind,
        tier: u32,
    },
    WeaponChosen {
        hero_id: EntityId,
        weapon_type: String,
        weapon_tier: u32,
    },
    WaveStarted {
        wave_number: u32,
        level_number: u32,
        enemy_count: u32,
    },
    WaveCompleted {
        wave_number: u32,
        level_number: u32,
    },
    LevelCompleted {
        level_number: u32,
    },
    GameOver {
        victory: bool,
    },
    /// Replay diagnostic: the recorded hash for `tick` did not match.
    DivergenceDetected {
        tick: Tick,
        expected: StateHash,
        actual: StateHash,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::HeroSpawned { .. } => "HeroSpawned",
            EventKind::EnemySpawned { .. } => "EnemySpawned",
            EventKind::ProjectileSpawned { .. } => "ProjectileSpawned",
            EventKind::HeroShoot { .. } => "HeroShoot",
            EventKind::HeroDamaged { .. } => "HeroDamaged",
            EventKind::EnemyDamaged { .. } => "EnemyDamaged",
            EventKind::HeroKilled { .. } => "HeroKilled",
            EventKind::EnemyKilled { .. } => "EnemyKilled",
            EventKind::XpGained { .. } => "XpGained",
            EventKind::HeroLevelUp { .. } => "HeroLevelUp",
            EventKind::ProjectileDestroyed { .. } => "ProjectileDestroyed",
            EventKind::UpgradeChosen { .. } => "UpgradeChosen",
            EventKind::WeaponChosen { .. } => "WeaponChosen",
            EventKind::WaveStarted { .. } => "WaveStarted",
            EventKind::WaveCompleted { .. } => "WaveCompleted",
            EventKind::LevelCompleted { .. } => "LevelCompleted",
            EventKind::GameOver { .. } => "GameOver",
            EventKind::DivergenceDetected { .. } => "DivergenceDetected",
        }
    }
}

/// A simulation event tagged with the tick that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: Tick,
    pub kind: EventKind,
}

/// Collects one tick's events in emission order.
#[derive(Debug)]
pub struct EventBuffer {
    tick: Tick,
    events: Vec<SimEvent>,
}

impl EventBuffer {
    pub fn new(tick: Tick) -> Self {
        Self { tick, events: Vec::new() }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn emit(&mut self, kind: EventKind) {
        self.events.push(SimEvent { tick: self.tick, kind });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<SimEvent> {
        self.events
    }
}

// ============================================================================
// Observer funnel
// ============================================================================

/// Handle returned by [`EventFunnel::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u32);

type Observer = Box<dyn FnMut(&SimEvent)>;

/// Fan-out of tick events to presentation observers.
///
/// Owned by whoever drives the simulation (usually a [`MatchRunner`]); there is
/// no global registry. Observers run synchronously in subscription order.
///
/// [`MatchRunner`]: crate::game::runner::MatchRunner
#[derive(Default)]
pub struct EventFunnel {
    observers: Vec<(ObserverId, Observer)>,
    next_id: u32,
}

impl EventFunnel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&SimEvent) + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if the observer was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Deliver `events` in order; each event reaches every observer before the next event is sent.
    pub fn dispatch(&mut self, events: &[SimEvent]) {
        for event in events {
            for (_, observer) in self.observers.iter_mut() {
                observer(event);
            }
        }
    }
}
