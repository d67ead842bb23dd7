use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::game::fixed_math::FixedVec2;

use super::entities::EntityId;
use super::Tick;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Damage,
    AttackSpeed,
    MoveSpeed,
    Health,
    Star,
}

impl UpgradeKind {
    pub fn name(self) -> &'static str {
        match self {
            UpgradeKind::Damage => "Damage",
            UpgradeKind::AttackSpeed => "AttackSpeed",
            UpgradeKind::MoveSpeed => "MoveSpeed",
            UpgradeKind::Health => "Health",
            UpgradeKind::Star => "Star",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Damage" => Some(UpgradeKind::Damage),
            "AttackSpeed" => Some(UpgradeKind::AttackSpeed),
            "MoveSpeed" => Some(UpgradeKind::MoveSpeed),
            "Health" => Some(UpgradeKind::Health),
            "Star" => Some(UpgradeKind::Star),
            _ => None,
        }
    }
}

/// Player or director intent. The only way state changes besides the passage of time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    SpawnHero { hero_type: String, position: FixedVec2 },
    SpawnEnemy { enemy_type: String, position: FixedVec2 },
    ChooseUpgrade { hero_id: EntityId, upgrade: UpgradeKind, tier: u32 },
    ChooseWeapon { hero_id: EntityId, weapon_type: String },
    StartWave { wave_number: u32, level_number: u32 },
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::SpawnHero { .. } => "SpawnHero",
            CommandKind::SpawnEnemy { .. } => "SpawnEnemy",
            CommandKind::ChooseUpgrade { .. } => "ChooseUpgrade",
            CommandKind::ChooseWeapon { .. } => "ChooseWeapon",
            CommandKind::StartWave { .. } => "StartWave",
        }
    }
}

/// A command plus the tick it applies on. `tick: None` means "as soon as
/// possible": the simulation stamps it with its current tick when enqueued.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub tick: Option<Tick>,
    pub kind: CommandKind,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self { tick: None, kind }
    }

    pub fn at(tick: Tick, kind: CommandKind) -> Self {
        Self { tick: Some(tick), kind }
    }

    pub fn spawn_hero(hero_type: impl Into<String>, position: FixedVec2) -> Self {
        Self::new(CommandKind::SpawnHero { hero_type: hero_type.into(), position })
    }

    pub fn spawn_enemy(enemy_type: impl Into<String>, position: FixedVec2) -> Self {
        Self::new(CommandKind::SpawnEnemy { enemy_type: enemy_type.into(), position })
    }

    pub fn choose_upgrade(hero_id: EntityId, upgrade: UpgradeKind, tier: u32) -> Self {
        Self::new(CommandKind::ChooseUpgrade { hero_id, upgrade, tier })
    }

    pub fn choose_weapon(hero_id: EntityId, weapon_type: impl Into<String>) -> Self {
        Self::new(CommandKind::ChooseWeapon { hero_id, weapon_type: weapon_type.into() })
    }

    pub fn start_wave(wave_number: u32, level_number: u32) -> Self {
        Self::new(CommandKind::StartWave { wave_number, level_number })
    }

    /// Same command, scheduled for `tick`.
    pub fn scheduled(mut self, tick: Tick) -> Self {
        self.tick = Some(tick);
        self
    }
}

pub type CommandBatch = SmallVec<[Command; 4]>;

/// Commands waiting for their tick, kept in enqueue order.
#[derive(Clone, Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command. Callers stamp and validate the tick first.
    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Remove and return every command due at or before `tick`, in enqueue order.
    pub fn drain_due(&mut self, tick: Tick) -> CommandBatch {
        let mut due = CommandBatch::new();
        let mut remaining = Vec::with_capacity(self.pending.len());
        for command in self.pending.drain(..) {
            if command.tick.map_or(true, |t| t <= tick) {
                due.push(command);
            } else {
                remaining.push(command);
            }
        }
        self.pending = remaining;
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
