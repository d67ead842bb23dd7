//! Replay persistence.
//!
//! Two encodings of the same [`ReplayFile`] document: pretty RON for humans
//! and diffs, and a zlib-compressed bincode archive for bulk storage. Both
//! validate the whole document before handing back a [`ReplayLog`], so a
//! corrupt file never starts a partial playback.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::error::ReplayError;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::simulation::commands::{Command, CommandKind, UpgradeKind};
use crate::game::simulation::entities::EntityId;
use crate::game::simulation::hash::StateHash;
use crate::game::simulation::Tick;

use super::ReplayLog;

pub const REPLAY_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFile {
    pub version: u32,
    pub ticks: Tick,
    #[serde(default)]
    pub commands: Vec<CommandRecord>,
    #[serde(default)]
    pub hashes: Vec<HashRecord>,
}

/// One command, flattened: a type discriminator plus whichever payload
/// fields that type uses. Positions are raw 48.16 fixed-point values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandRecord {
    pub command_type: String,
    pub tick: Option<Tick>,
    pub hero_type: Option<String>,
    pub enemy_type: Option<String>,
    pub position_x: Option<i64>,
    pub position_y: Option<i64>,
    pub hero_id: Option<u32>,
    pub upgrade: Option<String>,
    pub tier: Option<u32>,
    pub weapon_type: Option<String>,
    pub wave_number: Option<u32>,
    pub level_number: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    pub tick: Tick,
    pub hash: StateHash,
}

impl CommandRecord {
    pub fn from_command(command: &Command) -> Self {
        let mut record = CommandRecord {
            command_type: command.kind.name().to_string(),
            tick: command.tick,
            ..Default::default()
        };
        match &command.kind {
            CommandKind::SpawnHero { hero_type, position } => {
                record.hero_type = Some(hero_type.clone());
                record.set_position(*position);
            }
            CommandKind::SpawnEnemy { enemy_type, position } => {
                record.enemy_type = Some(enemy_type.clone());
                record.set_position(*position);
            }
            CommandKind::ChooseUpgrade { hero_id, upgrade, tier } => {
                record.hero_id = Some(hero_id.0);
                record.upgrade = Some(upgrade.name().to_string());
                record.tier = Some(*tier);
            }
            CommandKind::ChooseWeapon { hero_id, weapon_type } => {
                record.hero_id = Some(hero_id.0);
                record.weapon_type = Some(weapon_type.clone());
            }
            CommandKind::StartWave { wave_number, level_number } => {
                record.wave_number = Some(*wave_number);
                record.level_number = Some(*level_number);
            }
        }
        record
    }

    fn set_position(&mut self, position: FixedVec2) {
        self.position_x = Some(position.x.raw());
        self.position_y = Some(position.y.raw());
    }

    /// Rebuild the command stored at `index` of its document.
    pub fn to_command(&self, index: usize) -> Result<Command, ReplayError> {
        let tick = required(self.tick, index, "tick")?;
        let kind = match self.command_type.as_str() {
            "SpawnHero" => CommandKind::SpawnHero {
                hero_type: required(self.hero_type.clone(), index, "hero_type")?,
                position: self.position(index)?,
            },
            "SpawnEnemy" => CommandKind::SpawnEnemy {
                enemy_type: required(self.enemy_type.clone(), index, "enemy_type")?,
                position: self.position(index)?,
            },
            "ChooseUpgrade" => {
                let name = required(self.upgrade.as_deref(), index, "upgrade")?;
                let upgrade = UpgradeKind::from_name(name).ok_or_else(|| ReplayError::InvalidField {
                    index,
                    field: "upgrade",
                    value: name.to_string(),
                })?;
                CommandKind::ChooseUpgrade {
                    hero_id: EntityId(required(self.hero_id, index, "hero_id")?),
                    upgrade,
                    tier: required(self.tier, index, "tier")?,
                }
            }
            "ChooseWeapon" => CommandKind::ChooseWeapon {
                hero_id: EntityId(required(self.hero_id, index, "hero_id")?),
                weapon_type: required(self.weapon_type.clone(), index, "weapon_type")?,
            },
            "StartWave" => CommandKind::StartWave {
                wave_number: required(self.wave_number, index, "wave_number")?,
                level_number: required(self.level_number, index, "level_number")?,
            },
            "" => return Err(ReplayError::MissingField { index, field: "command_type" }),
            other => return Err(ReplayError::UnknownCommandType(other.to_string())),
        };
        Ok(Command::at(tick, kind))
    }

    fn position(&self, index: usize) -> Result<FixedVec2, ReplayError> {
        Ok(FixedVec2::new(
            FixedNum::from_raw(required(self.position_x, index, "position_x")?),
            FixedNum::from_raw(required(self.position_y, index, "position_y")?),
        ))
    }
}

fn required<T>(value: Option<T>, index: usize, field: &'static str) -> Result<T, ReplayError> {
    value.ok_or(ReplayError::MissingField { index, field })
}

impl ReplayFile {
    pub fn from_log(log: &ReplayLog) -> Self {
        Self {
            version: REPLAY_VERSION,
            ticks: log.ticks,
            commands: log.commands.iter().map(CommandRecord::from_command).collect(),
            hashes: log.hashes.iter().map(|(&tick, &hash)| HashRecord { tick, hash }).collect(),
        }
    }

    /// Validate the whole document and convert it. Nothing is returned unless
    /// every record is well-formed and in order.
    pub fn into_log(self) -> Result<ReplayLog, ReplayError> {
        if self.version != REPLAY_VERSION {
            return Err(ReplayError::UnsupportedVersion(self.version));
        }

        let mut commands = Vec::with_capacity(self.commands.len());
        let mut last_tick = 0;
        for (index, record) in self.commands.iter().enumerate() {
            let command = record.to_command(index)?;
            let tick = command.tick.unwrap_or_default();
            if tick < last_tick {
                return Err(ReplayError::OutOfOrder { index });
            }
            if tick >= self.ticks {
                return Err(ReplayError::CommandBeyondEnd { index, tick, ticks: self.ticks });
            }
            last_tick = tick;
            commands.push(command);
        }

        let mut hashes = BTreeMap::new();
        let mut previous: Option<Tick> = None;
        for (index, record) in self.hashes.iter().enumerate() {
            if previous.is_some_and(|tick| record.tick <= tick) {
                return Err(ReplayError::HashOutOfOrder { index });
            }
            previous = Some(record.tick);
            hashes.insert(record.tick, record.hash);
        }

        Ok(ReplayLog { ticks: self.ticks, commands, hashes })
    }
}

impl ReplayLog {
    pub fn to_ron_string(&self) -> Result<String, ReplayError> {
        Ok(ron::ser::to_string_pretty(&ReplayFile::from_log(self), ron::ser::PrettyConfig::default())?)
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, ReplayError> {
        ron::from_str::<ReplayFile>(contents)?.into_log()
    }

    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let path = path.as_ref();
        let contents = self.to_ron_string()?;
        fs::write(path, contents)?;
        info!("Saved replay ({} ticks, {} commands) to {:?}", self.ticks, self.commands.len(), path);
        Ok(())
    }

    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Write the document as a zlib-compressed bincode archive.
    pub fn save_archive(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        let mut encoder = ZlibEncoder::new(writer, Compression::default());
        bincode::serialize_into(&mut encoder, &ReplayFile::from_log(self))?;
        encoder.finish()?.flush()?;
        info!("Saved replay archive ({} ticks) to {:?}", self.ticks, path);
        Ok(())
    }

    pub fn load_archive(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut decoder = ZlibDecoder::new(reader);
        let document: ReplayFile = bincode::deserialize_from(&mut decoder)?;
        document.into_log()
    }
}
