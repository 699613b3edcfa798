//! Tower configuration, loaded from a RON file.

use std::collections::BTreeMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::progression::{
    ProgressionRecord, StatBlock, XpShareMode, DEFAULT_MOVE_LEARN_CHANCE, MAX_LEVEL,
};
use crate::state::{ItemKind, ItemStack, RosterMember, COMMANDS};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl From<BaseStats> for StatBlock {
    fn from(base: BaseStats) -> Self {
        StatBlock::new(
            base.hp,
            base.attack,
            base.defense,
            base.special_attack,
            base.special_defense,
            base.speed,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RosterSeed {
    pub name: String,
    pub level: u8,
    pub base_stats: BaseStats,
    /// Starting HP; full health when absent.
    #[serde(default)]
    pub hp: Option<u32>,
}

impl RosterSeed {
    pub fn new(name: &str, level: u8, base_stats: BaseStats) -> Self {
        Self {
            name: name.to_string(),
            level,
            base_stats,
            hp: None,
        }
    }

    pub fn to_member(&self) -> RosterMember {
        let mut record = ProgressionRecord::new(self.level, self.base_stats.into());
        if let Some(hp) = self.hp {
            record.current_stats.hp = hp.min(record.current_stats.hp_max);
        }
        RosterMember {
            name: self.name.clone(),
            record,
            pending_moves: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TowerConfig {
    pub xp_mode: XpShareMode,
    pub wrap: bool,
    pub number_keys: bool,
    /// Extra single-key bindings into the command grid.
    pub custom_keys: BTreeMap<String, usize>,
    pub move_learn_chance: f64,
    pub roster: Vec<RosterSeed>,
    pub inventory: Vec<ItemStack>,
}

impl Default for TowerConfig {
    fn default() -> Self {
        let custom_keys = [("f", 0), ("b", 1), ("t", 2), ("r", 3)]
            .into_iter()
            .map(|(label, index)| (label.to_string(), index))
            .collect();
        Self {
            xp_mode: XpShareMode::default(),
            wrap: true,
            number_keys: true,
            custom_keys,
            move_learn_chance: DEFAULT_MOVE_LEARN_CHANCE,
            roster: vec![
                RosterSeed::new(
                    "pikachu",
                    5,
                    BaseStats {
                        hp: 35,
                        attack: 55,
                        defense: 40,
                        special_attack: 50,
                        special_defense: 50,
                        speed: 90,
                    },
                ),
                RosterSeed::new(
                    "bulbasaur",
                    5,
                    BaseStats {
                        hp: 45,
                        attack: 49,
                        defense: 49,
                        special_attack: 65,
                        special_defense: 65,
                        speed: 45,
                    },
                ),
                RosterSeed::new(
                    "charmander",
                    4,
                    BaseStats {
                        hp: 39,
                        attack: 52,
                        defense: 43,
                        special_attack: 60,
                        special_defense: 50,
                        speed: 65,
                    },
                ),
            ],
            inventory: vec![
                ItemStack {
                    kind: ItemKind::Potion,
                    qty: 3,
                },
                ItemStack {
                    kind: ItemKind::SuperPotion,
                    qty: 1,
                },
                ItemStack {
                    kind: ItemKind::Revive,
                    qty: 1,
                },
            ],
        }
    }
}

impl TowerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roster.is_empty() {
            return Err(ConfigError::Invalid("roster is empty".into()));
        }
        for seed in &self.roster {
            if !(1..=MAX_LEVEL).contains(&seed.level) {
                return Err(ConfigError::Invalid(format!(
                    "{} has level {}, expected 1..={}",
                    seed.name, seed.level, MAX_LEVEL
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.move_learn_chance) {
            return Err(ConfigError::Invalid(format!(
                "move_learn_chance {} is outside 0..=1",
                self.move_learn_chance
            )));
        }
        if let Some((label, index)) = self
            .custom_keys
            .iter()
            .find(|(_, index)| **index >= COMMANDS.len())
        {
            return Err(ConfigError::Invalid(format!(
                "key {label:?} points at command {index}, only {} exist",
                COMMANDS.len()
            )));
        }
        Ok(())
    }
}

pub fn parse_config(source: &str) -> Result<TowerConfig, ConfigError> {
    let config: TowerConfig = ron::de::from_str(source)?;
    config.validate()?;
    Ok(config)
}

pub async fn load_config(path: &Path) -> Result<TowerConfig, ConfigError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
    parse_config(&source)
}
