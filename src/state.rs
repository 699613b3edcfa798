use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::config::TowerConfig;
use crate::nav::{NavLayout, NavOptions, Navigator};
use crate::persist::RunSnapshot;
use crate::progression::{
    next_u32, Distribution, Opponent, OpponentRank, ProgressionRecord, StatBlock, MAX_LEVEL,
};

pub const COMMAND_COLUMNS: usize = 2;
pub const WILD_POOL: [&str; 8] = [
    "pidgey", "rattata", "caterpie", "weedle", "oddish", "zubat", "geodude", "abra",
];
pub const BOSS_POOL: [&str; 3] = ["onix", "gyarados", "snorlax"];

/// The navigable surface currently mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Screen {
    Command,
    Bag,
    Team,
    Results,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Command => " COMMAND ",
            Screen::Bag => " BAG ",
            Screen::Team => " TEAM ",
            Screen::Results => " RESULTS ",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Command {
    Fight,
    Bag,
    Team,
    Run,
}

pub const COMMANDS: [Command; 4] = [Command::Fight, Command::Bag, Command::Team, Command::Run];

impl Command {
    pub fn label(self) -> &'static str {
        match self {
            Command::Fight => "FIGHT",
            Command::Bag => "BAG",
            Command::Team => "TEAM",
            Command::Run => "RUN",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Command::Fight => "Take on the whole wave.",
            Command::Bag => "Use an item on the lead.",
            Command::Team => "Switch the lead.",
            Command::Run => "Flee and face a new wave.",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ItemKind {
    Potion,
    SuperPotion,
    Revive,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Potion => "Potion",
            ItemKind::SuperPotion => "Super Potion",
            ItemKind::Revive => "Revive",
        }
    }

    pub fn heal_amount(self, hp_max: u32) -> u32 {
        match self {
            ItemKind::Potion => 20,
            ItemKind::SuperPotion => 50,
            ItemKind::Revive => (hp_max / 2).max(1),
        }
    }

    pub fn usable_on(self, stats: &StatBlock) -> bool {
        match self {
            ItemKind::Potion | ItemKind::SuperPotion => {
                !stats.is_fainted() && stats.hp < stats.hp_max
            }
            ItemKind::Revive => stats.is_fainted(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ItemStack {
    pub kind: ItemKind,
    pub qty: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RosterMember {
    pub name: String,
    pub record: ProgressionRecord,
    #[serde(default)]
    pub pending_moves: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Foe {
    pub name: String,
    pub opponent: Opponent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BattleReport {
    pub floor: u32,
    pub outcome: BattleOutcome,
    pub damage_taken: u32,
    pub distribution: Distribution,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub screen: Screen,
    pub nav: Navigator,
    pub config: TowerConfig,
    pub floor: u32,
    pub wave: Vec<Foe>,
    pub roster: Vec<RosterMember>,
    pub lead: usize,
    pub inventory: Vec<ItemStack>,
    pub report: Option<BattleReport>,
    pub command_index: usize,
    pub message: String,
    pub save_path: String,
    /// A save or load is in flight; input is locked until it lands.
    pub busy: bool,
    pub rng_seed: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            TowerConfig::default(),
            1,
            default_save_path(),
            seed_from_time(),
        )
    }
}

impl AppState {
    pub fn new(config: TowerConfig, floor: u32, save_path: String, rng_seed: u64) -> Self {
        let mut state = Self {
            terminal_size: (80, 24),
            screen: Screen::Command,
            nav: Navigator::default(),
            roster: config.roster.iter().map(|seed| seed.to_member()).collect(),
            inventory: config.inventory.clone(),
            config,
            floor: floor.max(1),
            wave: Vec::new(),
            lead: 0,
            report: None,
            command_index: 0,
            message: String::new(),
            save_path,
            busy: false,
            rng_seed,
        };
        state.lead = state.first_standing().unwrap_or(0);
        state.generate_wave();
        state.enter_screen(Screen::Command);
        state
    }

    /// The one surface that receives input.
    pub fn active_surface(&self) -> Screen {
        self.screen
    }

    /// Mount `screen`: the previous navigator is dropped and a fresh one takes input.
    pub fn enter_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.nav = self.mount_navigator(screen);
    }

    /// Re-validate the mounted navigator after its items changed.
    pub fn refresh_navigator(&mut self) {
        let disabled = self.disabled_flags(self.screen);
        self.nav.set_items(&disabled, |flag, _| *flag);
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        self.nav.set_enabled(!busy);
    }

    fn mount_navigator(&self, screen: Screen) -> Navigator {
        let list = NavOptions::list()
            .with_wrap(self.config.wrap)
            .with_number_keys(self.config.number_keys)
            .with_enabled(!self.busy);
        let options = match screen {
            Screen::Command => NavOptions {
                layout: NavLayout::Grid {
                    columns: COMMAND_COLUMNS,
                },
                ..list
            }
            .with_initial_index(self.command_index)
            .with_custom_keys(self.config.custom_keys.clone()),
            Screen::Bag => list,
            Screen::Team => list.with_initial_index(self.lead),
            Screen::Results => list.with_number_keys(false),
        };
        let disabled = self.disabled_flags(screen);
        Navigator::new(options, &disabled, |flag, _| *flag).unwrap_or_default()
    }

    /// Disabled mask for the items `screen` shows, in display order.
    pub fn disabled_flags(&self, screen: Screen) -> Vec<bool> {
        match screen {
            Screen::Command => COMMANDS
                .iter()
                .map(|command| self.is_command_disabled(*command))
                .collect(),
            Screen::Bag => self
                .inventory
                .iter()
                .map(|stack| !self.can_use_item(stack))
                .collect(),
            Screen::Team => self
                .roster
                .iter()
                .map(|member| member.record.is_fainted())
                .collect(),
            Screen::Results => vec![false; self.roster.len()],
        }
    }

    pub fn is_command_disabled(&self, command: Command) -> bool {
        match command {
            Command::Fight => self
                .lead_member()
                .map_or(true, |member| member.record.is_fainted()),
            Command::Bag => !self.inventory.iter().any(|stack| self.can_use_item(stack)),
            Command::Team => self.roster.len() < 2,
            Command::Run => is_boss_floor(self.floor),
        }
    }

    pub fn can_use_item(&self, stack: &ItemStack) -> bool {
        stack.qty > 0 && self.item_target(stack.kind).is_some()
    }

    /// Roster slot an item would land on: potions heal the lead, revives the first fainted.
    pub fn item_target(&self, kind: ItemKind) -> Option<usize> {
        match kind {
            ItemKind::Potion | ItemKind::SuperPotion => self
                .lead_member()
                .filter(|member| kind.usable_on(&member.record.current_stats))
                .map(|_| self.lead),
            ItemKind::Revive => self
                .roster
                .iter()
                .position(|member| kind.usable_on(&member.record.current_stats)),
        }
    }

    pub fn lead_member(&self) -> Option<&RosterMember> {
        self.roster.get(self.lead)
    }

    pub fn lead_member_mut(&mut self) -> Option<&mut RosterMember> {
        self.roster.get_mut(self.lead)
    }

    pub fn lead_name(&self) -> String {
        self.lead_member()
            .map(|member| format_name(&member.name))
            .unwrap_or_else(|| "your team".to_string())
    }

    pub fn first_standing(&self) -> Option<usize> {
        self.roster
            .iter()
            .position(|member| !member.record.is_fainted())
    }

    pub fn all_fainted(&self) -> bool {
        self.roster.iter().all(|member| member.record.is_fainted())
    }

    pub fn team_records(&self) -> Vec<ProgressionRecord> {
        self.roster
            .iter()
            .map(|member| member.record.clone())
            .collect()
    }

    pub fn opponents(&self) -> Vec<Opponent> {
        self.wave.iter().map(|foe| foe.opponent).collect()
    }

    pub fn generate_wave(&mut self) {
        let level = floor_level(self.floor);
        if is_boss_floor(self.floor) {
            let pick = next_u32(&mut self.rng_seed) as usize % BOSS_POOL.len();
            self.wave = vec![Foe {
                name: BOSS_POOL[pick].to_string(),
                opponent: Opponent {
                    level: level.saturating_add(3).min(MAX_LEVEL),
                    rank: OpponentRank::Boss,
                },
            }];
            return;
        }

        let elite = is_elite_floor(self.floor);
        let count = 1 + (self.floor % 3) as usize;
        let mut wave = Vec::with_capacity(count);
        for slot in 0..count {
            let pick = next_u32(&mut self.rng_seed) as usize % WILD_POOL.len();
            let rank = if elite && slot == 0 {
                OpponentRank::Elite
            } else {
                OpponentRank::Normal
            };
            wave.push(Foe {
                name: WILD_POOL[pick].to_string(),
                opponent: Opponent {
                    level: level.saturating_sub(slot as u8).max(1),
                    rank,
                },
            });
        }
        self.wave = wave;
    }

    pub fn wave_intro(&self) -> String {
        let names = self
            .wave
            .iter()
            .map(|foe| format_name(&foe.name))
            .collect::<Vec<_>>()
            .join(", ");
        if is_boss_floor(self.floor) {
            format!("Floor {}: the guardian {} blocks the way!", self.floor, names)
        } else {
            format!("Floor {}: {} appeared!", self.floor, names)
        }
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            floor: self.floor,
            roster: self.roster.clone(),
            lead: self.lead,
            inventory: self.inventory.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: RunSnapshot) {
        self.floor = snapshot.floor.max(1);
        self.roster = snapshot.roster;
        self.inventory = snapshot.inventory;
        self.lead = if snapshot.lead < self.roster.len() {
            snapshot.lead
        } else {
            self.first_standing().unwrap_or(0)
        };
        self.report = None;
        self.command_index = 0;
        self.generate_wave();
        self.enter_screen(Screen::Command);
    }

    /// Back to floor 1 with the configured roster and bag.
    pub fn reset_run(&mut self) {
        self.floor = 1;
        self.roster = self
            .config
            .roster
            .iter()
            .map(|seed| seed.to_member())
            .collect();
        self.inventory = self.config.inventory.clone();
        self.lead = self.first_standing().unwrap_or(0);
        self.report = None;
        self.command_index = 0;
        self.generate_wave();
        self.enter_screen(Screen::Command);
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let mut sections = vec![
            DebugSection::new("Screen")
                .entry("screen", ron_string(&self.screen))
                .entry("message", ron_string(&self.message))
                .entry("busy", ron_string(&self.busy)),
            DebugSection::new("Navigator")
                .entry("cursor", ron_string(&self.nav.cursor()))
                .entry("focus", ron_string(&self.nav.focus_source()))
                .entry("enabled", ron_string(&self.nav.is_enabled()))
                .entry("items", ron_string(&self.nav.len())),
            DebugSection::new("Tower")
                .entry("floor", ron_string(&self.floor))
                .entry("wave", ron_string(&self.opponents()))
                .entry("lead", ron_string(&self.lead)),
        ];

        let roster: Vec<String> = self
            .roster
            .iter()
            .map(|member| {
                format!(
                    "{} Lv{} {}/{} HP, {} XP",
                    member.name,
                    member.record.level,
                    member.record.current_stats.hp,
                    member.record.current_stats.hp_max,
                    member.record.xp
                )
            })
            .collect();
        sections.push(DebugSection::new("Roster").entry("members", ron_string(&roster)));
        sections
    }
}

pub fn is_boss_floor(floor: u32) -> bool {
    floor > 0 && floor % 5 == 0
}

pub fn is_elite_floor(floor: u32) -> bool {
    floor % 3 == 0 && !is_boss_floor(floor)
}

pub fn floor_level(floor: u32) -> u8 {
    floor
        .saturating_mul(2)
        .saturating_add(2)
        .min(u32::from(MAX_LEVEL)) as u8
}

pub fn format_name(name: &str) -> String {
    name.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let rest = chars.as_str();
                    format!("{}{}", first.to_ascii_uppercase(), rest)
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn default_save_path() -> String {
    let base = dirs_next::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    base.join("battletower")
        .join("run.json")
        .to_string_lossy()
        .into_owned()
}

pub fn seed_from_time() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs() << 32) ^ now.subsec_nanos() as u64
}
