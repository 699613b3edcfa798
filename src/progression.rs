//! Experience curve, battle rewards and level-up stat growth.
//!
//! Everything here is a pure transform: records go in, new records come out.
//! Randomness is drawn from an explicit seed so callers can replay a run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const MAX_LEVEL: u8 = 100;
pub const DEFAULT_MOVE_LEARN_CHANCE: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

/// Per-level growth applied against the base stat.
pub const GROWTH_RATES: [(Stat, f64); 6] = [
    (Stat::Hp, 0.03),
    (Stat::Attack, 0.025),
    (Stat::Defense, 0.025),
    (Stat::SpecialAttack, 0.025),
    (Stat::SpecialDefense, 0.025),
    (Stat::Speed, 0.02),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatBlock {
    pub hp: u32,
    pub hp_max: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl StatBlock {
    pub fn new(
        hp: u32,
        attack: u32,
        defense: u32,
        special_attack: u32,
        special_defense: u32,
        speed: u32,
    ) -> Self {
        Self {
            hp,
            hp_max: hp,
            attack,
            defense,
            special_attack,
            special_defense,
            speed,
        }
    }

    /// `Stat::Hp` reads the maximum; current HP is a resource, not a stat.
    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Hp => self.hp_max,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpecialAttack => self.special_attack,
            Stat::SpecialDefense => self.special_defense,
            Stat::Speed => self.speed,
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.hp_max.saturating_sub(self.hp));
        self.hp += healed;
        healed
    }

    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// HP gain raises both current and max HP; it is not a full heal.
    fn apply_gains(&mut self, gains: &StatGains) {
        self.hp = self.hp.saturating_add(gains.hp);
        self.hp_max = self.hp_max.saturating_add(gains.hp);
        self.attack = self.attack.saturating_add(gains.attack);
        self.defense = self.defense.saturating_add(gains.defense);
        self.special_attack = self.special_attack.saturating_add(gains.special_attack);
        self.special_defense = self.special_defense.saturating_add(gains.special_defense);
        self.speed = self.speed.saturating_add(gains.speed);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatGains {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl StatGains {
    pub fn set(&mut self, stat: Stat, value: u32) {
        match stat {
            Stat::Hp => self.hp = value,
            Stat::Attack => self.attack = value,
            Stat::Defense => self.defense = value,
            Stat::SpecialAttack => self.special_attack = value,
            Stat::SpecialDefense => self.special_defense = value,
            Stat::Speed => self.speed = value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProgressionRecord {
    pub level: u8,
    pub xp: u32,
    pub base_stats: StatBlock,
    pub current_stats: StatBlock,
}

impl ProgressionRecord {
    /// A fresh combatant at `level` with full HP and growth for every level above 1.
    pub fn new(level: u8, base_stats: StatBlock) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        let mut current_stats = base_stats;
        current_stats.hp = current_stats.hp_max;
        current_stats.apply_gains(&stat_gains(&base_stats, u32::from(level - 1)));
        Self {
            level,
            xp: xp_for_level(level),
            base_stats,
            current_stats,
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.current_stats.is_fainted()
    }

    pub fn progress(&self) -> XpProgress {
        xp_progress(self.level, self.xp)
    }
}

/// Cumulative XP at which `level` is reached.
pub fn xp_for_level(level: u8) -> u32 {
    let level = u32::from(level);
    level * level * 10
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct XpProgress {
    pub xp_in_level: u32,
    pub xp_needed: u32,
    pub progress: f64,
}

pub fn xp_progress(level: u8, xp: u32) -> XpProgress {
    if level >= MAX_LEVEL {
        return XpProgress {
            xp_in_level: 0,
            xp_needed: 0,
            progress: 1.0,
        };
    }
    let floor = xp_for_level(level);
    let xp_needed = xp_for_level(level + 1) - floor;
    let xp_in_level = xp.saturating_sub(floor).min(xp_needed);
    XpProgress {
        xp_in_level,
        xp_needed,
        progress: f64::from(xp_in_level) / f64::from(xp_needed),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum OpponentRank {
    #[default]
    Normal,
    Elite,
    Boss,
}

impl OpponentRank {
    /// Boss wins when a record carries both flags.
    pub fn from_flags(is_boss: bool, is_elite: bool) -> Self {
        if is_boss {
            OpponentRank::Boss
        } else if is_elite {
            OpponentRank::Elite
        } else {
            OpponentRank::Normal
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            OpponentRank::Normal => 1.0,
            OpponentRank::Elite => 2.0,
            OpponentRank::Boss => 3.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OpponentRank::Normal => "",
            OpponentRank::Elite => "Elite",
            OpponentRank::Boss => "Boss",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Opponent {
    pub level: u8,
    pub rank: OpponentRank,
}

/// XP for defeating `opponent`, given the receiving roster's mean level.
pub fn xp_reward(opponent: &Opponent, receiver_level: f64, floor: u32) -> u32 {
    let level = f64::from(opponent.level);
    let base = (level * 5.0).floor();
    let diff = level - receiver_level;
    let level_mult = if diff > 0.0 {
        1.0 + 0.1 * diff
    } else {
        (1.0 + 0.05 * diff).max(0.1)
    };
    let floor_bonus = 1.0 + 0.02 * f64::from(floor);
    let xp = (base * level_mult * opponent.rank.multiplier() * floor_bonus).floor();
    (xp as u32).max(1)
}

/// Growth for `levels` level-ups, computed from base stats so it never compounds.
pub fn stat_gains(base: &StatBlock, levels: u32) -> StatGains {
    let mut gains = StatGains::default();
    if levels == 0 {
        return gains;
    }
    for (stat, rate) in GROWTH_RATES {
        let gain = (f64::from(base.get(stat)) * rate * f64::from(levels)).ceil() as u32;
        gains.set(stat, gain.max(1));
    }
    gains
}

/// Chance of a move-learn opportunity after `levels_gained` levels, clamped to `[0, 1]`.
pub fn move_learn_probability(chance: f64, levels_gained: u32) -> f64 {
    (chance * f64::from(levels_gained)).clamp(0.0, 1.0)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LevelUpOutcome {
    pub record: ProgressionRecord,
    pub leveled_up: bool,
    pub levels_gained: u32,
    pub stat_gains: StatGains,
    pub pending_move_learn: bool,
}

pub fn apply_xp(
    record: &ProgressionRecord,
    xp_gained: u32,
    move_learn_chance: f64,
    seed: &mut u64,
) -> LevelUpOutcome {
    let mut next = record.clone();
    next.xp = record.xp.saturating_add(xp_gained);
    while next.level < MAX_LEVEL && next.xp >= xp_for_level(next.level + 1) {
        next.level += 1;
    }

    let levels_gained = u32::from(next.level - record.level);
    let gains = stat_gains(&record.base_stats, levels_gained);
    next.current_stats.apply_gains(&gains);

    let pending_move_learn = levels_gained > 0
        && roll_unit(seed) < move_learn_probability(move_learn_chance, levels_gained);

    LevelUpOutcome {
        record: next,
        leveled_up: levels_gained > 0,
        levels_gained,
        stat_gains: gains,
        pending_move_learn,
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum XpShareMode {
    /// Every member gets a share, fainted or not.
    Equal,
    /// Only members still standing share the pool.
    #[default]
    Participants,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MemberXp {
    pub index: usize,
    pub xp_gained: u32,
    pub outcome: LevelUpOutcome,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LevelUpEvent {
    pub member: usize,
    pub from_level: u8,
    pub to_level: u8,
    pub stat_gains: StatGains,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Distribution {
    pub total_xp: u32,
    pub xp_per_member: u32,
    pub members: Vec<MemberXp>,
    pub level_ups: Vec<LevelUpEvent>,
    pub pending_move_learn: Vec<usize>,
}

pub fn mean_level(team: &[ProgressionRecord]) -> f64 {
    if team.is_empty() {
        return 0.0;
    }
    let total: f64 = team.iter().map(|record| f64::from(record.level)).sum();
    total / team.len() as f64
}

/// Split a battle's XP across the team, in team order.
pub fn distribute_xp(
    team: &[ProgressionRecord],
    defeated: &[Opponent],
    floor: u32,
    mode: XpShareMode,
    move_learn_chance: f64,
    seed: &mut u64,
) -> Distribution {
    if team.is_empty() {
        return Distribution::default();
    }

    let receiver_level = mean_level(team);
    let total_xp = defeated
        .iter()
        .map(|opponent| xp_reward(opponent, receiver_level, floor))
        .fold(0u32, u32::saturating_add);

    let recipient_count = match mode {
        XpShareMode::Equal => team.len(),
        XpShareMode::Participants => team.iter().filter(|r| !r.is_fainted()).count().max(1),
    };
    let xp_per_member = total_xp / u32::try_from(recipient_count).unwrap_or(u32::MAX);

    let mut distribution = Distribution {
        total_xp,
        xp_per_member,
        ..Distribution::default()
    };
    for (index, record) in team.iter().enumerate() {
        let receives = mode == XpShareMode::Equal || !record.is_fainted();
        let xp_gained = if receives { xp_per_member } else { 0 };
        let outcome = apply_xp(record, xp_gained, move_learn_chance, seed);
        if outcome.leveled_up {
            distribution.level_ups.push(LevelUpEvent {
                member: index,
                from_level: record.level,
                to_level: outcome.record.level,
                stat_gains: outcome.stat_gains,
            });
        }
        if outcome.pending_move_learn {
            distribution.pending_move_learn.push(index);
        }
        distribution.members.push(MemberXp {
            index,
            xp_gained,
            outcome,
        });
    }
    distribution
}

pub fn next_u32(seed: &mut u64) -> u32 {
    *seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    (*seed >> 32) as u32
}

/// Uniform roll in `[0, 1)`.
pub fn roll_unit(seed: &mut u64) -> f64 {
    f64::from(next_u32(seed)) / (f64::from(u32::MAX) + 1.0)
}
