//! XP distribution across a team.

use battletower::progression::{
    distribute_xp, mean_level, stat_gains, xp_for_level, xp_reward, Opponent, OpponentRank,
    ProgressionRecord, StatBlock, XpShareMode,
};
use pretty_assertions::assert_eq;

fn base() -> StatBlock {
    StatBlock::new(45, 49, 49, 65, 65, 45)
}

fn team(levels: &[u8]) -> Vec<ProgressionRecord> {
    levels
        .iter()
        .map(|level| ProgressionRecord::new(*level, base()))
        .collect()
}

fn wave() -> Vec<Opponent> {
    vec![
        Opponent {
            level: 10,
            rank: OpponentRank::Normal,
        },
        Opponent {
            level: 10,
            rank: OpponentRank::Elite,
        },
    ]
}

#[test]
fn test_equal_share_is_floored_and_never_exceeds_total() {
    let team = team(&[10, 10, 10]);
    let mut seed = 3;

    let result = distribute_xp(&team, &wave(), 5, XpShareMode::Equal, 0.0, &mut seed);

    // 55 + 110 at mean level 10 on floor 5.
    assert_eq!(result.total_xp, 165);
    assert_eq!(result.xp_per_member, 55);
    let handed_out: u32 = result.members.iter().map(|m| m.xp_gained).sum();
    assert!(handed_out <= result.total_xp);
    assert_eq!(result.members.len(), 3);
}

#[test]
fn test_participants_skip_fainted_members() {
    let mut team = team(&[10, 10, 10]);
    team[1].current_stats.hp = 0;
    let mut seed = 3;

    let result = distribute_xp(
        &team,
        &wave(),
        5,
        XpShareMode::Participants,
        0.0,
        &mut seed,
    );

    assert_eq!(result.xp_per_member, 82);
    let gained: Vec<u32> = result.members.iter().map(|m| m.xp_gained).collect();
    assert_eq!(gained, vec![82, 0, 82]);
    assert!(result.members[1].outcome.record.is_fainted());
}

#[test]
fn test_equal_share_levels_fainted_members_too() {
    let mut team = team(&[5, 5]);
    team[0].current_stats.hp = 0;
    let defeated = [Opponent {
        level: 30,
        rank: OpponentRank::Boss,
    }];
    let mut seed = 11;

    let result = distribute_xp(&team, &defeated, 10, XpShareMode::Equal, 0.0, &mut seed);

    assert_eq!(result.level_ups.len(), 2);
    let first = &result.members[0].outcome;
    assert!(first.leveled_up);
    // Fainted members keep the HP gain as current HP.
    assert_eq!(first.record.current_stats.hp, first.stat_gains.hp);
}

#[test]
fn test_level_up_events_report_levels_in_team_order() {
    let team = team(&[5, 20]);
    let defeated = [Opponent {
        level: 30,
        rank: OpponentRank::Normal,
    }];
    let mut seed = 5;

    let result = distribute_xp(&team, &defeated, 1, XpShareMode::Equal, 0.0, &mut seed);

    // Only the level 5 member crosses a threshold with this share.
    assert_eq!(result.level_ups.len(), 1);
    let event = &result.level_ups[0];
    assert_eq!(event.member, 0);
    assert_eq!(event.from_level, 5);
    assert!(event.to_level > 5);
    assert_eq!(
        event.stat_gains,
        stat_gains(&base(), u32::from(event.to_level - 5))
    );
    assert!(result.members[1].outcome.record.xp > xp_for_level(20));
}

#[test]
fn test_certain_move_learn_lists_leveled_members() {
    let team = team(&[5, 5]);
    let defeated = [Opponent {
        level: 40,
        rank: OpponentRank::Boss,
    }];
    let mut seed = 99;

    let result = distribute_xp(&team, &defeated, 1, XpShareMode::Equal, 1.0, &mut seed);

    assert_eq!(result.pending_move_learn, vec![0, 1]);
}

#[test]
fn test_empty_inputs() {
    let mut seed = 1;
    let nobody = distribute_xp(&[], &wave(), 1, XpShareMode::Equal, 0.5, &mut seed);
    assert_eq!(nobody.total_xp, 0);
    assert!(nobody.members.is_empty());

    let nothing = distribute_xp(&team(&[5]), &[], 1, XpShareMode::Equal, 0.5, &mut seed);
    assert_eq!(nothing.total_xp, 0);
    assert_eq!(nothing.members[0].xp_gained, 0);
    assert!(nothing.level_ups.is_empty());
    assert_eq!(seed, 1);
}

#[test]
fn test_reward_grows_with_rank_and_floor() {
    let normal = Opponent {
        level: 10,
        rank: OpponentRank::Normal,
    };
    let boss = Opponent {
        level: 10,
        rank: OpponentRank::Boss,
    };
    assert!(xp_reward(&boss, 10.0, 5) > xp_reward(&normal, 10.0, 5));
    assert!(xp_reward(&normal, 10.0, 20) > xp_reward(&normal, 10.0, 1));
    // A lower-level team earns more from the same opponent.
    assert!(xp_reward(&normal, 8.0, 1) > xp_reward(&normal, 12.0, 1));
}

fn opponent(level: u8, rank: OpponentRank) -> Opponent {
    Opponent { level, rank }
}

#[test]
fn test_reward_level_difference_values() {
    // Stronger opponent: +10% per level above the team.
    assert_eq!(xp_reward(&opponent(12, OpponentRank::Normal), 10.0, 0), 72);
    // Weaker opponent: -5% per level below.
    assert_eq!(xp_reward(&opponent(8, OpponentRank::Normal), 10.0, 0), 36);
    // Far below the team the multiplier bottoms out at 0.1.
    assert_eq!(xp_reward(&opponent(10, OpponentRank::Normal), 40.0, 0), 5);
    // Level bonus and floor bonus compose: floor(35 * 1.4 * 1.14).
    assert_eq!(xp_reward(&opponent(7, OpponentRank::Normal), 3.0, 7), 55);
}

#[test]
fn test_reward_rank_multipliers() {
    assert_eq!(xp_reward(&opponent(10, OpponentRank::Normal), 10.0, 0), 50);
    assert_eq!(xp_reward(&opponent(10, OpponentRank::Elite), 10.0, 0), 100);
    assert_eq!(xp_reward(&opponent(10, OpponentRank::Boss), 10.0, 0), 150);
}

#[test]
fn test_mean_level() {
    assert_eq!(mean_level(&team(&[4, 6, 8])), 6.0);
    assert_eq!(mean_level(&[]), 0.0);
}
