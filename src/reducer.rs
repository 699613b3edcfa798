use std::path::Path;

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::nav::NavOutcome;
use crate::progression::{distribute_xp, Distribution, OpponentRank};
use crate::state::{
    format_name, is_boss_floor, AppState, BattleOutcome, BattleReport, Command, Foe, ItemKind,
    Screen, COMMANDS,
};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.message = state.wave_intro();
            DispatchResult::changed()
        }
        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::NavKey(input) => {
            let before = state.nav.clone();
            let outcomes = state.nav.handle_input(&input);
            let mut changed = state.nav != before;
            for outcome in outcomes {
                changed |= apply_outcome(state, outcome);
            }
            if changed {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::NavPoint(index) => {
            if state.nav.point_at(index) {
                if state.screen == Screen::Command {
                    state.command_index = index;
                }
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::RunSave => {
            if state.busy {
                return DispatchResult::unchanged();
            }
            state.set_busy(true);
            state.message = "Saving...".to_string();
            DispatchResult::changed_with(Effect::SaveRun {
                path: state.save_path.clone(),
                snapshot: Box::new(state.snapshot()),
            })
        }
        Action::RunLoad => {
            if state.busy {
                return DispatchResult::unchanged();
            }
            state.set_busy(true);
            state.message = "Loading...".to_string();
            DispatchResult::changed_with(Effect::LoadRun {
                path: state.save_path.clone(),
            })
        }
        Action::RunDidSave => {
            state.set_busy(false);
            state.message = format!("Run saved to {}.", display_path(&state.save_path));
            DispatchResult::changed()
        }
        Action::RunDidLoad(snapshot) => {
            state.set_busy(false);
            state.restore(*snapshot);
            state.message = format!("Run loaded! {}", state.wave_intro());
            DispatchResult::changed()
        }
        Action::RunDidError(error) => {
            state.set_busy(false);
            state.message = error;
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn apply_outcome(state: &mut AppState, outcome: NavOutcome) -> bool {
    match outcome {
        NavOutcome::Changed(index) => {
            if state.screen == Screen::Command {
                state.command_index = index;
            }
            true
        }
        NavOutcome::Selected(index) => activate(state, index),
        NavOutcome::Cancelled => match state.screen {
            Screen::Command => false,
            Screen::Bag | Screen::Team => {
                state.enter_screen(Screen::Command);
                state.message = format!("What will {} do?", state.lead_name());
                true
            }
            Screen::Results => continue_climb(state),
        },
    }
}

fn activate(state: &mut AppState, index: usize) -> bool {
    match state.screen {
        Screen::Command => match COMMANDS.get(index) {
            Some(Command::Fight) => fight(state),
            Some(Command::Bag) => {
                state.enter_screen(Screen::Bag);
                state.message = "Use which item?".to_string();
                true
            }
            Some(Command::Team) => {
                state.enter_screen(Screen::Team);
                state.message = "Send out which member?".to_string();
                true
            }
            Some(Command::Run) => run_away(state),
            None => false,
        },
        Screen::Bag => use_item(state, index),
        Screen::Team => switch_lead(state, index),
        Screen::Results => continue_climb(state),
    }
}

/// Damage the lead takes for clearing a wave.
pub fn wave_damage(wave: &[Foe]) -> u32 {
    let raw: u32 = wave
        .iter()
        .map(|foe| {
            let factor = match foe.opponent.rank {
                OpponentRank::Normal => 1,
                OpponentRank::Elite => 2,
                OpponentRank::Boss => 3,
            };
            u32::from(foe.opponent.level) * factor
        })
        .sum();
    raw.div_ceil(2).max(1)
}

fn fight(state: &mut AppState) -> bool {
    let damage = wave_damage(&state.wave);
    let lead_name = state.lead_name();
    let dealt = match state.lead_member_mut() {
        Some(member) => member.record.current_stats.take_damage(damage),
        None => return false,
    };

    let outcome = if state.all_fainted() {
        BattleOutcome::Defeat
    } else {
        BattleOutcome::Victory
    };

    let distribution = match outcome {
        BattleOutcome::Defeat => Distribution::default(),
        BattleOutcome::Victory => {
            let team = state.team_records();
            let defeated = state.opponents();
            let distribution = distribute_xp(
                &team,
                &defeated,
                state.floor,
                state.config.xp_mode,
                state.config.move_learn_chance,
                &mut state.rng_seed,
            );
            for member in &distribution.members {
                if let Some(slot) = state.roster.get_mut(member.index) {
                    slot.record = member.outcome.record.clone();
                    if member.outcome.pending_move_learn {
                        slot.pending_moves = slot.pending_moves.saturating_add(1);
                    }
                }
            }
            distribution
        }
    };

    let lead_fainted = state
        .lead_member()
        .map_or(true, |member| member.record.is_fainted());
    if lead_fainted {
        if let Some(next) = state.first_standing() {
            state.lead = next;
        }
    }

    state.message = match outcome {
        BattleOutcome::Victory => {
            let mut message = format!(
                "Floor {} cleared! {} took {} damage. The team earned {} XP.",
                state.floor, lead_name, dealt, distribution.total_xp
            );
            for event in &distribution.level_ups {
                if let Some(member) = state.roster.get(event.member) {
                    message.push_str(&format!(
                        " {} grew to Lv{}!",
                        format_name(&member.name),
                        event.to_level
                    ));
                }
            }
            message
        }
        BattleOutcome::Defeat => format!(
            "{} fainted on floor {}. The whole team is down.",
            lead_name, state.floor
        ),
    };
    state.report = Some(BattleReport {
        floor: state.floor,
        outcome,
        damage_taken: dealt,
        distribution,
    });
    state.enter_screen(Screen::Results);
    true
}

fn run_away(state: &mut AppState) -> bool {
    if is_boss_floor(state.floor) {
        state.message = "There is no escape from a guardian!".to_string();
        return true;
    }
    state.generate_wave();
    state.message = format!("Got away safely! {}", state.wave_intro());
    state.refresh_navigator();
    true
}

fn use_item(state: &mut AppState, index: usize) -> bool {
    let Some(kind) = state.inventory.get(index).map(|stack| stack.kind) else {
        return false;
    };
    let Some(target) = state.item_target(kind) else {
        return false;
    };
    let Some(member) = state.roster.get_mut(target) else {
        return false;
    };

    let name = format_name(&member.name);
    let stats = &mut member.record.current_stats;
    let healed = stats.heal(kind.heal_amount(stats.hp_max));
    state.message = match kind {
        ItemKind::Revive => format!("{} was revived with {} HP!", name, healed),
        ItemKind::Potion | ItemKind::SuperPotion => {
            format!("{} recovered {} HP.", name, healed)
        }
    };
    if let Some(stack) = state.inventory.get_mut(index) {
        stack.qty = stack.qty.saturating_sub(1);
    }
    state.refresh_navigator();
    true
}

fn switch_lead(state: &mut AppState, index: usize) -> bool {
    let Some(member) = state.roster.get(index) else {
        return false;
    };
    let name = format_name(&member.name);
    state.message = if index == state.lead {
        format!("{} is already in front!", name)
    } else {
        state.lead = index;
        format!("Go, {}!", name)
    };
    state.enter_screen(Screen::Command);
    true
}

fn continue_climb(state: &mut AppState) -> bool {
    let defeated = matches!(
        state.report.as_ref().map(|report| report.outcome),
        Some(BattleOutcome::Defeat)
    );
    if defeated {
        state.reset_run();
        state.message = format!("A new climb begins. {}", state.wave_intro());
        return true;
    }
    state.floor = state.floor.saturating_add(1);
    state.report = None;
    state.generate_wave();
    state.enter_screen(Screen::Command);
    state.message = state.wave_intro();
    true
}

fn display_path(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Opponent;

    fn foe(level: u8, rank: OpponentRank) -> Foe {
        Foe {
            name: "zubat".into(),
            opponent: Opponent { level, rank },
        }
    }

    #[test]
    fn wave_damage_scales_with_rank() {
        assert_eq!(wave_damage(&[foe(4, OpponentRank::Normal)]), 2);
        assert_eq!(wave_damage(&[foe(5, OpponentRank::Normal)]), 3);
        assert_eq!(wave_damage(&[foe(15, OpponentRank::Boss)]), 23);
        assert_eq!(
            wave_damage(&[foe(6, OpponentRank::Elite), foe(5, OpponentRank::Normal)]),
            9
        );
        assert_eq!(wave_damage(&[]), 1);
    }
}
