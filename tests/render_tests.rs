//! Render tests using RenderHarness, plus pointer hit testing against the
//! same layout.

use battletower::{
    config::TowerConfig,
    nav::FocusSource,
    progression::{ProgressionRecord, MAX_LEVEL},
    state::{AppState, Screen},
    ui::{self, item_at, screen_layout},
};
use ratatui::layout::Rect;
use tui_dispatch::testing::*;

const WIDTH: u16 = 100;
const HEIGHT: u16 = 30;

fn fresh_state() -> AppState {
    let mut state = AppState::new(TowerConfig::default(), 1, String::new(), 42);
    state.terminal_size = (WIDTH, HEIGHT);
    state
}

fn render(state: &AppState) -> String {
    let mut render = RenderHarness::new(WIDTH, HEIGHT);
    render.render_to_string_plain(|frame| {
        ui::render_screen(frame, frame.area(), state);
    })
}

#[test]
fn test_render_command_screen() {
    let output = render(&fresh_state());

    assert!(output.contains("BATTLE TOWER"), "header:\n{}", output);
    assert!(output.contains("Floor 1"), "floor:\n{}", output);
    for label in ["FIGHT", "BAG", "TEAM", "RUN"] {
        assert!(output.contains(label), "missing {label}:\n{output}");
    }
    assert!(output.contains("Pikachu Lv5"), "lead panel:\n{}", output);
    assert!(output.contains("Keyboard"), "focus status:\n{}", output);
}

#[test]
fn test_render_boss_floor() {
    let mut state = AppState::new(TowerConfig::default(), 10, String::new(), 42);
    state.terminal_size = (WIDTH, HEIGHT);
    let output = render(&state);

    assert!(output.contains("GUARDIAN FLOOR"), "{}", output);
    assert!(output.contains("[Boss]"), "{}", output);
}

#[test]
fn test_render_team_list() {
    let mut state = fresh_state();
    state.roster[2].record.current_stats.hp = 0;
    state.enter_screen(Screen::Team);
    let output = render(&state);

    assert!(output.contains("TEAM"), "{}", output);
    assert!(output.contains("Bulbasaur"), "{}", output);
    assert!(output.contains("[lead]"), "{}", output);
    assert!(output.contains("HP 0/"), "fainted row:\n{}", output);
}

#[test]
fn test_render_max_level_lead() {
    let mut state = fresh_state();
    let base = state.roster[0].record.base_stats;
    state.roster[0].record = ProgressionRecord::new(MAX_LEVEL, base);
    let output = render(&state);
    assert!(output.contains("XP MAX"), "{}", output);
}

#[test]
fn test_render_pointer_status() {
    let mut state = fresh_state();
    assert!(state.nav.point_at(2));
    assert_eq!(state.nav.focus_source(), FocusSource::Pointer);
    let output = render(&state);
    assert!(output.contains("Pointer"), "{}", output);
}

#[test]
fn test_pointer_hits_command_cells() {
    let state = fresh_state();
    let area = Rect::new(0, 0, WIDTH, HEIGHT);
    let menu = screen_layout(area, Screen::Command).menu;
    let left = menu.x + 1;
    let right = menu.x + menu.width - 2;
    let top = menu.y + 1;

    assert_eq!(item_at(&state, area, left, top), Some(0));
    assert_eq!(item_at(&state, area, right, top), Some(1));
    assert_eq!(item_at(&state, area, left, top + 2), Some(2));
    assert_eq!(item_at(&state, area, right, top + 2), Some(3));
    // Spacer line between grid rows and the panel border.
    assert_eq!(item_at(&state, area, left, top + 1), None);
    assert_eq!(item_at(&state, area, menu.x, top), None);
}

#[test]
fn test_pointer_hits_list_rows() {
    let mut state = fresh_state();
    state.enter_screen(Screen::Team);
    let area = Rect::new(0, 0, WIDTH, HEIGHT);
    let menu = screen_layout(area, Screen::Team).menu;

    assert_eq!(item_at(&state, area, menu.x + 2, menu.y + 1), Some(0));
    assert_eq!(item_at(&state, area, menu.x + 2, menu.y + 3), Some(2));
    // Below the last member.
    assert_eq!(item_at(&state, area, menu.x + 2, menu.y + 4), None);
}
