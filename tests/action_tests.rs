//! Action categories and emitted-action assertions.

use battletower::{
    action::Action,
    nav::{NavDirection, NavInput},
};
use tui_dispatch::testing::*;
use tui_dispatch::{assert_emitted, assert_not_emitted};

#[test]
fn test_action_categories() {
    let nav = Action::NavKey(NavInput::Move(NavDirection::Down));
    let did_save = Action::RunDidSave;
    let resize = Action::UiTerminalResize(80, 24);

    assert_eq!(did_save.category(), Some("run_did"));
    assert_eq!(resize.category(), Some("ui"));
    // Navigator input carries no verb, so it stays uncategorized.
    assert_eq!(nav.category(), None);
    assert_eq!(Action::NavPoint(2).category(), None);
    assert_eq!(Action::Quit.category(), None);

    assert!(did_save.is_run_did());
}

#[test]
fn test_emitted_io_results() {
    let mut harness = TestHarness::<(), Action>::new(());

    harness.emit(Action::RunSave);
    harness.emit(Action::RunDidError("disk full".into()));

    let actions = harness.drain_emitted();
    actions.assert_count(2);
    assert_emitted!(actions, Action::RunDidError(_));
    assert_not_emitted!(actions, Action::RunDidSave);
}
