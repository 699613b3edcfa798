use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::nav::NavInput;
use crate::persist::RunSnapshot;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    Init,
    UiTerminalResize(u16, u16),

    // Input for the mounted navigator
    NavKey(NavInput),
    /// Pointer over an item of the active surface.
    NavPoint(usize),

    // Save/Load
    RunSave,
    RunLoad,
    RunDidSave,
    RunDidLoad(Box<RunSnapshot>),
    RunDidError(String),

    Quit,
}
