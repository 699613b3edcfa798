//! Battle tower TUI
//!
//! A keyboard navigation engine for menus and grids, and the XP progression
//! rules for a roster climbing a tower of enemy waves, wired together with
//! tui-dispatch.

pub mod action;
pub mod config;
pub mod effect;
pub mod input;
pub mod nav;
pub mod persist;
pub mod progression;
pub mod reducer;
pub mod state;
pub mod ui;
