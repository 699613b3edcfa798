//! Selection cursor over a list or grid of selectable items.
//!
//! A [`Navigator`] never looks at the items themselves. Callers hand it the
//! item slice together with a disabled predicate and it keeps a mask; every
//! transition is reported back as a [`NavOutcome`] message for the reducer to
//! interpret.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

impl NavDirection {
    /// Linear step used when skipping disabled items.
    fn step(self) -> isize {
        match self {
            NavDirection::Up | NavDirection::Left | NavDirection::End => -1,
            NavDirection::Down | NavDirection::Right | NavDirection::Home => 1,
        }
    }
}

/// What drove the last cursor change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FocusSource {
    #[default]
    Keyboard,
    Pointer,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum NavLayout {
    #[default]
    List,
    Grid {
        columns: usize,
    },
}

/// One decoded key press, independent of the terminal backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum NavInput {
    Move(NavDirection),
    Confirm,
    Cancel,
    /// Digit key `1..=9`, main row or keypad.
    Digit(u8),
    /// Any other printable key, by label.
    Key(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum NavOutcome {
    Changed(usize),
    Selected(usize),
    Cancelled,
}

impl NavOutcome {
    pub fn index(self) -> Option<usize> {
        match self {
            NavOutcome::Changed(index) | NavOutcome::Selected(index) => Some(index),
            NavOutcome::Cancelled => None,
        }
    }

    pub fn item<T>(self, items: &[T]) -> Option<&T> {
        self.index().and_then(|index| items.get(index))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NavOptions {
    pub enabled: bool,
    pub layout: NavLayout,
    pub initial_index: usize,
    /// Moving past an edge wraps to the opposite edge.
    pub wrap: bool,
    /// Digits 1-9 select and confirm item `digit - 1`.
    pub number_keys: bool,
    /// Key label to item index; selects and confirms on match.
    pub custom_keys: BTreeMap<String, usize>,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            layout: NavLayout::List,
            initial_index: 0,
            wrap: true,
            number_keys: false,
            custom_keys: BTreeMap::new(),
        }
    }
}

impl NavOptions {
    pub fn list() -> Self {
        Self::default()
    }

    pub fn grid(columns: usize) -> Self {
        Self {
            layout: NavLayout::Grid { columns },
            ..Self::default()
        }
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_number_keys(mut self, number_keys: bool) -> Self {
        self.number_keys = number_keys;
        self
    }

    pub fn with_initial_index(mut self, index: usize) -> Self {
        self.initial_index = index;
        self
    }

    pub fn with_custom_keys(mut self, keys: BTreeMap<String, usize>) -> Self {
        self.custom_keys = keys;
        self
    }

    pub fn with_custom_key(mut self, label: impl Into<String>, index: usize) -> Self {
        self.custom_keys.insert(label.into(), index);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("grid layout needs at least one column")]
    ZeroColumns,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Navigator {
    options: NavOptions,
    disabled: Vec<bool>,
    cursor: Option<usize>,
    focus: FocusSource,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            options: NavOptions::default(),
            disabled: Vec::new(),
            cursor: None,
            focus: FocusSource::Keyboard,
        }
    }
}

impl Navigator {
    pub fn new<T>(
        options: NavOptions,
        items: &[T],
        is_disabled: impl Fn(&T, usize) -> bool,
    ) -> Result<Self, NavError> {
        if options.layout == (NavLayout::Grid { columns: 0 }) {
            return Err(NavError::ZeroColumns);
        }
        let mut nav = Self {
            options,
            disabled: disabled_mask(items, is_disabled),
            cursor: None,
            focus: FocusSource::Keyboard,
        };
        if !nav.disabled.is_empty() {
            let start = nav.options.initial_index.min(nav.disabled.len() - 1);
            nav.cursor = nav.first_enabled_from(start);
        }
        Ok(nav)
    }

    /// Navigator over items that are never disabled.
    pub fn with_items<T>(options: NavOptions, items: &[T]) -> Result<Self, NavError> {
        Self::new(options, items, |_, _| false)
    }

    /// Replace the item list and re-validate the cursor.
    pub fn set_items<T>(&mut self, items: &[T], is_disabled: impl Fn(&T, usize) -> bool) {
        self.disabled = disabled_mask(items, is_disabled);
        let len = self.disabled.len();
        if len == 0 {
            self.cursor = None;
            return;
        }
        let index = self.cursor.unwrap_or(0).min(len - 1);
        self.cursor = if self.disabled[index] {
            (0..len).find(|&i| !self.disabled[i])
        } else {
            Some(index)
        };
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn options(&self) -> &NavOptions {
        &self.options
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn focus_source(&self) -> FocusSource {
        self.focus
    }

    /// Presentation hint: draw a focus ring only for keyboard-driven selection.
    pub fn shows_focus_ring(&self) -> bool {
        self.options.enabled && self.cursor.is_some() && self.focus == FocusSource::Keyboard
    }

    pub fn len(&self) -> usize {
        self.disabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disabled.is_empty()
    }

    pub fn is_disabled(&self, index: usize) -> bool {
        self.disabled.get(index).copied().unwrap_or(true)
    }

    pub fn columns(&self) -> usize {
        match self.options.layout {
            NavLayout::List => 1,
            NavLayout::Grid { columns } => columns,
        }
    }

    /// `(row, column)` of an index under the current layout.
    pub fn position(&self, index: usize) -> (usize, usize) {
        let columns = self.columns();
        (index / columns, index % columns)
    }

    /// Inverse of [`Navigator::position`]; `None` outside the items.
    pub fn index_at(&self, row: usize, column: usize) -> Option<usize> {
        let columns = self.columns();
        if column >= columns {
            return None;
        }
        let index = row * columns + column;
        (index < self.len()).then_some(index)
    }

    pub fn navigate(&mut self, direction: NavDirection) -> Option<NavOutcome> {
        if !self.options.enabled {
            return None;
        }
        let current = self.cursor?;
        // Any keyboard move attempt hands focus back to the keyboard, even
        // when the cursor stays put.
        self.focus = FocusSource::Keyboard;
        let raw = self.raw_target(current, direction)?;
        let target = self.resolve_enabled(raw, direction.step())?;
        if target == current {
            return None;
        }
        Some(self.move_to(target))
    }

    pub fn confirm(&self) -> Option<NavOutcome> {
        if !self.options.enabled {
            return None;
        }
        let index = self.cursor?;
        (!self.is_disabled(index)).then_some(NavOutcome::Selected(index))
    }

    pub fn cancel(&self) -> Option<NavOutcome> {
        self.options.enabled.then_some(NavOutcome::Cancelled)
    }

    pub fn select_by_index(&mut self, index: usize) -> Option<NavOutcome> {
        if !self.options.enabled || self.is_disabled(index) {
            return None;
        }
        Some(self.move_to(index))
    }

    /// Pointer hover/press. Moves the cursor without producing an outcome.
    pub fn point_at(&mut self, index: usize) -> bool {
        if !self.options.enabled || self.is_disabled(index) {
            return false;
        }
        let changed = self.cursor != Some(index) || self.focus != FocusSource::Pointer;
        self.cursor = Some(index);
        self.focus = FocusSource::Pointer;
        changed
    }

    /// Apply one key press. Direct selection yields `[Changed, Selected]`.
    pub fn handle_input(&mut self, input: &NavInput) -> Vec<NavOutcome> {
        if !self.options.enabled {
            return Vec::new();
        }
        match input {
            NavInput::Move(direction) => self.navigate(*direction).into_iter().collect(),
            NavInput::Confirm => self.confirm().into_iter().collect(),
            NavInput::Cancel => self.cancel().into_iter().collect(),
            NavInput::Digit(digit) if self.options.number_keys => match digit.checked_sub(1) {
                Some(index) => self.direct_select(usize::from(index)),
                None => Vec::new(),
            },
            NavInput::Digit(digit) => self.custom_select(&digit.to_string()),
            NavInput::Key(label) => self.custom_select(label),
        }
    }

    fn custom_select(&mut self, label: &str) -> Vec<NavOutcome> {
        match self.options.custom_keys.get(label).copied() {
            Some(index) => self.direct_select(index),
            None => Vec::new(),
        }
    }

    fn direct_select(&mut self, index: usize) -> Vec<NavOutcome> {
        match self.select_by_index(index) {
            Some(changed) => vec![changed, NavOutcome::Selected(index)],
            None => Vec::new(),
        }
    }

    fn move_to(&mut self, index: usize) -> NavOutcome {
        self.cursor = Some(index);
        self.focus = FocusSource::Keyboard;
        NavOutcome::Changed(index)
    }

    fn raw_target(&self, current: usize, direction: NavDirection) -> Option<usize> {
        let last = self.disabled.len().checked_sub(1)?;
        let wrap = self.options.wrap;
        match direction {
            NavDirection::Home => return Some(0),
            NavDirection::End => return Some(last),
            _ => {}
        }
        match self.options.layout {
            NavLayout::List => match direction {
                NavDirection::Up | NavDirection::Left => {
                    if current > 0 {
                        Some(current - 1)
                    } else {
                        wrap.then_some(last)
                    }
                }
                _ => {
                    if current < last {
                        Some(current + 1)
                    } else {
                        wrap.then_some(0)
                    }
                }
            },
            NavLayout::Grid { columns } => {
                let row = current / columns;
                let col = current % columns;
                let rows = self.disabled.len().div_ceil(columns);
                match direction {
                    NavDirection::Left => {
                        if col > 0 {
                            Some(current - 1)
                        } else {
                            wrap.then(|| (row * columns + columns - 1).min(last))
                        }
                    }
                    NavDirection::Right => {
                        if col + 1 < columns && current < last {
                            Some(current + 1)
                        } else {
                            wrap.then_some(row * columns)
                        }
                    }
                    NavDirection::Up => {
                        if row > 0 {
                            Some(current - columns)
                        } else {
                            wrap.then(|| ((rows - 1) * columns + col).min(last))
                        }
                    }
                    _ => {
                        if row + 1 < rows {
                            Some((current + columns).min(last))
                        } else {
                            wrap.then_some(col)
                        }
                    }
                }
            }
        }
    }

    fn resolve_enabled(&self, start: usize, step: isize) -> Option<usize> {
        let mut index = start;
        for _ in 0..self.disabled.len() {
            if !self.disabled[index] {
                return Some(index);
            }
            index = self.step_index(index, step)?;
        }
        None
    }

    fn step_index(&self, index: usize, step: isize) -> Option<usize> {
        let last = self.disabled.len().checked_sub(1)?;
        if step < 0 {
            if index == 0 {
                self.options.wrap.then_some(last)
            } else {
                Some(index - 1)
            }
        } else if index >= last {
            self.options.wrap.then_some(0)
        } else {
            Some(index + 1)
        }
    }

    fn first_enabled_from(&self, start: usize) -> Option<usize> {
        let len = self.disabled.len();
        (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&index| !self.disabled[index])
    }
}

fn disabled_mask<T>(items: &[T], is_disabled: impl Fn(&T, usize) -> bool) -> Vec<bool> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| is_disabled(item, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(len: usize) -> Navigator {
        Navigator::with_items(NavOptions::list(), &vec![(); len]).unwrap()
    }

    #[test]
    fn zero_columns_fail_fast() {
        let result = Navigator::with_items(NavOptions::grid(0), &[1, 2, 3]);
        assert_eq!(result.unwrap_err(), NavError::ZeroColumns);
    }

    #[test]
    fn empty_list_has_no_cursor() {
        let mut nav = list(0);
        assert_eq!(nav.cursor(), None);
        assert_eq!(nav.navigate(NavDirection::Down), None);
        assert_eq!(nav.confirm(), None);
        assert_eq!(nav.select_by_index(0), None);
        assert_eq!(nav.cancel(), Some(NavOutcome::Cancelled));
    }

    #[test]
    fn initial_index_is_clamped_and_skips_disabled() {
        let items = [0, 1, 2, 3];
        let nav = Navigator::new(NavOptions::list().with_initial_index(10), &items, |_, i| {
            i == 3
        })
        .unwrap();
        assert_eq!(nav.cursor(), Some(0));

        let nav = Navigator::new(NavOptions::list().with_initial_index(1), &items, |_, i| {
            i == 1
        })
        .unwrap();
        assert_eq!(nav.cursor(), Some(2));
    }

    #[test]
    fn list_wraps_and_clamps() {
        let mut nav = list(3);
        assert_eq!(nav.navigate(NavDirection::Up), Some(NavOutcome::Changed(2)));
        assert_eq!(nav.navigate(NavDirection::Down), Some(NavOutcome::Changed(0)));

        let mut nav = Navigator::with_items(NavOptions::list().with_wrap(false), &[(); 3]).unwrap();
        assert_eq!(nav.navigate(NavDirection::Up), None);
        assert_eq!(nav.cursor(), Some(0));
        assert_eq!(nav.navigate(NavDirection::End), Some(NavOutcome::Changed(2)));
        assert_eq!(nav.navigate(NavDirection::Down), None);
    }

    #[test]
    fn disabled_items_are_skipped_in_direction_of_travel() {
        let items = ["a", "b", "c", "d"];
        let mut nav = Navigator::new(NavOptions::list(), &items, |item, _| *item == "b").unwrap();
        assert_eq!(nav.navigate(NavDirection::Down), Some(NavOutcome::Changed(2)));
        assert_eq!(nav.navigate(NavDirection::Up), Some(NavOutcome::Changed(0)));
    }

    #[test]
    fn no_enabled_target_means_no_move() {
        let items = [false, true, true];
        let mut nav = Navigator::new(NavOptions::list(), &items, |d, _| *d).unwrap();
        assert_eq!(nav.navigate(NavDirection::Down), None);
        assert_eq!(nav.navigate(NavDirection::Up), None);
        assert_eq!(nav.cursor(), Some(0));
    }

    #[test]
    fn home_and_end_ignore_wrap() {
        let items = [true, false, false, true];
        let mut nav = Navigator::new(
            NavOptions::list().with_wrap(false).with_initial_index(1),
            &items,
            |d, _| *d,
        )
        .unwrap();
        assert_eq!(nav.navigate(NavDirection::End), Some(NavOutcome::Changed(2)));
        assert_eq!(nav.navigate(NavDirection::Home), Some(NavOutcome::Changed(1)));
    }

    #[test]
    fn pointer_moves_without_outcome() {
        let mut nav = list(4);
        assert!(nav.point_at(2));
        assert_eq!(nav.cursor(), Some(2));
        assert_eq!(nav.focus_source(), FocusSource::Pointer);
        assert!(!nav.shows_focus_ring());

        nav.navigate(NavDirection::Down);
        assert_eq!(nav.focus_source(), FocusSource::Keyboard);
        assert!(nav.shows_focus_ring());
    }

    #[test]
    fn disabled_navigator_ignores_everything() {
        let mut nav = list(3);
        nav.set_enabled(false);
        assert!(nav.handle_input(&NavInput::Move(NavDirection::Down)).is_empty());
        assert!(nav.handle_input(&NavInput::Cancel).is_empty());
        assert!(!nav.point_at(1));
        assert_eq!(nav.cursor(), Some(0));
    }

    #[test]
    fn number_keys_take_precedence_over_custom_keys() {
        let options = NavOptions::list()
            .with_number_keys(true)
            .with_custom_key("1", 2)
            .with_custom_key("x", 1);
        let mut nav = Navigator::with_items(options, &[(); 3]).unwrap();
        assert_eq!(
            nav.handle_input(&NavInput::Digit(1)),
            vec![NavOutcome::Changed(0), NavOutcome::Selected(0)]
        );
        assert_eq!(
            nav.handle_input(&NavInput::Key("x".into())),
            vec![NavOutcome::Changed(1), NavOutcome::Selected(1)]
        );
    }

    #[test]
    fn digit_falls_back_to_custom_keys_when_number_keys_off() {
        let options = NavOptions::list().with_custom_key("1", 2);
        let mut nav = Navigator::with_items(options, &[(); 3]).unwrap();
        assert_eq!(
            nav.handle_input(&NavInput::Digit(1)),
            vec![NavOutcome::Changed(2), NavOutcome::Selected(2)]
        );
        assert!(nav.handle_input(&NavInput::Digit(2)).is_empty());
    }

    #[test]
    fn set_items_clamps_and_revalidates() {
        let mut nav = Navigator::with_items(NavOptions::list().with_initial_index(4), &[0; 5]).unwrap();
        assert_eq!(nav.cursor(), Some(4));

        nav.set_items(&[0, 1, 2], |_, _| false);
        assert_eq!(nav.cursor(), Some(2));

        nav.set_items(&[0, 1, 2], |_, i| i != 1);
        assert_eq!(nav.cursor(), Some(1));

        let empty: [u8; 0] = [];
        nav.set_items(&empty, |_, _| false);
        assert_eq!(nav.cursor(), None);
    }

    #[test]
    fn outcome_resolves_item() {
        let items = ["fight", "bag"];
        assert_eq!(NavOutcome::Selected(1).item(&items), Some(&"bag"));
        assert_eq!(NavOutcome::Cancelled.item(&items), None);
    }
}
