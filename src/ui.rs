use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{block::Title, Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventKind, EventOutcome, RenderContext};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use crate::action::Action;
use crate::input::{self, Shortcut};
use crate::nav::FocusSource;
use crate::progression::{OpponentRank, MAX_LEVEL};
use crate::state::{
    format_name, is_boss_floor, is_elite_floor, AppState, BattleOutcome, Screen, COMMANDS,
};

const BG_BASE: Color = Color::Rgb(22, 24, 36);
const BG_PANEL: Color = Color::Rgb(34, 38, 58);
const BG_PANEL_ALT: Color = Color::Rgb(28, 32, 48);
const TEXT_MAIN: Color = Color::Rgb(230, 232, 240);
const TEXT_DIM: Color = Color::Rgb(150, 156, 178);
const TEXT_DISABLED: Color = Color::Rgb(86, 90, 110);
const ACCENT_BLUE: Color = Color::Rgb(110, 160, 236);
const ACCENT_GOLD: Color = Color::Rgb(232, 196, 110);
const ACCENT_RED: Color = Color::Rgb(220, 96, 96);
const HIGHLIGHT_BG: Color = ACCENT_BLUE;
const HIGHLIGHT_TEXT: Color = Color::Rgb(16, 18, 28);
const BORDER_ACCENT: Color = Color::Rgb(82, 90, 124);

const HEADER_HEIGHT: u16 = 3;
const WAVE_HEIGHT: u16 = 5;
const MESSAGE_HEIGHT: u16 = 4;
const FOOTER_HEIGHT: u16 = 3;

/// Panels of a frame; shared by rendering and pointer hit tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub wave: Rect,
    pub side: Option<Rect>,
    pub menu: Rect,
    pub message: Rect,
    pub footer: Rect,
}

pub fn screen_layout(area: Rect, screen: Screen) -> ScreenLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(WAVE_HEIGHT),
            Constraint::Min(4),
            Constraint::Length(MESSAGE_HEIGHT),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);

    let (side, menu) = if screen == Screen::Command {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[2]);
        (Some(cols[0]), cols[1])
    } else {
        (None, rows[2])
    };

    ScreenLayout {
        header: rows[0],
        wave: rows[1],
        side,
        menu,
        message: rows[3],
        footer: rows[4],
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, _ctx: RenderContext) {
    render_screen(frame, area, state);
}

pub fn render_screen(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
    let layout = screen_layout(area, state.active_surface());

    render_header(frame, layout.header, state);
    render_wave(frame, layout.wave, state);
    if let Some(side) = layout.side {
        render_lead(frame, side, state);
    }
    match state.active_surface() {
        Screen::Command => render_commands(frame, layout.menu, state),
        Screen::Bag | Screen::Team | Screen::Results => {
            render_list(frame, layout.menu, state)
        }
    }
    render_message(frame, layout.message, state);
    render_footer(frame, layout.footer, state);
}

pub fn handle_event(event: &EventKind, state: &AppState) -> EventOutcome<Action> {
    match event {
        EventKind::Resize(width, height) => {
            EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) => handle_key(*key),
        EventKind::Mouse(mouse) => handle_mouse(*mouse, state),
        _ => EventOutcome::ignored(),
    }
}

fn handle_key(key: KeyEvent) -> EventOutcome<Action> {
    if let Some(shortcut) = input::shortcut(&key) {
        let action = match shortcut {
            Shortcut::Save => Action::RunSave,
            Shortcut::Load => Action::RunLoad,
            Shortcut::Quit => Action::Quit,
        };
        return EventOutcome::action(action);
    }
    EventOutcome::from(input::nav_input(&key).map(Action::NavKey))
}

fn handle_mouse(mouse: MouseEvent, state: &AppState) -> EventOutcome<Action> {
    let Some((column, row)) = input::pointer_position(&mouse) else {
        return EventOutcome::ignored();
    };
    let (width, height) = state.terminal_size;
    let area = Rect::new(0, 0, width, height);
    EventOutcome::from(item_at(state, area, column, row).map(Action::NavPoint))
}

/// Index of the active surface's item under a terminal cell.
pub fn item_at(state: &AppState, area: Rect, column: u16, row: u16) -> Option<usize> {
    let layout = screen_layout(area, state.active_surface());
    let inner = panel_block("", BG_PANEL).inner(layout.menu);
    if column < inner.x
        || column >= inner.x + inner.width
        || row < inner.y
        || row >= inner.y + inner.height
    {
        return None;
    }

    let line = usize::from(row - inner.y);
    match state.active_surface() {
        Screen::Command => {
            // Grid rows are drawn with a spacer line between them.
            if line % 2 == 1 {
                return None;
            }
            let columns = state.nav.columns();
            let cell_width = (inner.width / columns as u16).max(1);
            let col = usize::from((column - inner.x) / cell_width).min(columns - 1);
            state.nav.index_at(line / 2, col)
        }
        Screen::Bag | Screen::Team | Screen::Results => state.nav.index_at(line, 0),
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" BATTLE TOWER ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = vec![Span::styled(
        format!("Floor {}", state.floor),
        Style::default()
            .fg(ACCENT_BLUE)
            .add_modifier(Modifier::BOLD),
    )];
    if is_boss_floor(state.floor) {
        spans.push(Span::styled(
            "  GUARDIAN FLOOR",
            Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        ));
    } else if is_elite_floor(state.floor) {
        spans.push(Span::styled("  ELITE FLOOR", Style::default().fg(ACCENT_GOLD)));
    }
    spans.push(Span::styled(
        format!("  {}", inventory_summary(state)),
        Style::default().fg(TEXT_DIM),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_wave(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" WAVE ", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = state
        .wave
        .iter()
        .map(|foe| {
            let color = match foe.opponent.rank {
                OpponentRank::Normal => TEXT_MAIN,
                OpponentRank::Elite => ACCENT_GOLD,
                OpponentRank::Boss => ACCENT_RED,
            };
            let mut spans = vec![Span::styled(
                format!("{} Lv{}", format_name(&foe.name), foe.opponent.level),
                Style::default().fg(color),
            )];
            if foe.opponent.rank != OpponentRank::Normal {
                spans.push(Span::styled(
                    format!("  [{}]", foe.opponent.rank.label()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ));
            }
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_lead(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" LEAD ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(member) = state.lead_member() else {
        return;
    };
    let record = &member.record;
    let stats = &record.current_stats;
    let progress = record.progress();

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} Lv{}", format_name(&member.name), record.level),
            Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
        )),
        hp_line(stats.hp, stats.hp_max),
    ];
    if record.level >= MAX_LEVEL {
        lines.push(Line::from(Span::styled(
            "XP MAX",
            Style::default().fg(ACCENT_GOLD),
        )));
    } else {
        lines.push(meter_line(
            "XP",
            progress.xp_in_level,
            progress.xp_needed,
            12,
            ACCENT_BLUE,
        ));
    }
    lines.push(Line::from(Span::styled(
        format!(
            "ATK {}  DEF {}  SPE {}",
            stats.attack, stats.defense, stats.speed
        ),
        Style::default().fg(TEXT_DIM),
    )));
    frame.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_commands(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(Screen::Command.title(), BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cell_width = usize::from(inner.width / state.nav.columns() as u16);
    let mut rows: Vec<Vec<Span>> = Vec::new();
    for (index, command) in COMMANDS.iter().enumerate() {
        let (row, _) = state.nav.position(index);
        if rows.len() <= row {
            rows.push(Vec::new());
        }
        let label = numbered_label(state, index, command.label());
        if let Some(spans) = rows.last_mut() {
            spans.push(Span::styled(
                format!("{:<width$}", label, width = cell_width),
                item_style(state, index),
            ));
        }
    }
    let mut lines = Vec::new();
    for spans in rows {
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(state.active_surface().title(), BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let labels = list_labels(state);
    let lines: Vec<Line> = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            Line::from(Span::styled(
                numbered_label(state, index, label),
                item_style(state, index),
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn list_labels(state: &AppState) -> Vec<String> {
    match state.active_surface() {
        Screen::Command => COMMANDS
            .iter()
            .map(|command| command.label().to_string())
            .collect(),
        Screen::Bag => state
            .inventory
            .iter()
            .map(|stack| format!("{:<14} x{}", stack.kind.label(), stack.qty))
            .collect(),
        Screen::Team => state
            .roster
            .iter()
            .enumerate()
            .map(|(index, member)| {
                let stats = &member.record.current_stats;
                let marker = if index == state.lead { "  [lead]" } else { "" };
                format!(
                    "{:<12} Lv{:<3} HP {}/{}{}",
                    format_name(&member.name),
                    member.record.level,
                    stats.hp,
                    stats.hp_max,
                    marker
                )
            })
            .collect(),
        Screen::Results => result_labels(state),
    }
}

fn result_labels(state: &AppState) -> Vec<String> {
    let Some(report) = state.report.as_ref() else {
        return Vec::new();
    };
    state
        .roster
        .iter()
        .enumerate()
        .map(|(index, member)| {
            let name = format_name(&member.name);
            if report.outcome == BattleOutcome::Defeat {
                return format!("{:<12} fainted", name);
            }
            let gained = report
                .distribution
                .members
                .iter()
                .find(|entry| entry.index == index)
                .map(|entry| entry.xp_gained)
                .unwrap_or(0);
            let mut label = format!("{:<12} +{} XP", name, gained);
            if let Some(event) = report
                .distribution
                .level_ups
                .iter()
                .find(|event| event.member == index)
            {
                label.push_str(&format!("  Lv{} -> Lv{}", event.from_level, event.to_level));
            }
            if report.distribution.pending_move_learn.contains(&index) {
                label.push_str("  new move!");
            }
            label
        })
        .collect()
}

fn numbered_label(state: &AppState, index: usize, label: &str) -> String {
    let numbered = state.nav.options().number_keys && index < 9;
    if numbered {
        format!("{} {}", index + 1, label)
    } else {
        label.to_string()
    }
}

fn item_style(state: &AppState, index: usize) -> Style {
    if state.nav.is_disabled(index) {
        return Style::default()
            .fg(TEXT_DISABLED)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if state.nav.cursor() != Some(index) {
        return Style::default().fg(TEXT_MAIN);
    }
    if state.nav.shows_focus_ring() {
        Style::default()
            .fg(HIGHLIGHT_TEXT)
            .bg(HIGHLIGHT_BG)
            .add_modifier(Modifier::BOLD)
    } else {
        // Pointer hover: marked, no ring.
        Style::default()
            .fg(ACCENT_BLUE)
            .add_modifier(Modifier::UNDERLINED)
    }
}

fn render_message(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block("", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from(state.message.clone())];
    if state.active_surface() == Screen::Command {
        if let Some(command) = state.nav.cursor().and_then(|index| COMMANDS.get(index)) {
            lines.push(Line::from(Span::styled(
                command.hint(),
                Style::default().fg(TEXT_DIM),
            )));
        }
    }
    let paragraph = Paragraph::new(Text::from(lines))
        .style(Style::default().fg(TEXT_MAIN))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let left_hints = screen_hints(state);
    let center_hints = [
        StatusBarHint::new("^S", "Save"),
        StatusBarHint::new("^L", "Load"),
        StatusBarHint::new("^Q", "Quit"),
    ];
    let status = if state.busy {
        "Busy"
    } else {
        match state.nav.focus_source() {
            FocusSource::Keyboard => "Keyboard",
            FocusSource::Pointer => "Pointer",
        }
    };
    let status_span = Span::styled(status, Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(BORDER_ACCENT),
                focused_style: Some(Style::default().fg(ACCENT_BLUE)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_BLUE)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: state.nav.shows_focus_ring(),
    };
    let mut status_bar = StatusBar::new();
    Component::<Action>::render(&mut status_bar, frame, area, props);
}

fn screen_hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    let mut hints = vec![StatusBarHint::new("Arrows", "Move")];
    match state.active_surface() {
        Screen::Command => {
            hints.push(StatusBarHint::new("Enter", "Select"));
        }
        Screen::Bag => {
            hints.push(StatusBarHint::new("Enter", "Use"));
            hints.push(StatusBarHint::new("Esc", "Back"));
        }
        Screen::Team => {
            hints.push(StatusBarHint::new("Enter", "Send out"));
            hints.push(StatusBarHint::new("Esc", "Back"));
        }
        Screen::Results => {
            hints.push(StatusBarHint::new("Enter", "Continue"));
        }
    }
    if state.nav.options().number_keys {
        hints.push(StatusBarHint::new("1-9", "Jump"));
    }
    hints
}

fn hp_line(current: u32, max: u32) -> Line<'static> {
    let width: usize = 12;
    let ratio = if max == 0 {
        0.0
    } else {
        current as f32 / max as f32
    };
    let filled = ((ratio * width as f32).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    let color = if ratio > 0.5 {
        ACCENT_BLUE
    } else if ratio > 0.2 {
        ACCENT_GOLD
    } else {
        ACCENT_RED
    };
    Line::from(vec![
        Span::raw("HP "),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("░".repeat(empty), Style::default().fg(TEXT_DIM)),
        Span::raw(format!(" {}/{}", current, max)),
    ])
}

fn meter_line(label: &str, current: u32, max: u32, width: usize, color: Color) -> Line<'static> {
    let max = max.max(1);
    let ratio = current as f32 / max as f32;
    let filled = ((ratio * width as f32).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    Line::from(vec![
        Span::styled(format!("{label} "), Style::default().fg(TEXT_DIM)),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("░".repeat(empty), Style::default().fg(TEXT_DIM)),
        Span::styled(format!(" {current}/{max}"), Style::default().fg(TEXT_DIM)),
    ])
}

fn panel_block<'a, T>(title: T, bg: Color) -> Block<'a>
where
    T: Into<Title<'a>>,
{
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .style(Style::default().bg(bg).fg(TEXT_MAIN))
        .border_style(Style::default().fg(BORDER_ACCENT))
}

fn inventory_summary(state: &AppState) -> String {
    let total: u32 = state
        .inventory
        .iter()
        .map(|stack| u32::from(stack.qty))
        .sum();
    let standing = state
        .roster
        .iter()
        .filter(|member| !member.record.is_fainted())
        .count();
    format!(
        "Team {}/{}  Bag {}",
        standing,
        state.roster.len(),
        total
    )
}
