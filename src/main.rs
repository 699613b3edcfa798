use std::io;
use std::path::{Path, PathBuf};

use battletower::action::Action;
use battletower::config::{load_config, TowerConfig};
use battletower::effect::Effect;
use battletower::persist::{load_run, save_run};
use battletower::progression::XpShareMode;
use battletower::reducer::reducer;
use battletower::state::{default_save_path, seed_from_time, AppState};
use battletower::ui;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

#[derive(Parser, Debug)]
#[command(name = "battletower")]
#[command(about = "Climb a tower of battles with a keyboard-driven team")]
struct Args {
    /// RON tower config (roster, bag, navigation and XP rules)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Floor to start the climb on
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    floor: u32,

    /// Override the config's XP sharing mode
    #[arg(long, value_enum)]
    xp_mode: Option<XpShareMode>,

    /// Save file for Ctrl+S / Ctrl+L
    #[arg(long)]
    save: Option<PathBuf>,

    /// Fixed RNG seed for reproducible waves and move rolls
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        config,
        floor,
        xp_mode,
        save,
        seed,
        debug: debug_args,
    } = Args::parse();

    let debug = DebugSession::new(debug_args);

    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let state = debug
        .load_state_or_else_async(move || async move {
            let mut tower = match config {
                Some(path) => match load_config(&path).await {
                    Ok(tower) => tower,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                },
                None => TowerConfig::default(),
            };
            if let Some(mode) = xp_mode {
                tower.xp_mode = mode;
            }
            let save_path = save
                .map(|path| path.to_string_lossy().into_owned())
                .unwrap_or_else(default_save_path);
            let seed = seed.unwrap_or_else(seed_from_time);
            let mut state = AppState::new(tower, floor, save_path, seed);
            if let Ok(size) = crossterm::terminal::size() {
                state.terminal_size = size;
            }
            Ok::<AppState, io::Error>(state)
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |_runtime| {},
            |frame, area, state, render_ctx: RenderContext| {
                ui::render(frame, area, state, render_ctx);
            },
            |event, state| -> EventOutcome<Action> { ui::handle_event(event, state) },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::SaveRun { path, snapshot } => {
            ctx.tasks().spawn(TaskKey::new("save_run"), async move {
                match save_run(Path::new(&path), &snapshot).await {
                    Ok(()) => Action::RunDidSave,
                    Err(e) => Action::RunDidError(format!("Save failed: {}", e)),
                }
            });
        }
        Effect::LoadRun { path } => {
            ctx.tasks().spawn(TaskKey::new("load_run"), async move {
                match load_run(Path::new(&path)).await {
                    Ok(snapshot) => Action::RunDidLoad(Box::new(snapshot)),
                    Err(e) => Action::RunDidError(format!("Load failed: {}", e)),
                }
            });
        }
    }
}
