use anyhow::Context;
use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use text2048_engine::{DEFAULT_BOARD_SIZE, EngineConfig, GridEngine, Move, TileSeed};

use crate::{
    tui::{App, Runtime},
    ui::{GameDisplay, KeyBinding, KeyBindingDisplay, PlayStatus},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Tile spawn seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Board side length
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            seed: None,
            size: DEFAULT_BOARD_SIZE,
        }
    }
}

fn key_to_move(code: KeyCode) -> Option<Move> {
    let mv = match code {
        KeyCode::Up | KeyCode::Char('w') => Move::Up,
        KeyCode::Down | KeyCode::Char('s') => Move::Down,
        KeyCode::Left | KeyCode::Char('a') => Move::Left,
        KeyCode::Right | KeyCode::Char('d') => Move::Right,
        _ => return None,
    };
    Some(mv)
}

#[derive(Debug)]
struct PlayApp {
    engine: GridEngine,
    status: PlayStatus,
    is_exiting: bool,
}

impl PlayApp {
    fn new(engine: GridEngine) -> Self {
        let status = if engine.state().is_terminated() {
            PlayStatus::GameOver
        } else {
            PlayStatus::Playing
        };
        Self {
            engine,
            status,
            is_exiting: false,
        }
    }

    fn play(&mut self, mv: Move) {
        match self.engine.step(mv) {
            Ok(outcome) if outcome.is_terminated() => self.status = PlayStatus::GameOver,
            Ok(outcome) if !outcome.changed() => tracing::trace!(%mv, "ineffective move"),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%err, "move rejected");
                self.status = PlayStatus::GameOver;
            }
        }
    }

    fn reset(&mut self) {
        let state = self.engine.reset();
        self.status = if state.is_terminated() {
            PlayStatus::GameOver
        } else {
            PlayStatus::Playing
        };
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(None);
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _runtime: &mut Runtime, event: &Event) {
        let Some(key) = event.as_key_press_event() else {
            return;
        };
        if self.status.is_playing()
            && let Some(mv) = key_to_move(key.code)
        {
            self.play(mv);
            return;
        }
        match key.code {
            KeyCode::Char('p') => self.status = self.status.toggle_pause(),
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('q') | KeyCode::Esc => self.is_exiting = true,
            _ => {}
        }
    }

    fn update(&mut self, _runtime: &mut Runtime) {}

    fn draw(&self, frame: &mut Frame) {
        const BINDINGS: &[KeyBinding] = &[
            (&["←↑↓→", "WASD"], "Move"),
            (&["p"], "Pause"),
            (&["r"], "Reset"),
            (&["q", "Esc"], "Quit"),
        ];
        let game = GameDisplay::new(self.engine.state(), self.engine.stats(), self.status);
        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(game, main_area);
        frame.render_widget(KeyBindingDisplay::new(BINDINGS), help_area);
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let seed = arg.seed.map_or_else(rand::random::<TileSeed>, TileSeed::from);
    tracing::debug!(%seed, "starting manual play");
    let engine = GridEngine::new(EngineConfig::with_size(arg.size), seed)
        .context("Invalid board configuration")?;
    let mut app = PlayApp::new(engine);

    Runtime::new().run(&mut app)?;

    let state = app.engine.state();
    eprintln!("Score: {}", state.score());
    eprintln!("Max tile: {}", state.board().max_tile());
    Ok(())
}
