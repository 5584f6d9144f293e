use std::path::PathBuf;

use anyhow::Context;
use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use text2048_agent::{
    evaluation::step_with_fallback,
    policy::{Policy, RandomPolicy},
};
use text2048_engine::{DEFAULT_BOARD_SIZE, TileSeed};
use text2048_env::Text2048Env;

use crate::{
    command::eval::{env_config, load_policy},
    tui::{App, RenderMode, Runtime},
    ui::{GameDisplay, KeyBinding, KeyBindingDisplay, PlayStatus},
};

const MIN_TICK_RATE: f64 = 1.0;
const MAX_TICK_RATE: f64 = 1000.0;
const FPS: f64 = 60.0;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DemoArg {
    /// Model file (JSON); a random policy plays when omitted
    #[arg(long)]
    model: Option<PathBuf>,
    #[arg(long, default_value_t = 8)]
    seed: u64,
    /// Moves per second (1 to 1000)
    #[arg(long, default_value_t = 20.0, value_parser = parse_tick_rate)]
    tick_rate: f64,
    /// Board side length
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,
    /// Observe log2 exponents instead of one-hot channels
    #[arg(long)]
    no_one_hot: bool,
}

fn parse_tick_rate(s: &str) -> Result<f64, String> {
    let rate = s.parse::<f64>().map_err(|e| e.to_string())?;
    if (MIN_TICK_RATE..=MAX_TICK_RATE).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("must be in {MIN_TICK_RATE}..={MAX_TICK_RATE}"))
    }
}

struct DemoApp {
    env: Text2048Env,
    policy: Box<dyn Policy>,
    fallback: RandomPolicy,
    tick_rate: f64,
    status: PlayStatus,
    is_exiting: bool,
}

impl DemoApp {
    fn new(env: Text2048Env, policy: Box<dyn Policy>, seed: u64, tick_rate: f64) -> Self {
        Self {
            env,
            policy,
            fallback: RandomPolicy::new(seed),
            tick_rate: tick_rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE),
            status: PlayStatus::Playing,
            is_exiting: false,
        }
    }

    fn set_tick_rate(&mut self, runtime: &mut Runtime, rate: f64) {
        self.tick_rate = rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE);
        runtime.set_tick_rate(Some(self.tick_rate));
    }
}

impl App for DemoApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(Some(self.tick_rate));
        runtime.set_render_mode(RenderMode::throttled_from_rate(FPS));
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: &Event) {
        let Some(key) = event.as_key_press_event() else {
            return;
        };
        match key.code {
            KeyCode::Char('p' | ' ') => self.status = self.status.toggle_pause(),
            KeyCode::Char('+' | '=') => self.set_tick_rate(runtime, self.tick_rate * 2.0),
            KeyCode::Char('-') => self.set_tick_rate(runtime, self.tick_rate / 2.0),
            KeyCode::Char('q') | KeyCode::Esc => self.is_exiting = true,
            _ => {}
        }
    }

    fn update(&mut self, _runtime: &mut Runtime) {
        if !self.status.is_playing() {
            return;
        }
        match step_with_fallback(self.policy.as_mut(), &mut self.fallback, &mut self.env) {
            Ok(transition) if transition.terminated => {
                tracing::debug!(score = transition.info.score, "demo episode finished");
                self.status = PlayStatus::GameOver;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%err, "demo step failed");
                self.status = PlayStatus::GameOver;
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        const BINDINGS: &[KeyBinding] = &[
            (&["p", "Space"], "Pause"),
            (&["+", "-"], "Speed"),
            (&["q", "Esc"], "Quit"),
        ];
        let engine = self.env.engine();
        let game = GameDisplay::new(engine.state(), engine.stats(), self.status).title("DEMO");
        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(game, main_area);
        frame.render_widget(KeyBindingDisplay::new(BINDINGS), help_area);
    }
}

pub(crate) fn run(arg: &DemoArg) -> anyhow::Result<()> {
    let config = env_config(arg.size, arg.no_one_hot);
    let env = Text2048Env::new(config, TileSeed::from(arg.seed)).context("Invalid environment")?;
    let policy = load_policy(arg.model.as_deref(), arg.seed)?;
    let mut app = DemoApp::new(env, policy, arg.seed, arg.tick_rate);

    Runtime::new().run(&mut app)?;

    let state = app.env.state();
    eprintln!("Score: {}", state.score());
    eprintln!("Moves: {}", state.moves());
    eprintln!("Max tile: {}", state.board().max_tile());
    Ok(())
}
