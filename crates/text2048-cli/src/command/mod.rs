use clap::{Parser, Subcommand};

use self::{demo::DemoArg, eval::EvalArg, play::PlayArg, train::TrainArg};

mod demo;
mod eval;
mod play;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train move evaluator weights with a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Evaluate a model (or a random policy) and print the report
    Eval(#[clap(flatten)] EvalArg),
    /// Watch a model play one episode
    Demo(#[clap(flatten)] DemoArg),
    /// Play manually in the terminal
    Play(#[clap(flatten)] PlayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Eval(arg) => eval::run(&arg)?,
        Mode::Demo(arg) => demo::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
    }
    Ok(())
}
