//! DICEWAR CLI - Command-line interface
//!
//! Commands:
//! - play: play a single narrated game
//! - match: play a multi-game match between agent line-ups
//! - gen-map: generate a random map file

mod gen_map;
mod match_cmd;
mod play_cmd;
mod runner;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dicewar")]
#[command(about = "DICEWAR dice-conquest engine")]
struct Cli {
    /// Base random seed (derived from entropy when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game
    Play(play_cmd::PlayArgs),
    /// Play a multi-game match
    Match(match_cmd::MatchArgs),
    /// Generate a random map file
    GenMap(gen_map::GenMapArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
        Commands::GenMap(args) => gen_map::run(args, cli.seed),
    }
}
