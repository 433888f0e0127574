//! Play command - one narrated game

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use dicewar_core::{GameState, Map};

use crate::runner;

#[derive(Args)]
pub struct PlayArgs {
    /// Map JSON file (defaults to the built-in four-player map)
    #[arg(long, value_name = "FILE")]
    pub map: Option<PathBuf>,

    /// Comma-separated agent line-up, one entry per player
    /// (maxn, greedy, random)
    #[arg(long, default_value = "maxn,random,random,random")]
    pub agents: String,

    /// Per-turn wall-clock budget in milliseconds
    #[arg(long, default_value = "2000")]
    pub budget_ms: u64,

    /// Player-turn cap before the game is scored by position
    #[arg(long, default_value = "1000")]
    pub max_turns: u32,

    /// Transfers allowed per turn
    #[arg(long, default_value = "10")]
    pub max_transfers: u32,
}

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let map = load_map(args.map.as_deref())?;
    let players = map.players();
    let kinds: Vec<&str> = args.agents.split(',').map(str::trim).collect();
    if kinds.len() != players.len() {
        bail!(
            "line-up '{}' has {} agents but map '{}' has {} players",
            args.agents,
            kinds.len(),
            map.name,
            players.len()
        );
    }

    let base_seed = seed.unwrap_or_else(rand::random);
    let mut agents = Vec::new();
    for (i, (&player, kind)) in players.iter().zip(&kinds).enumerate() {
        let agent = runner::build_agent(
            kind,
            player,
            &players,
            args.max_transfers,
            base_seed.wrapping_add(i as u64 + 1),
        )?;
        agents.push((player, agent));
    }

    let board = map
        .to_board()
        .with_context(|| format!("map '{}' is not playable", map.name))?;
    let mut state = GameState::new(board, players, args.max_transfers);
    let mut rng = ChaCha8Rng::seed_from_u64(base_seed);

    tracing::info!("Playing '{}' with {} (seed {})", map.name, args.agents, base_seed);
    let outcome = runner::play_game(
        &mut state,
        &mut agents,
        Duration::from_millis(args.budget_ms),
        args.max_turns,
        &mut rng,
        true,
    );

    match outcome.winner {
        Some(winner) => println!(
            "Winner: player {winner} after {} turns ({} commands)",
            outcome.turns, outcome.commands
        ),
        None => println!(
            "Turn cap reached after {} turns; leader: player {}",
            outcome.turns, outcome.leader
        ),
    }
    Ok(())
}

fn load_map(path: Option<&Path>) -> Result<Map> {
    match path {
        Some(path) => {
            Map::load(path).with_context(|| format!("failed to load map: {}", path.display()))
        }
        None => Ok(Map::skirmish()),
    }
}
