//! Match command - play many games between agent line-ups
//!
//! Games are independent and run in parallel; seats rotate between games
//! so no line-up entry owns the first turn or a favorable start.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use dicewar_core::{GameState, Map, PlayerId};

use crate::runner;

#[derive(Args)]
pub struct MatchArgs {
    /// Map JSON file (defaults to a fresh random map per game)
    #[arg(long, value_name = "FILE")]
    pub map: Option<PathBuf>,

    /// Comma-separated agent line-up; seats rotate between games
    #[arg(long, default_value = "maxn,random")]
    pub agents: String,

    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Per-turn wall-clock budget in milliseconds
    #[arg(long, default_value = "500")]
    pub budget_ms: u64,

    /// Player-turn cap per game
    #[arg(long, default_value = "500")]
    pub max_turns: u32,

    /// Transfers allowed per turn
    #[arg(long, default_value = "10")]
    pub max_transfers: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    winner_kind: Option<String>,
    leader_kind: String,
    turns: u32,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    wins: Vec<(String, usize)>,
    draws: usize,
    avg_turns: f32,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let kinds: Vec<String> = args
        .agents
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();
    if kinds.len() < 2 {
        bail!("a match needs at least two agents, got '{}'", args.agents);
    }

    let fixed_map = match args.map.as_deref() {
        Some(path) => Some(
            Map::load(path).with_context(|| format!("failed to load map: {}", path.display()))?,
        ),
        None => None,
    };
    if let Some(map) = &fixed_map {
        if map.players().len() != kinds.len() {
            bail!(
                "line-up has {} agents but map '{}' has {} players",
                kinds.len(),
                map.name,
                map.players().len()
            );
        }
    }

    let base_seed = seed.unwrap_or_else(rand::random);
    tracing::info!(
        "Starting match: {} ({} games, seed {})",
        args.agents,
        args.games,
        base_seed
    );

    let records: Result<Vec<GameRecord>> = (0..args.games)
        .into_par_iter()
        .map(|game_number| {
            play_single_game(game_number, &kinds, fixed_map.as_ref(), &args, base_seed)
        })
        .collect();
    let results = compute_match_statistics(records?, &kinds);

    if args.json {
        print_json_results(&results);
    } else {
        print_text_results(&results);
    }
    Ok(())
}

// ============================================================================
// GAME EXECUTION
// ============================================================================

fn play_single_game(
    game_number: usize,
    kinds: &[String],
    fixed_map: Option<&Map>,
    args: &MatchArgs,
    base_seed: u64,
) -> Result<GameRecord> {
    let seed = base_seed.wrapping_add(game_number as u64 * 1000);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let map = match fixed_map {
        Some(map) => map.clone(),
        None => {
            let players: Vec<PlayerId> = (1..=kinds.len() as PlayerId).collect();
            Map::random_grid(&mut rng, 5, 4, &players, "arena")
        }
    };
    let players = map.players();

    let mut agents = Vec::new();
    let mut seat_kinds = Vec::new();
    for (i, &player) in players.iter().enumerate() {
        let kind = &kinds[(i + game_number) % kinds.len()];
        let agent = runner::build_agent(
            kind,
            player,
            &players,
            args.max_transfers,
            seed.wrapping_add(i as u64 + 1),
        )?;
        agents.push((player, agent));
        seat_kinds.push((player, kind.clone()));
    }

    let board = map
        .to_board()
        .with_context(|| format!("map '{}' is not playable", map.name))?;
    let mut state = GameState::new(board, players, args.max_transfers);
    let outcome = runner::play_game(
        &mut state,
        &mut agents,
        Duration::from_millis(args.budget_ms),
        args.max_turns,
        &mut rng,
        false,
    );

    let kind_of = |player: PlayerId| {
        seat_kinds
            .iter()
            .find(|(p, _)| *p == player)
            .map(|(_, k)| k.clone())
            .unwrap_or_default()
    };
    let record = GameRecord {
        game_number: game_number + 1,
        winner_kind: outcome.winner.map(|p| kind_of(p)),
        leader_kind: kind_of(outcome.leader),
        turns: outcome.turns,
    };
    tracing::info!(
        "Game {}: winner {:?} ({} turns)",
        record.game_number,
        record.winner_kind,
        record.turns
    );
    Ok(record)
}

/// Aggregate statistics, keyed by the distinct kinds in line-up order
fn compute_match_statistics(games: Vec<GameRecord>, kinds: &[String]) -> MatchResults {
    let mut distinct: Vec<String> = Vec::new();
    for kind in kinds {
        if !distinct.contains(kind) {
            distinct.push(kind.clone());
        }
    }

    let wins = distinct
        .iter()
        .map(|kind| {
            let count = games
                .iter()
                .filter(|g| g.winner_kind.as_deref() == Some(kind))
                .count();
            (kind.clone(), count)
        })
        .collect();
    let draws = games.iter().filter(|g| g.winner_kind.is_none()).count();
    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    MatchResults {
        games,
        wins,
        draws,
        avg_turns,
    }
}

// ============================================================================
// REPORTING
// ============================================================================

fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        winner: Option<String>,
        leader: String,
        turns: u32,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        wins: Vec<(String, usize)>,
        draws: usize,
        avg_turns: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        wins: results.wins.clone(),
        draws: results.draws,
        avg_turns: results.avg_turns,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                winner: g.winner_kind.clone(),
                leader: g.leader_kind.clone(),
                turns: g.turns,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    for (kind, wins) in &results.wins {
        println!(
            "{:<8} wins: {} ({:.1}%)",
            kind,
            wins,
            if total > 0 {
                *wins as f32 / total as f32 * 100.0
            } else {
                0.0
            }
        );
    }
    println!("Draws:        {}", results.draws);
    println!("Avg turns:    {:.1}", results.avg_turns);

    println!("\nGame details:");
    for game in &results.games {
        match &game.winner_kind {
            Some(kind) => println!("  Game {}: {} in {} turns", game.game_number, kind, game.turns),
            None => println!(
                "  Game {}: draw, {} led after {} turns",
                game.game_number, game.leader_kind, game.turns
            ),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(game_number: usize, winner: Option<&str>, turns: u32) -> GameRecord {
        GameRecord {
            game_number,
            winner_kind: winner.map(str::to_string),
            leader_kind: winner.unwrap_or("maxn").to_string(),
            turns,
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let kinds = vec!["maxn".to_string(), "random".to_string()];
        let results = compute_match_statistics(vec![], &kinds);
        assert_eq!(results.wins, vec![("maxn".into(), 0), ("random".into(), 0)]);
        assert_eq!(results.draws, 0);
        assert_eq!(results.avg_turns, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let kinds = vec!["maxn".to_string(), "random".to_string()];
        let games = vec![
            record(1, Some("maxn"), 10),
            record(2, Some("random"), 20),
            record(3, Some("maxn"), 30),
            record(4, None, 40),
        ];
        let results = compute_match_statistics(games, &kinds);
        assert_eq!(results.wins, vec![("maxn".into(), 2), ("random".into(), 1)]);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_turns, 25.0);
    }

    #[test]
    fn test_duplicate_kinds_are_counted_once() {
        let kinds = vec![
            "maxn".to_string(),
            "random".to_string(),
            "random".to_string(),
        ];
        let games = vec![record(1, Some("random"), 10)];
        let results = compute_match_statistics(games, &kinds);
        assert_eq!(results.wins, vec![("maxn".into(), 0), ("random".into(), 1)]);
    }
}
