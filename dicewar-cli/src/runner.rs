//! Game runner - drives single games between agents
//!
//! The runner is the turn loop the decision engines plug into: it hands
//! each agent the state and the remaining wall-clock budget, applies the
//! returned commands to the authoritative state, and ends a turn early
//! when a command is rejected.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use rand_chacha::ChaCha8Rng;

use dicewar_core::{Agent, Command, GameState, PlayerId, RandomAgent};
use dicewar_maxn::{GreedyAgent, MaxnAi};

/// Safety valve: one turn never issues more commands than this
const MAX_COMMANDS_PER_TURN: u32 = 256;

/// Outcome of a single game
#[derive(Clone, Debug)]
pub struct GameOutcome {
    /// Sole survivor, or `None` when the turn cap was reached
    pub winner: Option<PlayerId>,
    /// Position leader at the end (the winner when there is one)
    pub leader: PlayerId,
    pub turns: u32,
    pub commands: u32,
}

/// Build an agent from its line-up name
pub fn build_agent(
    kind: &str,
    player: PlayerId,
    players: &[PlayerId],
    max_transfers: u32,
    seed: u64,
) -> Result<Box<dyn Agent>> {
    match kind {
        "maxn" => Ok(Box::new(MaxnAi::new(player, players.to_vec(), max_transfers))),
        "greedy" => Ok(Box::new(GreedyAgent::new())),
        "random" => Ok(Box::new(RandomAgent::new(seed))),
        other => bail!("unknown agent kind '{other}' (expected maxn, greedy, or random)"),
    }
}

/// Drive one game to a winner or the turn cap
pub fn play_game(
    state: &mut GameState,
    agents: &mut [(PlayerId, Box<dyn Agent>)],
    turn_budget: Duration,
    max_turns: u32,
    rng: &mut ChaCha8Rng,
    narrate: bool,
) -> GameOutcome {
    let mut commands = 0u32;

    while state.winner().is_none() && state.turns_elapsed() < max_turns {
        let player = state.current_player();
        let turn_start = Instant::now();
        let mut issued = 0u32;

        loop {
            let time_left = turn_budget.saturating_sub(turn_start.elapsed());
            let mut command = match agents.iter_mut().find(|(p, _)| *p == player) {
                Some((_, agent)) => agent.act(state, time_left),
                None => Command::EndTurn,
            };
            issued += 1;
            commands += 1;
            if issued >= MAX_COMMANDS_PER_TURN {
                tracing::warn!(player, "command valve tripped, forcing end of turn");
                command = Command::EndTurn;
            }
            let ended = command == Command::EndTurn;

            match state.apply(command, rng) {
                Ok(outcome) => {
                    if narrate {
                        if let Some(battle) = outcome {
                            tracing::info!(
                                player,
                                from = battle.from,
                                to = battle.to,
                                attacker = battle.attacker_sum,
                                defender = battle.defender_sum,
                                captured = battle.captured,
                                "battle"
                            );
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(player, %err, "command rejected, ending turn");
                    let _ = state.apply(Command::EndTurn, rng);
                    break;
                }
            }

            if ended {
                break;
            }
        }
    }

    GameOutcome {
        winner: state.winner(),
        leader: state.leader(),
        turns: state.turns_elapsed(),
        commands,
    }
}
