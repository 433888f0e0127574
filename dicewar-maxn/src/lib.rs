//! DICEWAR Max^n - decision engine
//!
//! This crate decides one command per call for an autonomous player:
//! - Candidate generation: ranked attacks and reinforcement transfers
//! - Heuristic evaluation: dice plus connected-territory bonuses
//! - Max^n search: bounded lookahead across all surviving players
//! - Turn selection: budget check, search or greedy fallback, command
//!   translation

pub mod eval;
pub mod search;
pub mod turns;

// Re-exports for convenient access
pub use eval::{evaluate_players, HeuristicWeights};
pub use turns::{possible_turns, Turn};

use std::time::Duration;

use dicewar_core::{Agent, Board, Command, GameState, PlayerId};

use crate::search::{max_n, SearchContext};

/// Search configuration
#[derive(Clone, Debug)]
pub struct MaxnConfig {
    /// Lookahead window per player; also bounds candidates per node
    pub depth: u32,
    /// How many times the full rotation is appended to the search queue
    pub passes: u32,
    /// Minimum remaining turn budget to run the full search
    pub time_threshold: Duration,
    /// Searched moves per turn before falling back to greedy play
    pub move_limit: u32,
    /// Game-length guard: past this many turns, skip the search entirely
    pub turn_limit: u32,
}

impl Default for MaxnConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            passes: 1,
            time_threshold: Duration::from_secs(1),
            move_limit: 5,
            turn_limit: 1000,
        }
    }
}

/// Max^n player: searches while the budget allows, otherwise plays the
/// single best generated candidate.
pub struct MaxnAi {
    player: PlayerId,
    players_order: Vec<PlayerId>,
    max_transfers: u32,
    config: MaxnConfig,
    weights: HeuristicWeights,
}

impl MaxnAi {
    pub fn new(player: PlayerId, players_order: Vec<PlayerId>, max_transfers: u32) -> Self {
        Self::with_config(
            player,
            players_order,
            max_transfers,
            MaxnConfig::default(),
            HeuristicWeights::default(),
        )
    }

    pub fn with_config(
        player: PlayerId,
        players_order: Vec<PlayerId>,
        max_transfers: u32,
        config: MaxnConfig,
        weights: HeuristicWeights,
    ) -> Self {
        Self {
            player,
            players_order,
            max_transfers,
            config,
            weights,
        }
    }

    /// Decide one command from the current snapshot and turn counters
    pub fn turn(
        &self,
        board: &Board,
        moves_this_turn: u32,
        transfers_this_turn: u32,
        turns_this_game: u32,
        time_left: Duration,
    ) -> Command {
        if time_left >= self.config.time_threshold
            && moves_this_turn < self.config.move_limit
            && turns_this_game < self.config.turn_limit
        {
            let rotation = self.rotation();
            let ctx = SearchContext {
                player: self.player,
                transfers_used: transfers_this_turn,
                max_transfers: self.max_transfers,
                depth: self.config.depth,
                weights: &self.weights,
            };
            let (turn, _) = max_n(&ctx, board, &rotation, self.config.depth);
            return match turn {
                Some(turn) => {
                    tracing::debug!("max_n turn: {:?}", turn);
                    self.perform_command(turn, transfers_this_turn)
                }
                None => Command::EndTurn,
            };
        }

        let turns = possible_turns(board, self.player, transfers_this_turn, self.max_transfers);
        match turns.first() {
            Some(&turn) => {
                tracing::debug!("greedy turn: {:?}", turn);
                self.perform_command(turn, transfers_this_turn)
            }
            None => {
                tracing::debug!("no suitable turns");
                Command::EndTurn
            }
        }
    }

    /// Search queue, consumed from the tail: the acting player pops
    /// first, then the rest of the table order, repeated once per pass.
    fn rotation(&self) -> Vec<PlayerId> {
        let start = self
            .players_order
            .iter()
            .position(|&p| p == self.player)
            .unwrap_or(0);
        let mut single: Vec<PlayerId> = self.players_order[start..]
            .iter()
            .chain(self.players_order[..start].iter())
            .copied()
            .collect();
        single.reverse();

        let passes = self.config.passes.max(1) as usize;
        let mut rotation = Vec::with_capacity(single.len() * passes);
        for _ in 0..passes {
            rotation.extend_from_slice(&single);
        }
        rotation
    }

    /// Translate a chosen candidate into a game command. Transfers degrade
    /// to end-turn once the per-turn allowance is spent.
    fn perform_command(&self, turn: Turn, transfers_this_turn: u32) -> Command {
        match turn {
            Turn::Attack { from, to } => Command::Battle { from, to },
            Turn::Transfer { from, to } if transfers_this_turn < self.max_transfers => {
                Command::Transfer { from, to }
            }
            Turn::Transfer { .. } => Command::EndTurn,
        }
    }
}

impl Agent for MaxnAi {
    fn name(&self) -> &str {
        "maxn"
    }

    fn act(&mut self, state: &GameState, time_left: Duration) -> Command {
        self.turn(
            state.board(),
            state.moves_this_turn(),
            state.transfers_this_turn(),
            state.turns_elapsed(),
            time_left,
        )
    }
}

/// Generator-only player: always takes the top-ranked candidate, never
/// searches. Useful as a cheap baseline and as the search's sparring
/// partner in matches.
#[derive(Default)]
pub struct GreedyAgent;

impl GreedyAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Agent for GreedyAgent {
    fn name(&self) -> &str {
        "greedy"
    }

    fn act(&mut self, state: &GameState, _time_left: Duration) -> Command {
        let player = state.current_player();
        let turns = possible_turns(
            state.board(),
            player,
            state.transfers_this_turn(),
            state.max_transfers(),
        );
        match turns.first() {
            Some(&Turn::Attack { from, to }) => Command::Battle { from, to },
            Some(&Turn::Transfer { from, to })
                if state.transfers_this_turn() < state.max_transfers() =>
            {
                Command::Transfer { from, to }
            }
            _ => Command::EndTurn,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
