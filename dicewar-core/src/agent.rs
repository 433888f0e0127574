//! Agent interface and baseline opponent

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::game::{Command, GameState};

/// A player driven by code. The harness calls `act` repeatedly within a
/// turn until the agent returns `EndTurn` (or a command is rejected).
pub trait Agent {
    fn name(&self) -> &str;

    /// Decide the next command. `time_left` is the remaining wall-clock
    /// budget for the current turn.
    fn act(&mut self, state: &GameState, time_left: Duration) -> Command;
}

/// Baseline opponent: a random attack where the attacker has more dice
/// than the defender, otherwise end the turn.
pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, state: &GameState, _time_left: Duration) -> Command {
        let player = state.current_player();
        let board = state.board();
        let attacks: Vec<_> = board
            .possible_attacks(player)
            .into_iter()
            .filter(|&(from, to)| board.region(from).dice > board.region(to).dice)
            .collect();
        match attacks.choose(&mut self.rng) {
            Some(&(from, to)) => Command::Battle { from, to },
            None => Command::EndTurn,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
