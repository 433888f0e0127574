//! Authoritative game state and rules
//!
//! The harness owns a `GameState` and applies the commands agents return.
//! Agents only ever see the state through shared references; every rule
//! (adjacency, dice minimums, transfer caps, reinforcement) is enforced
//! here, so a misbehaving agent can be rejected instead of corrupting the
//! game.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, PlayerId, RegionId, MAX_DICE};

/// A concrete command handed back to the game by an agent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Battle { from: RegionId, to: RegionId },
    Transfer { from: RegionId, to: RegionId },
    EndTurn,
}

/// Why a command was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("region {0} does not exist")]
    UnknownRegion(RegionId),
    #[error("region {0} is not owned by the current player")]
    NotOwned(RegionId),
    #[error("region {0} is not an enemy region")]
    NotEnemy(RegionId),
    #[error("regions {0} and {1} are not adjacent")]
    NotAdjacent(RegionId, RegionId),
    #[error("region {0} needs more than one die")]
    TooFewDice(RegionId),
    #[error("transfer limit for this turn is exhausted")]
    TransferLimit,
}

/// Outcome of a resolved battle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BattleOutcome {
    pub from: RegionId,
    pub to: RegionId,
    pub attacker_sum: u32,
    pub defender_sum: u32,
    pub captured: bool,
}

/// Full game state: board plus turn bookkeeping
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    players: Vec<PlayerId>,
    current: usize,
    moves_this_turn: u32,
    transfers_this_turn: u32,
    turns_elapsed: u32,
    max_transfers: u32,
}

impl GameState {
    pub fn new(board: Board, players: Vec<PlayerId>, max_transfers: u32) -> Self {
        debug_assert!(!players.is_empty());
        Self {
            board,
            players,
            current: 0,
            moves_this_turn: 0,
            transfers_this_turn: 0,
            turns_elapsed: 0,
            max_transfers,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Table order the game was set up with
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn current_player(&self) -> PlayerId {
        self.players[self.current]
    }

    pub fn moves_this_turn(&self) -> u32 {
        self.moves_this_turn
    }

    pub fn transfers_this_turn(&self) -> u32 {
        self.transfers_this_turn
    }

    /// Completed player turns since the game started
    pub fn turns_elapsed(&self) -> u32 {
        self.turns_elapsed
    }

    pub fn max_transfers(&self) -> u32 {
        self.max_transfers
    }

    /// The sole surviving player, once there is one
    pub fn winner(&self) -> Option<PlayerId> {
        match self.board.alive_players().as_slice() {
            [sole] => Some(*sole),
            _ => None,
        }
    }

    /// Player holding the most regions, dice total breaking ties.
    /// Used to score games that hit the turn cap.
    pub fn leader(&self) -> PlayerId {
        let mut best = self.players[0];
        let mut best_key = (0usize, 0u32);
        for player in self.board.alive_players() {
            let key = (
                self.board.player_regions(player).len(),
                self.board.player_dice(player),
            );
            if key > best_key {
                best_key = key;
                best = player;
            }
        }
        best
    }

    // ========================================================================
    // COMMAND APPLICATION
    // ========================================================================

    /// Apply one command for the current player. Battles report their
    /// rolls; transfers and end-turn return `None`.
    pub fn apply<R: Rng>(
        &mut self,
        command: Command,
        rng: &mut R,
    ) -> Result<Option<BattleOutcome>, RulesError> {
        match command {
            Command::Battle { from, to } => self.battle(from, to, rng).map(Some),
            Command::Transfer { from, to } => {
                self.transfer(from, to)?;
                Ok(None)
            }
            Command::EndTurn => {
                self.end_turn(rng);
                Ok(None)
            }
        }
    }

    fn check_region(&self, id: RegionId) -> Result<(), RulesError> {
        if (id as usize) < self.board.region_count() {
            Ok(())
        } else {
            Err(RulesError::UnknownRegion(id))
        }
    }

    fn battle<R: Rng>(
        &mut self,
        from: RegionId,
        to: RegionId,
        rng: &mut R,
    ) -> Result<BattleOutcome, RulesError> {
        self.check_region(from)?;
        self.check_region(to)?;
        let player = self.current_player();

        let source_dice = self.board.region(from).dice;
        if self.board.region(from).owner != player {
            return Err(RulesError::NotOwned(from));
        }
        if source_dice <= 1 {
            return Err(RulesError::TooFewDice(from));
        }
        if !self.board.adjacent(from, to) {
            return Err(RulesError::NotAdjacent(from, to));
        }
        if self.board.region(to).owner == player {
            return Err(RulesError::NotEnemy(to));
        }

        let attacker_sum = roll(rng, source_dice);
        let defender_sum = roll(rng, self.board.region(to).dice);
        let captured = attacker_sum > defender_sum;

        if captured {
            self.board.set_dice(to, source_dice - 1);
            self.board.set_owner(to, player);
        }
        self.board.set_dice(from, 1);
        self.moves_this_turn += 1;

        Ok(BattleOutcome {
            from,
            to,
            attacker_sum,
            defender_sum,
            captured,
        })
    }

    fn transfer(&mut self, from: RegionId, to: RegionId) -> Result<(), RulesError> {
        self.check_region(from)?;
        self.check_region(to)?;
        if self.transfers_this_turn >= self.max_transfers {
            return Err(RulesError::TransferLimit);
        }
        let player = self.current_player();
        if self.board.region(from).owner != player {
            return Err(RulesError::NotOwned(from));
        }
        if self.board.region(to).owner != player {
            return Err(RulesError::NotOwned(to));
        }
        if !self.board.adjacent(from, to) {
            return Err(RulesError::NotAdjacent(from, to));
        }
        let source_dice = self.board.region(from).dice;
        if source_dice <= 1 {
            return Err(RulesError::TooFewDice(from));
        }

        // Move as many dice as fit, always leaving one behind.
        let target_dice = self.board.region(to).dice;
        let moved = (source_dice - 1).min(MAX_DICE - target_dice);
        self.board.set_dice(to, target_dice + moved);
        self.board.set_dice(from, source_dice - moved);

        self.transfers_this_turn += 1;
        self.moves_this_turn += 1;
        Ok(())
    }

    /// Reinforce the departing player (one die per region in their largest
    /// connected group, placed randomly, overflow discarded), then pass the
    /// turn to the next surviving player.
    fn end_turn<R: Rng>(&mut self, rng: &mut R) {
        let player = self.current_player();
        let gain = self
            .board
            .player_groups(player)
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0);

        for _ in 0..gain {
            let open: Vec<RegionId> = self
                .board
                .player_regions(player)
                .into_iter()
                .filter(|&id| self.board.region(id).dice < MAX_DICE)
                .collect();
            match open.choose(rng) {
                Some(&id) => {
                    let dice = self.board.region(id).dice;
                    self.board.set_dice(id, dice + 1);
                }
                None => break,
            }
        }

        for _ in 0..self.players.len() {
            self.current = (self.current + 1) % self.players.len();
            if !self
                .board
                .player_regions(self.players[self.current])
                .is_empty()
            {
                break;
            }
        }

        self.turns_elapsed += 1;
        self.moves_this_turn = 0;
        self.transfers_this_turn = 0;
    }
}

fn roll<R: Rng>(rng: &mut R, dice: u8) -> u32 {
    (0..dice).map(|_| rng.gen_range(1..=6u32)).sum()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Region;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Line of four regions: 0-1-2-3, players 1,1,2,2
    fn line_state(dice: [u8; 4]) -> GameState {
        let adjacency: [&[RegionId]; 4] = [&[1], &[0, 2], &[1, 3], &[2]];
        let regions = adjacency
            .iter()
            .enumerate()
            .map(|(i, n)| Region {
                owner: if i < 2 { 1 } else { 2 },
                dice: dice[i],
                neighbors: n.to_vec(),
            })
            .collect();
        GameState::new(Board::new(regions), vec![1, 2], 4)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_battle_with_overwhelming_force_captures() {
        // Eight dice roll at least 8; one die rolls at most 6.
        let mut state = line_state([2, 8, 1, 2]);
        let outcome = state
            .apply(Command::Battle { from: 1, to: 2 }, &mut rng())
            .unwrap()
            .unwrap();
        assert!(outcome.captured);
        assert_eq!(state.board().region(2).owner, 1);
        assert_eq!(state.board().region(2).dice, 7);
        assert_eq!(state.board().region(1).dice, 1);
        assert_eq!(state.moves_this_turn(), 1);
    }

    #[test]
    fn test_battle_source_always_drops_to_one() {
        let mut state = line_state([2, 3, 3, 2]);
        let outcome = state
            .apply(Command::Battle { from: 1, to: 2 }, &mut rng())
            .unwrap()
            .unwrap();
        assert_eq!(state.board().region(1).dice, 1);
        if outcome.captured {
            assert_eq!(state.board().region(2).owner, 1);
            assert_eq!(state.board().region(2).dice, 2);
        } else {
            assert_eq!(state.board().region(2).owner, 2);
            assert_eq!(state.board().region(2).dice, 3);
        }
    }

    #[test]
    fn test_battle_rejections() {
        let mut state = line_state([2, 1, 3, 2]);
        let mut rng = rng();
        assert_eq!(
            state.apply(Command::Battle { from: 1, to: 2 }, &mut rng),
            Err(RulesError::TooFewDice(1))
        );
        assert_eq!(
            state.apply(Command::Battle { from: 2, to: 1 }, &mut rng),
            Err(RulesError::NotOwned(2))
        );
        assert_eq!(
            state.apply(Command::Battle { from: 0, to: 2 }, &mut rng),
            Err(RulesError::NotAdjacent(0, 2))
        );
        assert_eq!(
            state.apply(Command::Battle { from: 0, to: 1 }, &mut rng),
            Err(RulesError::NotEnemy(1))
        );
        assert_eq!(
            state.apply(Command::Battle { from: 0, to: 99 }, &mut rng),
            Err(RulesError::UnknownRegion(99))
        );
    }

    #[test]
    fn test_transfer_merges_and_caps() {
        let mut state = line_state([6, 5, 3, 2]);
        state.apply(Command::Transfer { from: 0, to: 1 }, &mut rng()).unwrap();
        // Only 3 of the 5 movable dice fit under the cap.
        assert_eq!(state.board().region(1).dice, 8);
        assert_eq!(state.board().region(0).dice, 3);
        assert_eq!(state.transfers_this_turn(), 1);
    }

    #[test]
    fn test_transfer_conserves_dice() {
        let mut state = line_state([4, 2, 3, 2]);
        let before: u32 = state.board().player_dice(1);
        state.apply(Command::Transfer { from: 0, to: 1 }, &mut rng()).unwrap();
        assert_eq!(state.board().player_dice(1), before);
        assert_eq!(state.board().region(1).dice, 5);
        assert_eq!(state.board().region(0).dice, 1);
    }

    #[test]
    fn test_transfer_limit() {
        let mut state = line_state([8, 8, 3, 2]);
        let mut rng = rng();
        for _ in 0..4 {
            // Legal but saturated transfers still consume the allowance.
            state.apply(Command::Transfer { from: 0, to: 1 }, &mut rng).unwrap();
        }
        assert_eq!(
            state.apply(Command::Transfer { from: 0, to: 1 }, &mut rng),
            Err(RulesError::TransferLimit)
        );
    }

    #[test]
    fn test_end_turn_reinforces_and_advances() {
        let mut state = line_state([2, 2, 2, 2]);
        state.apply(Command::EndTurn, &mut rng()).unwrap();
        // Player 1's largest group has two regions -> two extra dice.
        assert_eq!(state.board().player_dice(1), 6);
        assert_eq!(state.current_player(), 2);
        assert_eq!(state.turns_elapsed(), 1);
        assert_eq!(state.moves_this_turn(), 0);
    }

    #[test]
    fn test_end_turn_skips_eliminated_players() {
        let mut state = line_state([2, 8, 1, 2]);
        let mut rng = rng();
        state.apply(Command::Battle { from: 1, to: 2 }, &mut rng).unwrap();
        // Player 2 still holds region 3, but after losing it the rotation
        // must come straight back to player 1.
        state.apply(Command::EndTurn, &mut rng).unwrap();
        assert_eq!(state.current_player(), 2);
        state.apply(Command::EndTurn, &mut rng).unwrap();
        assert_eq!(state.current_player(), 1);

        let mut mono = line_state([2, 8, 1, 1]);
        mono.apply(Command::Battle { from: 1, to: 2 }, &mut rng).unwrap();
        // Region 2 captured with 7 dice; take region 3 as well.
        mono.apply(Command::Battle { from: 2, to: 3 }, &mut rng).unwrap();
        assert_eq!(mono.winner(), Some(1));
        mono.apply(Command::EndTurn, &mut rng).unwrap();
        assert_eq!(mono.current_player(), 1);
    }

    #[test]
    fn test_reinforcement_overflow_is_discarded() {
        let mut state = line_state([8, 8, 2, 2]);
        state.apply(Command::EndTurn, &mut rng()).unwrap();
        assert_eq!(state.board().player_dice(1), 16);
    }

    #[test]
    fn test_leader_prefers_regions_then_dice() {
        let state = line_state([1, 1, 8, 8]);
        assert_eq!(state.leader(), 2);
        let tied = line_state([8, 8, 1, 1]);
        assert_eq!(tied.leader(), 1);
    }
}
