//! Player strength evaluation

use dicewar_core::{Board, PlayerId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Heuristic weights for player strength evaluation
///
/// Raw dice measure material; connected groups measure structure. One
/// dominant contiguous group is easier to defend and to mass dice in,
/// hence the much heavier largest-group bonus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeuristicWeights {
    /// Bonus per region, applied to every connected group
    pub region_weight: f64,
    /// Bonus per region of the single largest connected group
    pub largest_region_weight: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            region_weight: 5.0,
            largest_region_weight: 50.0,
        }
    }
}

/// Strength score per player: total dice, plus structural bonuses for
/// consolidated territory. A player owning nothing scores zero.
pub fn evaluate_players(
    players: &[PlayerId],
    board: &Board,
    weights: &HeuristicWeights,
) -> FxHashMap<PlayerId, f64> {
    let mut scores = FxHashMap::default();
    for &player in players {
        let groups = board.player_groups(player);
        let mut score = board.player_dice(player) as f64;
        let mut largest = 0;
        for group in &groups {
            score += weights.region_weight * group.len() as f64;
            largest = largest.max(group.len());
        }
        score += weights.largest_region_weight * largest as f64;
        scores.insert(player, score);
    }
    scores
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dicewar_core::Region;

    /// Line of four regions: 0-1-2-3, players 1,1,2,2
    fn line_board(dice: [u8; 4]) -> Board {
        let adjacency: [&[u16]; 4] = [&[1], &[0, 2], &[1, 3], &[2]];
        let regions = adjacency
            .iter()
            .enumerate()
            .map(|(i, n)| Region {
                owner: if i < 2 { 1 } else { 2 },
                dice: dice[i],
                neighbors: n.to_vec(),
            })
            .collect();
        Board::new(regions)
    }

    #[test]
    fn test_exact_score() {
        let board = line_board([2, 3, 1, 1]);
        let scores = evaluate_players(&[1, 2], &board, &HeuristicWeights::default());
        // 5 dice + one group of two regions: 5 + 5*2 + 50*2 = 115
        assert_eq!(scores[&1], 115.0);
        assert_eq!(scores[&2], 112.0);
    }

    #[test]
    fn test_monotonic_in_dice() {
        let weights = HeuristicWeights::default();
        let poor = evaluate_players(&[1], &line_board([2, 2, 1, 1]), &weights);
        let rich = evaluate_players(&[1], &line_board([2, 8, 1, 1]), &weights);
        assert!(rich[&1] > poor[&1]);
    }

    #[test]
    fn test_fragmented_territory_scores_lower() {
        let weights = HeuristicWeights::default();
        let connected = line_board([2, 2, 1, 1]);
        let mut fragmented = line_board([2, 2, 1, 1]);
        // Same material, but player 1's two regions no longer touch.
        fragmented.set_owner(1, 2);
        fragmented.set_owner(2, 1);
        let a = evaluate_players(&[1], &connected, &weights);
        let b = evaluate_players(&[1], &fragmented, &weights);
        assert!(a[&1] > b[&1]);
    }

    #[test]
    fn test_eliminated_player_scores_zero() {
        let mut board = line_board([2, 2, 2, 2]);
        for id in 0..4 {
            board.set_owner(id, 2);
        }
        let scores = evaluate_players(&[1], &board, &HeuristicWeights::default());
        assert_eq!(scores[&1], 0.0);
    }

    #[test]
    fn test_only_requested_players_present() {
        let board = line_board([2, 2, 2, 2]);
        let scores = evaluate_players(&[1], &board, &HeuristicWeights::default());
        assert_eq!(scores.len(), 1);
        assert!(scores.contains_key(&1));
    }
}
