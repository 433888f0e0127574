//! Max^n lookahead
//!
//! Each surviving player in turn maximizes its own heuristic: the
//! rotation is consumed from the tail, one player per exhausted window,
//! and every player explores its own move sequences down to the window
//! depth before handing the board to the next player. Boards and
//! rotations are passed by value, so sibling branches can never observe
//! each other's mutations.

use dicewar_core::{Board, PlayerId, MAX_DICE};
use rustc_hash::FxHashMap;

use crate::eval::{evaluate_players, HeuristicWeights};
use crate::turns::{possible_turns, Turn};

/// Fixed parameters for one turn decision
pub(crate) struct SearchContext<'a> {
    /// The player this search ultimately serves
    pub player: PlayerId,
    /// Real transfers the acting player has already made this turn;
    /// simulated opponents always restart from zero
    pub transfers_used: u32,
    pub max_transfers: u32,
    /// Full lookahead window granted to each player
    pub depth: u32,
    pub weights: &'a HeuristicWeights,
}

/// Best turn for the player at the rotation's tail, together with the
/// heuristic map of the branch that produced it. `None` when the player
/// has nothing worth doing (the boundary resolves that to end-turn).
pub(crate) fn max_n(
    ctx: &SearchContext,
    board: &Board,
    rotation: &[PlayerId],
    depth: u32,
) -> (Option<Turn>, FxHashMap<PlayerId, f64>) {
    let Some((&player, rest)) = rotation.split_last() else {
        return (None, evaluate_players(&[ctx.player], board, ctx.weights));
    };

    // eliminated players drop out without consuming lookahead
    if board.player_regions(player).is_empty() {
        return max_n(ctx, board, rest, depth);
    }

    if depth == 0 {
        if rest.is_empty() {
            let alive = board.alive_players();
            return (None, evaluate_players(&alive, board, ctx.weights));
        }
        // the next player starts its own full window
        return max_n(ctx, board, rest, ctx.depth);
    }

    let transfers_used = if player == ctx.player {
        ctx.transfers_used
    } else {
        0
    };
    let mut candidates = possible_turns(board, player, transfers_used, ctx.max_transfers);
    candidates.truncate(depth as usize);

    if candidates.is_empty() {
        let (_, heuristics) = max_n(ctx, board, rotation, 0);
        return (None, heuristics);
    }

    let mut best: Option<(Turn, FxHashMap<PlayerId, f64>, f64)> = None;
    for turn in candidates {
        let mut copy = board.clone();
        simulate(&mut copy, turn);
        let (_, heuristics) = max_n(ctx, &copy, rotation, depth - 1);
        let Some(&value) = heuristics.get(&player) else {
            continue;
        };
        if best.as_ref().map_or(true, |(_, _, b)| value > *b) {
            best = Some((turn, heuristics, value));
        }
    }

    match best {
        Some((turn, heuristics, _)) => (Some(turn), heuristics),
        None => (None, FxHashMap::default()),
    }
}

/// Apply a candidate to a board copy. Attacks always succeed here: the
/// success probability filters generation, it never branches the search.
pub(crate) fn simulate(board: &mut Board, turn: Turn) {
    match turn {
        Turn::Attack { from, to } => {
            let dice = board.region(from).dice;
            let owner = board.region(from).owner;
            board.set_dice(to, dice - 1);
            board.set_dice(from, 1);
            board.set_owner(to, owner);
        }
        Turn::Transfer { from, to } => {
            let source_dice = board.region(from).dice;
            let target_dice = board.region(to).dice;
            let merged = (target_dice + source_dice).min(MAX_DICE);
            let moved = merged - target_dice;
            board.set_dice(to, merged);
            board.set_dice(from, (source_dice - moved).max(1));
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dicewar_core::Region;

    fn board(regions: Vec<(PlayerId, u8, &[u16])>) -> Board {
        Board::new(
            regions
                .into_iter()
                .map(|(owner, dice, neighbors)| Region {
                    owner,
                    dice,
                    neighbors: neighbors.to_vec(),
                })
                .collect(),
        )
    }

    fn ctx(player: PlayerId, depth: u32, weights: &HeuristicWeights) -> SearchContext<'_> {
        SearchContext {
            player,
            transfers_used: 0,
            max_transfers: 10,
            depth,
            weights,
        }
    }

    #[test]
    fn test_simulate_attack_postconditions() {
        let mut b = board(vec![(1, 5, &[1]), (2, 3, &[0])]);
        simulate(&mut b, Turn::Attack { from: 0, to: 1 });
        assert_eq!(b.region(1).owner, 1);
        assert_eq!(b.region(1).dice, 4);
        assert_eq!(b.region(0).dice, 1);
    }

    #[test]
    fn test_simulate_attack_assigns_source_owner_not_source_id() {
        // Region 2 attacks region 0; the new owner is player 5, not "2".
        let mut b = board(vec![(1, 2, &[2]), (9, 1, &[2]), (5, 6, &[0, 1])]);
        simulate(&mut b, Turn::Attack { from: 2, to: 0 });
        assert_eq!(b.region(0).owner, 5);
    }

    #[test]
    fn test_simulate_transfer_postconditions() {
        let mut b = board(vec![(1, 6, &[1]), (1, 5, &[0])]);
        simulate(&mut b, Turn::Transfer { from: 0, to: 1 });
        // 5 + 6 caps at 8; the 3 that did not fit stay behind.
        assert_eq!(b.region(1).dice, 8);
        assert_eq!(b.region(0).dice, 3);

        let mut b = board(vec![(1, 4, &[1]), (1, 2, &[0])]);
        simulate(&mut b, Turn::Transfer { from: 0, to: 1 });
        assert_eq!(b.region(1).dice, 6);
        assert_eq!(b.region(0).dice, 1);
    }

    #[test]
    fn test_single_player_single_region() {
        let b = board(vec![(1, 3, &[])]);
        let weights = HeuristicWeights::default();
        let (turn, heuristics) = max_n(&ctx(1, 3, &weights), &b, &[1], 3);
        assert_eq!(turn, None);
        assert_eq!(heuristics.len(), 1);
        // 3 dice + one group of one region: 3 + 5 + 50
        assert_eq!(heuristics[&1], 58.0);
    }

    #[test]
    fn test_depth_zero_consumes_one_player_per_call() {
        let b = board(vec![
            (1, 2, &[1]),
            (1, 2, &[0, 2]),
            (2, 2, &[1, 3]),
            (2, 2, &[2]),
        ]);
        let weights = HeuristicWeights::default();
        // Acting player sits at the tail of the rotation.
        let (turn, heuristics) = max_n(&ctx(1, 0, &weights), &b, &[2, 1], 0);
        assert_eq!(turn, None);
        assert!(heuristics.contains_key(&1));
        assert!(heuristics.contains_key(&2));
    }

    #[test]
    fn test_eliminated_player_is_skipped() {
        let b = board(vec![(1, 8, &[1]), (2, 2, &[0])]);
        let weights = HeuristicWeights::default();
        // Player 3 owns nothing and sits at the tail; the search must
        // fall through to player 1 at the same depth.
        let (turn, heuristics) = max_n(&ctx(1, 1, &weights), &b, &[1, 3], 1);
        assert_eq!(turn, Some(Turn::Attack { from: 0, to: 1 }));
        assert!(heuristics.contains_key(&1));
    }

    #[test]
    fn test_search_leaves_caller_board_untouched() {
        let b = board(vec![(1, 8, &[1]), (2, 2, &[0])]);
        let weights = HeuristicWeights::default();
        let _ = max_n(&ctx(1, 2, &weights), &b, &[1], 2);
        assert_eq!(b.region(0).owner, 1);
        assert_eq!(b.region(0).dice, 8);
        assert_eq!(b.region(1).owner, 2);
        assert_eq!(b.region(1).dice, 2);
    }

    #[test]
    fn test_lookahead_prefers_the_consolidating_attack() {
        // Capturing region 1 bridges toward region 3 and lets a follow-up
        // transfer build one three-region group; capturing region 2 only
        // ever yields a two-region group. The generator ranks the region 2
        // attack higher (it is the safer capture), so only lookahead finds
        // the better line.
        let b = board(vec![
            (1, 8, &[1, 2]),
            (2, 3, &[0, 3]),
            (2, 1, &[0]),
            (1, 2, &[1]),
        ]);
        let weights = HeuristicWeights::default();
        let (turn, heuristics) = max_n(&ctx(1, 2, &weights), &b, &[1], 2);
        assert_eq!(turn, Some(Turn::Attack { from: 0, to: 1 }));
        // 11 dice + three regions in one group: 11 + 5*3 + 50*3
        assert_eq!(heuristics[&1], 176.0);
        assert_eq!(heuristics[&2], 56.0);
    }

    #[test]
    fn test_ties_keep_the_first_candidate() {
        // Both captures lead to mirror-image positions with identical
        // heuristics; strict comparison keeps the first-ranked candidate.
        let b = board(vec![(1, 8, &[1, 2]), (2, 1, &[0]), (2, 1, &[0])]);
        let weights = HeuristicWeights::default();
        let (turn, _) = max_n(&ctx(1, 2, &weights), &b, &[1], 2);
        assert_eq!(turn, Some(Turn::Attack { from: 0, to: 1 }));
    }
}
