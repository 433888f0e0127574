//! Candidate turn generation
//!
//! Enumerates and ranks the plausible attacks and reinforcement transfers
//! for one player on one board snapshot. Attacks are filtered by the
//! combined probability of winning the battle and then holding the
//! captured region; transfers move dice from the interior toward the
//! front, valued by how defensible the receiving stack becomes.

use dicewar_core::{
    attack_success, probability_of_holding, probability_of_successful_attack, Board, PlayerId,
    RegionId, MAX_DICE,
};
use rustc_hash::FxHashSet;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Attack probability threshold with two or fewer players alive
const ATTACK_THRESHOLD_DUEL: f64 = 0.2;

/// Stricter attack threshold while more than two players are alive
const ATTACK_THRESHOLD_CROWDED: f64 = 0.4;

/// Score multiplier for attacks out of the largest group (duel)
const LARGEST_GROUP_WEIGHT_DUEL: f64 = 3.0;

/// Milder multiplier while more than two players are alive
const LARGEST_GROUP_WEIGHT_CROWDED: f64 = 2.0;

/// Alive-player count at or below which the duel tuning applies
const DUEL_PLAYER_LIMIT: usize = 2;

/// Minimum transfer value for a reinforcement move
const TRANSFER_THRESHOLD: f64 = 0.3;

// ============================================================================
// CANDIDATE TYPE
// ============================================================================

/// A candidate action, not yet committed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Turn {
    Attack { from: RegionId, to: RegionId },
    Transfer { from: RegionId, to: RegionId },
}

struct Scored {
    turn: Turn,
    score: f64,
}

/// Remaining transfer allowance while enumerating one candidate list
struct TransferBudget {
    used: u32,
    cap: u32,
}

impl TransferBudget {
    fn exhausted(&self) -> bool {
        self.used >= self.cap
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Ranked candidate turns for `player`, best first.
///
/// `transfers_used` seeds the transfer allowance: callers pass the acting
/// player's real per-turn transfer count, and zero for simulated
/// opponents (their transfer history is not tracked).
pub fn possible_turns(
    board: &Board,
    player: PlayerId,
    transfers_used: u32,
    max_transfers: u32,
) -> Vec<Turn> {
    let (threshold, largest_weight) = if board.players_alive_count() > DUEL_PLAYER_LIMIT {
        (ATTACK_THRESHOLD_CROWDED, LARGEST_GROUP_WEIGHT_CROWDED)
    } else {
        (ATTACK_THRESHOLD_DUEL, LARGEST_GROUP_WEIGHT_DUEL)
    };

    let mut turns: Vec<Scored> = Vec::new();
    let mut seen: FxHashSet<Turn> = FxHashSet::default();
    let largest_group = largest_group(board, player);

    for (from, to) in board.possible_attacks(player) {
        let mut score = probability_of_successful_attack(board, from, to)
            * probability_of_holding(board, to, board.region(to).dice, player);
        if score >= threshold || board.region(from).dice == MAX_DICE {
            if largest_group.contains(&from) {
                score *= largest_weight;
            }
            push_unique(&mut turns, &mut seen, Turn::Attack { from, to }, score);
        }
    }

    let owned = board.player_regions(player);
    let border: FxHashSet<RegionId> = board.player_border(player).into_iter().collect();
    let border_neighbor: FxHashSet<RegionId> = owned
        .iter()
        .copied()
        .filter(|id| {
            !border.contains(id)
                && board
                    .region(*id)
                    .neighbors
                    .iter()
                    .any(|n| border.contains(n))
        })
        .collect();
    let inner: FxHashSet<RegionId> = owned
        .iter()
        .copied()
        .filter(|id| !border.contains(id) && !border_neighbor.contains(id))
        .collect();

    let mut budget = TransferBudget {
        used: transfers_used,
        cap: max_transfers,
    };

    for &area in &owned {
        if budget.exhausted() {
            break;
        }

        if border_neighbor.contains(&area) {
            for &n in &board.region(area).neighbors {
                if inner.contains(&n) {
                    pull_chain(
                        board,
                        player,
                        n,
                        area,
                        &inner,
                        &border,
                        &mut budget,
                        &mut turns,
                        &mut seen,
                    );
                }
            }
        } else if border.contains(&area) && board.region(area).dice < MAX_DICE {
            for &n in &board.region(area).neighbors {
                let neighbor = board.region(n);
                if neighbor.owner != player {
                    continue;
                }
                let score = transfer_value(board, n, area, player);
                if neighbor.dice > 1 && score > TRANSFER_THRESHOLD && !border.contains(&n) {
                    if push_unique(&mut turns, &mut seen, Turn::Transfer { from: n, to: area }, score)
                    {
                        budget.used += 1;
                    }
                }
            }
        }
    }

    turns.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    turns.into_iter().map(|s| s.turn).collect()
}

// ============================================================================
// TRANSFER CHAINS
// ============================================================================

/// Post-order traversal frame: children are pulled before the node's own
/// move toward the front is considered.
enum Frame {
    Enter(RegionId, RegionId),
    Emit(RegionId, RegionId),
}

/// Pull dice through the interior toward `root` (a region one step behind
/// the front). Walks inner regions depth-first from `start`, deepest
/// source first, emitting a transfer along each chain link whose eventual
/// front value clears the threshold.
#[allow(clippy::too_many_arguments)]
fn pull_chain(
    board: &Board,
    player: PlayerId,
    start: RegionId,
    root: RegionId,
    inner: &FxHashSet<RegionId>,
    border: &FxHashSet<RegionId>,
    budget: &mut TransferBudget,
    turns: &mut Vec<Scored>,
    seen: &mut FxHashSet<Turn>,
) {
    let mut visited: FxHashSet<RegionId> = FxHashSet::default();
    let mut stack = vec![Frame::Enter(start, root)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(source, target) => {
                if !visited.insert(source) {
                    continue;
                }
                stack.push(Frame::Emit(source, target));
                // reversed so children pop in neighbor order
                for &n in board.region(source).neighbors.iter().rev() {
                    if inner.contains(&n) && !visited.contains(&n) {
                        stack.push(Frame::Enter(n, source));
                    }
                }
            }
            Frame::Emit(source, target) => {
                // best value this source could deliver to any front region
                // reachable through the chain root
                let best = board
                    .region(root)
                    .neighbors
                    .iter()
                    .filter(|n| border.contains(n))
                    .map(|&n| transfer_value(board, source, n, player))
                    .fold(f64::NEG_INFINITY, f64::max);

                if !budget.exhausted()
                    && best > TRANSFER_THRESHOLD
                    && board.region(target).dice < MAX_DICE
                    && board.region(source).dice > 1
                    && push_unique(turns, seen, Turn::Transfer { from: source, to: target }, best)
                {
                    budget.used += 1;
                }
            }
        }
    }
}

/// Value of merging `from`'s dice into `to`: the chance of holding the
/// merged stack, weighted by the strongest follow-up attack it enables.
/// Probed purely through dice-count parameters; the board is untouched.
fn transfer_value(board: &Board, from: RegionId, to: RegionId, player: PlayerId) -> f64 {
    let merged = (board.region(to).dice + board.region(from).dice).min(MAX_DICE);
    let mut best_attack = 1.0_f64;
    for &n in &board.region(to).neighbors {
        let neighbor = board.region(n);
        if neighbor.owner != player {
            best_attack = best_attack.max(attack_success(merged, neighbor.dice));
        }
    }
    probability_of_holding(board, to, merged, player) * best_attack
}

/// Members of the player's first maximal-size connected group
fn largest_group(board: &Board, player: PlayerId) -> FxHashSet<RegionId> {
    let groups = board.player_groups(player);
    let max = groups.iter().map(Vec::len).max().unwrap_or(0);
    groups
        .into_iter()
        .find(|g| g.len() == max)
        .unwrap_or_default()
        .into_iter()
        .collect()
}

fn push_unique(
    turns: &mut Vec<Scored>,
    seen: &mut FxHashSet<Turn>,
    turn: Turn,
    score: f64,
) -> bool {
    if seen.insert(turn) {
        turns.push(Scored { turn, score });
        true
    } else {
        false
    }
}

// ============================================================================
// TESTS
// ============================================================================
