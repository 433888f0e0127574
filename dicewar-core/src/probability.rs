//! Combat probability oracle
//!
//! Battles are decided by comparing the sum of the attacker's dice against
//! the sum of the defender's dice, ties going to the defender. The win
//! probabilities for every (attacker, defender) dice pairing are exact,
//! computed once by convolving d6 sum distributions.

use std::sync::LazyLock;

use crate::board::{Board, PlayerId, RegionId, MAX_DICE};

static SUCCESS_TABLE: LazyLock<[[f64; 9]; 9]> = LazyLock::new(build_success_table);

/// Probability distribution of the sum of `n` six-sided dice,
/// indexed by sum (0..=6n).
fn sum_distribution(n: usize) -> Vec<f64> {
    let mut dist = vec![1.0];
    for _ in 0..n {
        let mut next = vec![0.0; dist.len() + 6];
        for (sum, &p) in dist.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            for face in 1..=6 {
                next[sum + face] += p / 6.0;
            }
        }
        dist = next;
    }
    dist
}

fn build_success_table() -> [[f64; 9]; 9] {
    let dists: Vec<Vec<f64>> = (0..=MAX_DICE as usize).map(sum_distribution).collect();
    let mut table = [[0.0; 9]; 9];

    for atk in 1..=MAX_DICE as usize {
        for def in 1..=MAX_DICE as usize {
            let attacker = &dists[atk];
            let defender = &dists[def];
            let mut p = 0.0;
            for (sum, &weight) in attacker.iter().enumerate() {
                if weight == 0.0 {
                    continue;
                }
                let below: f64 = defender.iter().take(sum).sum();
                p += weight * below;
            }
            table[atk][def] = p;
        }
    }

    table
}

/// Probability that `atk_dice` attacking dice beat `def_dice` defending
/// dice (strictly greater sum).
pub fn attack_success(atk_dice: u8, def_dice: u8) -> f64 {
    debug_assert!((1..=MAX_DICE).contains(&atk_dice));
    debug_assert!((1..=MAX_DICE).contains(&def_dice));
    SUCCESS_TABLE[atk_dice as usize][def_dice as usize]
}

/// Probability that an attack between two adjacent regions succeeds,
/// at their current dice counts.
pub fn probability_of_successful_attack(board: &Board, from: RegionId, to: RegionId) -> f64 {
    attack_success(board.region(from).dice, board.region(to).dice)
}

/// Probability that `player` retains `region` at dice count `dice`
/// against every adjacent enemy region able to attack it.
///
/// The dice count is a parameter rather than read from the board so
/// callers can probe hypothetical garrisons without mutating anything.
pub fn probability_of_holding(board: &Board, region: RegionId, dice: u8, player: PlayerId) -> f64 {
    let mut probability = 1.0;
    for &n in &board.region(region).neighbors {
        let neighbor = board.region(n);
        if neighbor.owner != player && neighbor.can_attack() {
            probability *= 1.0 - attack_success(neighbor.dice, dice);
        }
    }
    probability
}

// ============================================================================
// TESTS
// ============================================================================
