//! Map definition: serializable region layouts and random generation

use std::path::Path;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, PlayerId, Region, RegionId, MAX_DICE};

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map has no regions")]
    Empty,
    #[error("owners and dice lists have different lengths")]
    LengthMismatch,
    #[error("region {region} has {dice} dice, outside 1..=8")]
    DiceOutOfRange { region: RegionId, dice: u8 },
    #[error("edge ({0}, {1}) references an unknown region")]
    UnknownRegion(RegionId, RegionId),
    #[error("region {0} has an edge to itself")]
    SelfLoop(RegionId),
    #[error("region {0} has no neighbors")]
    Isolated(RegionId),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A board layout: per-region owner and dice, plus the adjacency edges.
/// This is the on-disk format; `to_board` validates and expands it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    pub name: String,
    pub owners: Vec<PlayerId>,
    pub dice: Vec<u8>,
    pub edges: Vec<(RegionId, RegionId)>,
}

impl Map {
    /// Validate and build a playable board
    pub fn to_board(&self) -> Result<Board, MapError> {
        if self.owners.is_empty() {
            return Err(MapError::Empty);
        }
        if self.owners.len() != self.dice.len() {
            return Err(MapError::LengthMismatch);
        }
        let count = self.owners.len();

        for (i, &dice) in self.dice.iter().enumerate() {
            if !(1..=MAX_DICE).contains(&dice) {
                return Err(MapError::DiceOutOfRange {
                    region: i as RegionId,
                    dice,
                });
            }
        }

        let mut neighbors: Vec<Vec<RegionId>> = vec![Vec::new(); count];
        for &(a, b) in &self.edges {
            if a as usize >= count || b as usize >= count {
                return Err(MapError::UnknownRegion(a, b));
            }
            if a == b {
                return Err(MapError::SelfLoop(a));
            }
            neighbors[a as usize].push(b);
            neighbors[b as usize].push(a);
        }
        for (i, list) in neighbors.iter_mut().enumerate() {
            list.sort_unstable();
            list.dedup();
            if list.is_empty() {
                return Err(MapError::Isolated(i as RegionId));
            }
        }

        let regions = self
            .owners
            .iter()
            .zip(&self.dice)
            .zip(neighbors)
            .map(|((&owner, &dice), neighbors)| Region {
                owner,
                dice,
                neighbors,
            })
            .collect();
        Ok(Board::new(regions))
    }

    /// Snapshot an existing board back into the serializable form
    pub fn from_board(name: &str, board: &Board) -> Self {
        let mut edges = Vec::new();
        for (id, region) in board.regions() {
            for &n in &region.neighbors {
                if id < n {
                    edges.push((id, n));
                }
            }
        }
        Self {
            name: name.to_string(),
            owners: board.regions().map(|(_, r)| r.owner).collect(),
            dice: board.regions().map(|(_, r)| r.dice).collect(),
            edges,
        }
    }

    /// Distinct players present on the map, in seat order
    pub fn players(&self) -> Vec<PlayerId> {
        let mut players = self.owners.clone();
        players.sort_unstable();
        players.dedup();
        players
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Random rectangular map: grid adjacency, regions dealt round-robin
    /// to the players in shuffled order, then two extra dice per owned
    /// region placed randomly.
    pub fn random_grid<R: Rng>(
        rng: &mut R,
        width: usize,
        height: usize,
        players: &[PlayerId],
        name: &str,
    ) -> Self {
        let count = width * height;
        debug_assert!(count > 0 && !players.is_empty());

        let mut order: Vec<usize> = (0..count).collect();
        order.shuffle(rng);
        let mut owners = vec![0; count];
        for (i, &region) in order.iter().enumerate() {
            owners[region] = players[i % players.len()];
        }

        let mut dice = vec![1u8; count];
        for &player in players {
            let owned: Vec<usize> = (0..count).filter(|&i| owners[i] == player).collect();
            for _ in 0..owned.len() * 2 {
                let open: Vec<usize> = owned
                    .iter()
                    .copied()
                    .filter(|&i| dice[i] < MAX_DICE)
                    .collect();
                match open.choose(rng) {
                    Some(&i) => dice[i] += 1,
                    None => break,
                }
            }
        }

        let mut edges = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let id = (y * width + x) as RegionId;
                if x + 1 < width {
                    edges.push((id, id + 1));
                }
                if y + 1 < height {
                    edges.push((id, id + width as RegionId));
                }
            }
        }

        Self {
            name: name.to_string(),
            owners,
            dice,
            edges,
        }
    }

    /// Named two-player map (fixed seed)
    pub fn duel() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        Self::random_grid(&mut rng, 4, 3, &[1, 2], "duel")
    }

    /// Named four-player map (fixed seed)
    pub fn skirmish() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        Self::random_grid(&mut rng, 5, 4, &[1, 2, 3, 4], "skirmish")
    }
}

// ============================================================================
// TESTS
// ============================================================================
