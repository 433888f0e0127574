//! Region graph and board snapshot queries

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};

/// Maximum number of dice a single region can hold
pub const MAX_DICE: u8 = 8;

/// Player identifier (table seat)
pub type PlayerId = u8;

/// Region identifier (index into the board's region list)
pub type RegionId = u16;

/// A region of the map: one node in the adjacency graph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub owner: PlayerId,
    pub dice: u8,
    pub neighbors: Vec<RegionId>,
}

impl Region {
    /// A region needs at least two dice to launch an attack
    pub fn can_attack(&self) -> bool {
        self.dice > 1
    }
}

/// Board snapshot (clone to mutate)
///
/// The board owns the graph structure; simulation only ever rewrites
/// owners and dice counts. Connected same-owner groups are derived data,
/// cached until an ownership change invalidates them.
#[derive(Clone, Debug)]
pub struct Board {
    regions: Vec<Region>,
    groups: RefCell<FxHashMap<PlayerId, Vec<Vec<RegionId>>>>,
}

impl Board {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            groups: RefCell::new(FxHashMap::default()),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id as usize]
    }

    /// Iterate all regions in ascending id order
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.regions
            .iter()
            .enumerate()
            .map(|(i, r)| (i as RegionId, r))
    }

    /// True if two regions share an edge
    pub fn adjacent(&self, a: RegionId, b: RegionId) -> bool {
        self.region(a).neighbors.contains(&b)
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    pub fn set_dice(&mut self, id: RegionId, dice: u8) {
        debug_assert!((1..=MAX_DICE).contains(&dice));
        self.regions[id as usize].dice = dice;
    }

    /// Dice changes cannot alter connectivity, so only this invalidates
    /// the group cache.
    pub fn set_owner(&mut self, id: RegionId, owner: PlayerId) {
        self.regions[id as usize].owner = owner;
        self.groups.borrow_mut().clear();
    }

    // ========================================================================
    // PLAYER QUERIES
    // ========================================================================

    /// Ids of all regions owned by the player, ascending
    pub fn player_regions(&self, player: PlayerId) -> Vec<RegionId> {
        self.regions()
            .filter(|(_, r)| r.owner == player)
            .map(|(id, _)| id)
            .collect()
    }

    /// True if the region touches at least one enemy region
    pub fn is_border(&self, id: RegionId) -> bool {
        let owner = self.region(id).owner;
        self.region(id)
            .neighbors
            .iter()
            .any(|&n| self.region(n).owner != owner)
    }

    /// Owned regions directly adjacent to an enemy, ascending
    pub fn player_border(&self, player: PlayerId) -> Vec<RegionId> {
        self.regions()
            .filter(|(id, r)| r.owner == player && self.is_border(*id))
            .map(|(id, _)| id)
            .collect()
    }

    /// Maximal connected same-owner groups for the player.
    ///
    /// Groups are ordered by their lowest region id and each group lists
    /// its members ascending, so results are deterministic. Cached per
    /// snapshot until the next ownership change.
    pub fn player_groups(&self, player: PlayerId) -> Vec<Vec<RegionId>> {
        if let Some(groups) = self.groups.borrow().get(&player) {
            return groups.clone();
        }
        let groups = self.compute_groups(player);
        self.groups.borrow_mut().insert(player, groups.clone());
        groups
    }

    fn compute_groups(&self, player: PlayerId) -> Vec<Vec<RegionId>> {
        let mut visited: FxHashSet<RegionId> = FxHashSet::default();
        let mut groups = Vec::new();

        for (id, region) in self.regions() {
            if region.owner != player || visited.contains(&id) {
                continue;
            }
            let mut group = Vec::new();
            let mut stack = vec![id];
            visited.insert(id);
            while let Some(current) = stack.pop() {
                group.push(current);
                for &n in &self.region(current).neighbors {
                    if self.region(n).owner == player && visited.insert(n) {
                        stack.push(n);
                    }
                }
            }
            group.sort_unstable();
            groups.push(group);
        }

        groups
    }

    /// Total dice owned by the player
    pub fn player_dice(&self, player: PlayerId) -> u32 {
        self.regions()
            .filter(|(_, r)| r.owner == player)
            .map(|(_, r)| r.dice as u32)
            .sum()
    }

    /// Players that still own at least one region, ascending
    pub fn alive_players(&self) -> Vec<PlayerId> {
        let mut owners: Vec<PlayerId> = self
            .regions
            .iter()
            .map(|r| r.owner)
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        owners.sort_unstable();
        owners
    }

    pub fn players_alive_count(&self) -> usize {
        self.regions
            .iter()
            .map(|r| r.owner)
            .collect::<FxHashSet<_>>()
            .len()
    }

    /// Every (source, target) pair where the player can attack: source is
    /// an owned border region with more than one die, target an adjacent
    /// enemy region. Ascending by source id, then neighbor order.
    pub fn possible_attacks(&self, player: PlayerId) -> Vec<(RegionId, RegionId)> {
        let mut attacks = Vec::new();
        for source in self.player_border(player) {
            if !self.region(source).can_attack() {
                continue;
            }
            for &target in &self.region(source).neighbors {
                if self.region(target).owner != player {
                    attacks.push((source, target));
                }
            }
        }
        attacks
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Line of four regions: 0-1-2-3, players 1,1,2,2, dice 2 each
    fn line_board() -> Board {
        let adjacency: [&[RegionId]; 4] = [&[1], &[0, 2], &[1, 3], &[2]];
        let regions = adjacency
            .iter()
            .enumerate()
            .map(|(i, n)| Region {
                owner: if i < 2 { 1 } else { 2 },
                dice: 2,
                neighbors: n.to_vec(),
            })
            .collect();
        Board::new(regions)
    }

    #[test]
    fn test_player_regions_and_dice() {
        let board = line_board();
        assert_eq!(board.player_regions(1), vec![0, 1]);
        assert_eq!(board.player_regions(2), vec![2, 3]);
        assert_eq!(board.player_dice(1), 4);
    }

    #[test]
    fn test_border() {
        let board = line_board();
        assert_eq!(board.player_border(1), vec![1]);
        assert_eq!(board.player_border(2), vec![2]);
        assert!(!board.is_border(0));
        assert!(board.is_border(1));
    }

    #[test]
    fn test_groups_split_and_merge() {
        let mut board = line_board();
        assert_eq!(board.player_groups(1), vec![vec![0, 1]]);

        // Capturing region 2 extends player 1's group
        board.set_owner(2, 1);
        assert_eq!(board.player_groups(1), vec![vec![0, 1, 2]]);
        assert_eq!(board.player_groups(2), vec![vec![3]]);
    }

    #[test]
    fn test_group_cache_invalidation() {
        let mut board = line_board();
        let before = board.player_groups(2);
        assert_eq!(before.len(), 1);

        // Losing the middle region splits nothing for player 2 but the
        // cache must still be rebuilt, not served stale.
        board.set_owner(2, 1);
        let after = board.player_groups(2);
        assert_eq!(after, vec![vec![3]]);
    }

    #[test]
    fn test_disconnected_groups() {
        let mut board = line_board();
        // 1 . . 1 with player 2 squeezed in the middle
        board.set_owner(1, 2);
        board.set_owner(3, 1);
        assert_eq!(board.player_groups(1), vec![vec![0], vec![3]]);
    }

    #[test]
    fn test_possible_attacks() {
        let board = line_board();
        assert_eq!(board.possible_attacks(1), vec![(1, 2)]);

        let mut single = line_board();
        single.set_dice(1, 1);
        assert!(single.possible_attacks(1).is_empty());
    }

    #[test]
    fn test_alive_players() {
        let mut board = line_board();
        assert_eq!(board.alive_players(), vec![1, 2]);
        assert_eq!(board.players_alive_count(), 2);

        for id in 0..4 {
            board.set_owner(id, 1);
        }
        assert_eq!(board.alive_players(), vec![1]);
    }

    #[test]
    fn test_clone_is_independent() {
        let board = line_board();
        let mut copy = board.clone();
        copy.set_owner(0, 2);
        copy.set_dice(0, 8);
        assert_eq!(board.region(0).owner, 1);
        assert_eq!(board.region(0).dice, 2);
    }
}
