//! Board logic: tile placement validation, open positions and meeple binding.

use std::collections::BTreeSet;

use super::features::feature_is_unclaimed;
use super::meeples::MeeplePlacement;
use super::player::{MeepleId, Player};
use super::tiles::Tile;
use super::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("player holds no tile")]
    NoTileInHand,
    #[error("position ({0}, {1}) is off the board")]
    OutOfBounds(i64, i64),
    #[error("position ({0}, {1}) is already occupied")]
    Occupied(usize, usize),
    #[error("position ({0}, {1}) does not touch any placed tile")]
    NotAdjacent(usize, usize),
    #[error("{side:?} edge does not match the neighbouring tile")]
    EdgeMismatch { side: Side },
}

impl PlacementError {
    pub fn code(self) -> u8 {
        match self {
            PlacementError::NoTileInHand => 1,
            PlacementError::OutOfBounds(..) => 2,
            PlacementError::Occupied(..) => 3,
            PlacementError::NotAdjacent(..) => 4,
            PlacementError::EdgeMismatch { .. } => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MeepleError {
    #[error("player has no meeples left")]
    NoMeeplesLeft,
    #[error("meeples may only go on the tile just placed")]
    NotLastPlacedTile,
    #[error("tile cell ({0}, {1}) is outside the tile")]
    OutOfTile(i64, i64),
    #[error("cell holds no claimable feature")]
    NoFeature,
    #[error("feature is already claimed")]
    FeatureClaimed,
}

impl MeepleError {
    pub fn code(self) -> u8 {
        match self {
            MeepleError::NoMeeplesLeft => 11,
            MeepleError::NotLastPlacedTile => 12,
            MeepleError::OutOfTile(..) => 13,
            MeepleError::NoFeature => 14,
            MeepleError::FeatureClaimed => 15,
        }
    }
}

/// Validate signed board coordinates coming from outside the engine.
pub fn board_coords(x: i64, y: i64) -> Result<(usize, usize), PlacementError> {
    let in_range = |v: i64| usize::try_from(v).ok().filter(|&v| v < BOARD_SPAN);
    match (in_range(x), in_range(y)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(PlacementError::OutOfBounds(x, y)),
    }
}

/// Validate signed tile-cell coordinates coming from outside the engine.
pub fn tile_coords(x: i64, y: i64) -> Result<(usize, usize), MeepleError> {
    let in_range = |v: i64| usize::try_from(v).ok().filter(|&v| v < TILE_SPAN);
    match (in_range(x), in_range(y)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(MeepleError::OutOfTile(x, y)),
    }
}

/// The placement surface: a `BOARD_SPAN` square of optional tiles plus the
/// meeples standing on them.
#[derive(Debug, Clone)]
pub struct Board {
    tiles: Vec<Option<Tile>>,
    placed: Vec<(usize, usize)>,
    meeples: MeeplePlacement,
}

impl Board {
    pub fn new() -> Self {
        Self {
            tiles: vec![None; BOARD_SPAN * BOARD_SPAN],
            placed: Vec::new(),
            meeples: MeeplePlacement::new(),
        }
    }

    pub fn tile_at(&self, x: usize, y: usize) -> Option<&Tile> {
        if x >= BOARD_SPAN || y >= BOARD_SPAN {
            return None;
        }
        self.tiles[y * BOARD_SPAN + x].as_ref()
    }

    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.tile_at(x, y).is_some()
    }

    /// Terrain at a cell, `None` when no tile covers it.
    pub fn terrain_at(&self, pos: BoardPosition) -> Option<TerrainKind> {
        self.tile_at(pos.x_board, pos.y_board)
            .map(|t| t.cell_at(pos.x_tile, pos.y_tile))
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Placed tile coordinates in placement order.
    pub fn placed_positions(&self) -> &[(usize, usize)] {
        &self.placed
    }

    pub fn meeples(&self) -> &MeeplePlacement {
        &self.meeples
    }

    pub fn meeples_mut(&mut self) -> &mut MeeplePlacement {
        &mut self.meeples
    }

    /// Check whether `tile`, in its current orientation, may go at `(x, y)`.
    ///
    /// Rules:
    /// 1. Position must be empty
    /// 2. Unless the board is empty, it must touch at least one placed tile
    /// 3. Every touching edge must match cell for cell
    pub fn check_placement(&self, tile: &Tile, x: usize, y: usize) -> Result<(), PlacementError> {
        if x >= BOARD_SPAN || y >= BOARD_SPAN {
            return Err(PlacementError::OutOfBounds(x as i64, y as i64));
        }
        if self.is_occupied(x, y) {
            return Err(PlacementError::Occupied(x, y));
        }
        if self.is_empty() {
            return Ok(());
        }

        let mut has_neighbor = false;
        for side in Side::ALL {
            let (dx, dy) = side.offset();
            let Some((nx, ny)) = offset_board(x, y, dx, dy) else {
                continue;
            };
            let Some(neighbor) = self.tile_at(nx, ny) else {
                continue;
            };
            has_neighbor = true;
            if tile.edge(side) != neighbor.edge(side.opposite()) {
                return Err(PlacementError::EdgeMismatch { side });
            }
        }

        if has_neighbor {
            Ok(())
        } else {
            Err(PlacementError::NotAdjacent(x, y))
        }
    }

    pub fn can_place(&self, tile: &Tile, x: usize, y: usize) -> bool {
        self.check_placement(tile, x, y).is_ok()
    }

    /// Move the player's hand tile onto the board. On failure nothing changes.
    pub fn place_tile(
        &mut self,
        player: &mut Player,
        x: usize,
        y: usize,
    ) -> Result<(), PlacementError> {
        let tile = player.hand().ok_or(PlacementError::NoTileInHand)?;
        self.check_placement(tile, x, y)?;

        let tile = player.take_hand().ok_or(PlacementError::NoTileInHand)?;
        self.tiles[y * BOARD_SPAN + x] = Some(tile);
        self.placed.push((x, y));
        player.set_last_placed((x, y));
        Ok(())
    }

    /// Empty positions touching a placed tile; the centre when the board is empty.
    pub fn open_positions(&self) -> Vec<(usize, usize)> {
        if self.is_empty() {
            return vec![(BOARD_CENTER, BOARD_CENTER)];
        }
        let mut open: BTreeSet<(usize, usize)> = BTreeSet::new();
        for &(x, y) in &self.placed {
            for side in Side::ALL {
                let (dx, dy) = side.offset();
                if let Some((nx, ny)) = offset_board(x, y, dx, dy) {
                    if !self.is_occupied(nx, ny) {
                        open.insert((nx, ny));
                    }
                }
            }
        }
        open.into_iter().collect()
    }

    /// Whether `tile` fits somewhere in any of its four orientations.
    pub fn has_valid_placement(&self, tile: &Tile) -> bool {
        let open = self.open_positions();
        let mut candidate = tile.clone();
        for _ in 0..4 {
            if open.iter().any(|&(x, y)| self.can_place(&candidate, x, y)) {
                return true;
            }
            candidate.rotate_clockwise();
        }
        false
    }

    /// Occupied tiles among the eight surrounding `(x, y)`.
    pub fn surrounding_tile_count(&self, x: usize, y: usize) -> usize {
        let mut count = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if let Some((nx, ny)) = offset_board(x, y, dx, dy) {
                    if self.is_occupied(nx, ny) {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    /// Put one of the player's unplaced meeples on a cell of the tile they just placed.
    ///
    /// Rules:
    /// 1. Player has at least one unplaced meeple
    /// 2. The tile is the one this player placed last
    /// 3. The cell holds a claimable feature that no meeple already occupies
    pub fn place_meeple(
        &mut self,
        player: &Player,
        x_board: usize,
        y_board: usize,
        x_tile: usize,
        y_tile: usize,
    ) -> Result<MeepleId, MeepleError> {
        let meeple = player
            .meeples()
            .iter()
            .copied()
            .find(|m| !self.meeples.is_placed(*m))
            .ok_or(MeepleError::NoMeeplesLeft)?;

        if player.last_placed() != Some((x_board, y_board)) {
            return Err(MeepleError::NotLastPlacedTile);
        }
        if x_tile >= TILE_SPAN || y_tile >= TILE_SPAN {
            return Err(MeepleError::OutOfTile(x_tile as i64, y_tile as i64));
        }

        let cell = BoardPosition::new(x_board, y_board, x_tile, y_tile);
        match self.terrain_at(cell) {
            Some(kind) if kind.is_claimable() => {}
            _ => return Err(MeepleError::NoFeature),
        }
        if !feature_is_unclaimed(self, cell) {
            return Err(MeepleError::FeatureClaimed);
        }

        self.meeples.bind(meeple, cell);
        Ok(meeple)
    }

    pub fn meeple_at(
        &self,
        x_board: usize,
        y_board: usize,
        x_tile: usize,
        y_tile: usize,
    ) -> Option<MeepleId> {
        self.meeples
            .meeple_at(&BoardPosition::new(x_board, y_board, x_tile, y_tile))
    }

    pub fn meeples_placed(&self, player: usize) -> usize {
        self.meeples.placed_count(player)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Board {
    /// Drop a tile in without any rule checks.
    pub(crate) fn put_tile(&mut self, x: usize, y: usize, tile: Tile) {
        assert!(!self.is_occupied(x, y));
        self.tiles[y * BOARD_SPAN + x] = Some(tile);
        self.placed.push((x, y));
    }

    /// Stand a meeple on a cell without any rule checks.
    pub(crate) fn put_meeple(&mut self, meeple: MeepleId, cell: BoardPosition) {
        self.meeples.bind(meeple, cell);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::games::carcassonne::tiles::tile_by_id;

    /// Catalog tile turned `quarter_turns` clockwise.
    pub fn tile(identifier: &str, quarter_turns: u8) -> Tile {
        let mut tile = tile_by_id(identifier).expect("known tile id");
        tile.set_orientation(quarter_turns);
        tile
    }

    /// Hand `tile` to `player` and place it, panicking on any rule failure.
    pub fn place(board: &mut Board, player: &mut Player, tile: Tile, x: usize, y: usize) {
        player.set_hand(tile);
        board
            .place_tile(player, x, y)
            .unwrap_or_else(|e| panic!("placing at ({x}, {y}) failed: {e}"));
    }
}
