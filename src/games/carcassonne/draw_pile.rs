//! The shuffled stack of tiles still to be drawn.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::tiles::{build_tile_bag, tile_by_id, Tile, STARTING_TILE_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the draw pile is empty")]
pub struct PileEmpty;

/// Remaining tiles. The opening draw always yields the starting tile; every
/// later draw takes the top tile and reshuffles what is left.
#[derive(Debug, Clone)]
pub struct DrawPile {
    starting_tile: Option<Tile>,
    tiles: Vec<Tile>,
    rng: StdRng,
}

impl DrawPile {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let mut tiles = build_tile_bag();
        tiles.shuffle(&mut rng);
        let starting_tile =
            tile_by_id(STARTING_TILE_ID).expect("starting tile is part of the catalog");
        Self {
            starting_tile: Some(starting_tile),
            tiles,
            rng,
        }
    }

    pub fn draw(&mut self) -> Result<Tile, PileEmpty> {
        if let Some(tile) = self.starting_tile.take() {
            return Ok(tile);
        }
        let tile = self.tiles.pop().ok_or(PileEmpty)?;
        self.tiles.shuffle(&mut self.rng);
        Ok(tile)
    }

    pub fn is_empty(&self) -> bool {
        self.starting_tile.is_none() && self.tiles.is_empty()
    }

    /// Tiles left, the starting tile included until it is drawn.
    pub fn remaining(&self) -> usize {
        self.tiles.len() + usize::from(self.starting_tile.is_some())
    }
}

#[cfg(test)]
impl DrawPile {
    /// A fixed pile: `starting` first, then `tiles` from the back.
    pub(crate) fn stacked(starting: Tile, tiles: Vec<Tile>) -> Self {
        Self {
            starting_tile: Some(starting),
            tiles,
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl Default for DrawPile {
    fn default() -> Self {
        Self::new()
    }
}
