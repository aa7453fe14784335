//! Where each placed meeple stands.

use std::collections::{BTreeMap, HashMap};

use super::player::MeepleId;
use super::types::BoardPosition;

/// Meeple-to-cell bindings with a reverse index by cell.
///
/// A meeple absent from the map is in its owner's unplaced pool.
#[derive(Debug, Clone, Default)]
pub struct MeeplePlacement {
    by_meeple: BTreeMap<MeepleId, BoardPosition>,
    by_cell: HashMap<BoardPosition, MeepleId>,
}

impl MeeplePlacement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `meeple` to `cell`. The caller has already checked the feature is unclaimed.
    pub fn bind(&mut self, meeple: MeepleId, cell: BoardPosition) {
        assert!(
            !self.by_meeple.contains_key(&meeple),
            "meeple {meeple:?} is already on the board"
        );
        assert!(
            !self.by_cell.contains_key(&cell),
            "cell {cell:?} already holds a meeple"
        );
        self.by_meeple.insert(meeple, cell);
        self.by_cell.insert(cell, meeple);
    }

    /// Return a meeple to its owner's pool, yielding the cell it stood on.
    pub fn release(&mut self, meeple: MeepleId) -> Option<BoardPosition> {
        let cell = self.by_meeple.remove(&meeple)?;
        self.by_cell.remove(&cell);
        Some(cell)
    }

    pub fn meeple_at(&self, cell: &BoardPosition) -> Option<MeepleId> {
        self.by_cell.get(cell).copied()
    }

    pub fn is_placed(&self, meeple: MeepleId) -> bool {
        self.by_meeple.contains_key(&meeple)
    }

    pub fn placed_count(&self, player: usize) -> usize {
        self.by_meeple.keys().filter(|m| m.player == player).count()
    }

    /// Placed meeples in `MeepleId` order.
    pub fn iter(&self) -> impl Iterator<Item = (MeepleId, BoardPosition)> + '_ {
        self.by_meeple.iter().map(|(m, c)| (*m, *c))
    }

    pub fn len(&self) -> usize {
        self.by_meeple.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_meeple.is_empty()
    }
}
