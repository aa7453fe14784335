//! Players, their meeple pools and running scores.

use serde::{Deserialize, Serialize};

use super::tiles::Tile;
use super::types::MEEPLES_PER_PLAYER;

/// Identity of one meeple: owner seat plus index within the owner's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeepleId {
    pub player: usize,
    pub index: usize,
}

/// Points earned per feature category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub roads: u32,
    pub cities: u32,
    pub cloisters: u32,
    pub fields: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureCategory {
    Road,
    City,
    Cloister,
    Field,
}

#[derive(Debug, Clone)]
pub struct Player {
    index: usize,
    meeples: [MeepleId; MEEPLES_PER_PLAYER],
    score: u32,
    breakdown: ScoreBreakdown,
    hand: Option<Tile>,
    last_placed: Option<(usize, usize)>,
}

impl Player {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            meeples: std::array::from_fn(|i| MeepleId { player: index, index: i }),
            score: 0,
            breakdown: ScoreBreakdown::default(),
            hand: None,
            last_placed: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn meeples(&self) -> &[MeepleId] {
        &self.meeples
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        self.breakdown
    }

    pub fn add_points(&mut self, category: FeatureCategory, points: u32) {
        self.score += points;
        match category {
            FeatureCategory::Road => self.breakdown.roads += points,
            FeatureCategory::City => self.breakdown.cities += points,
            FeatureCategory::Cloister => self.breakdown.cloisters += points,
            FeatureCategory::Field => self.breakdown.fields += points,
        }
    }

    pub fn hand(&self) -> Option<&Tile> {
        self.hand.as_ref()
    }

    pub fn hand_mut(&mut self) -> Option<&mut Tile> {
        self.hand.as_mut()
    }

    pub fn set_hand(&mut self, tile: Tile) {
        self.hand = Some(tile);
    }

    pub fn take_hand(&mut self) -> Option<Tile> {
        self.hand.take()
    }

    /// Board coordinates of the last tile this player placed.
    pub fn last_placed(&self) -> Option<(usize, usize)> {
        self.last_placed
    }

    pub fn set_last_placed(&mut self, pos: (usize, usize)) {
        self.last_placed = Some(pos);
    }
}
