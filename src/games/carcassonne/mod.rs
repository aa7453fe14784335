//! Tile-laying game core: tiles, board, feature scoring and the turn loop.

pub mod board;
pub mod draw_pile;
pub mod features;
pub mod game;
pub mod meeples;
pub mod player;
pub mod scoring;
pub mod tiles;
pub mod types;

pub use board::{Board, MeepleError, PlacementError};
pub use draw_pile::{DrawPile, PileEmpty};
pub use game::{DrawnTile, Game, TurnOutcome};
pub use player::{MeepleId, Player, ScoreBreakdown};
pub use tiles::Tile;
pub use types::{BoardPosition, GameState, Rotation};
