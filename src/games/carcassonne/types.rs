//! Carcassonne core types: terrain, sides, positions and game phases.

use serde::{Deserialize, Serialize};

/// Side length of a tile's terrain grid.
pub const TILE_SPAN: usize = 7;

/// Width and height of the board. Odd, so the start tile sits dead centre.
pub const BOARD_SPAN: usize = 145;

/// Board index of the centre cell on both axes.
pub const BOARD_CENTER: usize = BOARD_SPAN / 2;

/// Meeples handed to every player at construction.
pub const MEEPLES_PER_PLAYER: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    City,
    Road,
    Field,
    Cloister,
    River,
    Empty,
}

impl TerrainKind {
    /// Map a pattern character, case-insensitively. Unknown characters are `Empty`.
    pub fn from_char(c: char) -> Self {
        match c.to_ascii_lowercase() {
            'k' => TerrainKind::Cloister,
            'c' => TerrainKind::City,
            'r' => TerrainKind::Road,
            'i' => TerrainKind::River,
            'f' => TerrainKind::Field,
            _ => TerrainKind::Empty,
        }
    }

    /// Whether a meeple may claim a cell of this kind.
    pub fn is_claimable(self) -> bool {
        matches!(
            self,
            TerrainKind::City | TerrainKind::Road | TerrainKind::Field | TerrainKind::Cloister
        )
    }
}

/// One side of a tile, also used as a step direction. North is towards row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// Unit offset `(dx, dy)` with y growing southwards.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Side::Top => (0, -1),
            Side::Right => (1, 0),
            Side::Bottom => (0, 1),
            Side::Left => (-1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// Offset a board coordinate pair, `None` when it would leave the board.
pub fn offset_board(x: usize, y: usize, dx: isize, dy: isize) -> Option<(usize, usize)> {
    let nx = x.checked_add_signed(dx)?;
    let ny = y.checked_add_signed(dy)?;
    if nx >= BOARD_SPAN || ny >= BOARD_SPAN {
        return None;
    }
    Some((nx, ny))
}

/// One terrain cell anywhere on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardPosition {
    pub x_board: usize,
    pub y_board: usize,
    pub x_tile: usize,
    pub y_tile: usize,
}

impl BoardPosition {
    pub fn new(x_board: usize, y_board: usize, x_tile: usize, y_tile: usize) -> Self {
        Self {
            x_board,
            y_board,
            x_tile,
            y_tile,
        }
    }

    pub fn tile(self) -> (usize, usize) {
        (self.x_board, self.y_board)
    }
}

/// Turn phases. `PlaceMeeple` hands straight back to `DrawTile` when a turn ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    StartGame,
    DrawTile,
    PlaceTile,
    PlaceMeeple,
    EndTurn,
    EndGame,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameState::StartGame => "start_game",
            GameState::DrawTile => "draw_tile",
            GameState::PlaceTile => "place_tile",
            GameState::PlaceMeeple => "place_meeple",
            GameState::EndTurn => "end_turn",
            GameState::EndGame => "end_game",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_from_char_is_case_insensitive() {
        assert_eq!(TerrainKind::from_char('K'), TerrainKind::Cloister);
        assert_eq!(TerrainKind::from_char('c'), TerrainKind::City);
        assert_eq!(TerrainKind::from_char('R'), TerrainKind::Road);
        assert_eq!(TerrainKind::from_char('i'), TerrainKind::River);
        assert_eq!(TerrainKind::from_char('F'), TerrainKind::Field);
        assert_eq!(TerrainKind::from_char('x'), TerrainKind::Empty);
        assert_eq!(TerrainKind::from_char('?'), TerrainKind::Empty);
    }

    #[test]
    fn test_side_opposite() {
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
            let (dx, dy) = side.offset();
            let (ox, oy) = side.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn test_offset_board_clamps_to_edges() {
        assert_eq!(offset_board(0, 0, -1, 0), None);
        assert_eq!(offset_board(BOARD_SPAN - 1, 5, 1, 0), None);
        assert_eq!(offset_board(3, 3, 0, -1), Some((3, 2)));
    }

    #[test]
    fn test_board_position_equality() {
        let a = BoardPosition::new(72, 72, 3, 0);
        assert_eq!(a, BoardPosition::new(72, 72, 3, 0));
        assert_ne!(a, BoardPosition::new(72, 72, 0, 3));
        assert_eq!(a.tile(), (72, 72));
    }
}
