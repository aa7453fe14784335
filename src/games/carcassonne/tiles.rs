//! Tile terrain grids and the base-game catalog (17 patterns, 72 tiles).

use once_cell::sync::Lazy;
use serde::Serialize;

use super::types::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileError {
    #[error("tile pattern '{identifier}' must be 7x7, got {rows} rows (widest {widest})")]
    InvalidShape {
        identifier: String,
        rows: usize,
        widest: usize,
    },
}

pub type Grid = [[TerrainKind; TILE_SPAN]; TILE_SPAN];

/// One physical tile. Cells are indexed `cells[y][x]`, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tile {
    identifier: String,
    orientation: u8,
    cells: Grid,
}

impl Tile {
    /// Build a tile from `TILE_SPAN` rows of `TILE_SPAN` pattern characters.
    pub fn from_pattern(rows: &[&str], identifier: &str) -> Result<Self, TileError> {
        let widest = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let well_formed =
            rows.len() == TILE_SPAN && rows.iter().all(|r| r.chars().count() == TILE_SPAN);
        if !well_formed {
            return Err(TileError::InvalidShape {
                identifier: identifier.to_string(),
                rows: rows.len(),
                widest,
            });
        }

        let mut cells = [[TerrainKind::Empty; TILE_SPAN]; TILE_SPAN];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                cells[y][x] = TerrainKind::from_char(ch);
            }
        }
        for (x, y) in [(0, 0), (TILE_SPAN - 1, 0), (0, TILE_SPAN - 1), (TILE_SPAN - 1, TILE_SPAN - 1)] {
            cells[y][x] = TerrainKind::Empty;
        }

        Ok(Self {
            identifier: identifier.to_string(),
            orientation: 0,
            cells,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Quarter turns clockwise from the canonical pattern, in `0..4`.
    pub fn orientation(&self) -> u8 {
        self.orientation
    }

    pub fn cells(&self) -> &Grid {
        &self.cells
    }

    pub fn cell_at(&self, x: usize, y: usize) -> TerrainKind {
        self.cells[y][x]
    }

    pub fn rotate_clockwise(&mut self) {
        let old = self.cells;
        for y in 0..TILE_SPAN {
            for x in 0..TILE_SPAN {
                self.cells[y][x] = old[TILE_SPAN - 1 - x][y];
            }
        }
        self.orientation = (self.orientation + 1) % 4;
    }

    pub fn rotate_counter_clockwise(&mut self) {
        let old = self.cells;
        for y in 0..TILE_SPAN {
            for x in 0..TILE_SPAN {
                self.cells[y][x] = old[x][TILE_SPAN - 1 - y];
            }
        }
        self.orientation = (self.orientation + 3) % 4;
    }

    pub fn rotate(&mut self, rotation: Rotation) {
        match rotation {
            Rotation::Clockwise => self.rotate_clockwise(),
            Rotation::CounterClockwise => self.rotate_counter_clockwise(),
        }
    }

    /// Rotate clockwise until `orientation` is reached.
    pub fn set_orientation(&mut self, orientation: u8) {
        let target = orientation % 4;
        while self.orientation != target {
            self.rotate_clockwise();
        }
    }

    /// Terrain along one side. Top/Bottom read left to right, Left/Right top to bottom.
    pub fn edge(&self, side: Side) -> [TerrainKind; TILE_SPAN] {
        let last = TILE_SPAN - 1;
        std::array::from_fn(|i| match side {
            Side::Top => self.cells[0][i],
            Side::Bottom => self.cells[last][i],
            Side::Left => self.cells[i][0],
            Side::Right => self.cells[i][last],
        })
    }
}

/// A tile pattern and how many copies the base game ships.
pub struct TilePattern {
    pub identifier: &'static str,
    pub rows: [&'static str; TILE_SPAN],
    pub count: u32,
}

pub const STARTING_TILE_ID: &str = "city_road_straight";

pub static TILE_PATTERNS: [TilePattern; 17] = [
    TilePattern {
        identifier: "cloister_road",
        rows: ["xfffffx", "fffffff", "ffkkkff", "ffkkkff", "ffkkkff", "fffrfff", "xffrffx"],
        count: 2,
    },
    TilePattern {
        identifier: "cloister",
        rows: ["xfffffx", "fffffff", "ffkkkff", "ffkkkff", "ffkkkff", "fffffff", "xfffffx"],
        count: 4,
    },
    TilePattern {
        identifier: "city_full",
        rows: ["xcccccx", "ccccccc", "ccccccc", "ccccccc", "ccccccc", "ccccccc", "xcccccx"],
        count: 1,
    },
    // The starting tile; one copy is held back for the opening draw.
    TilePattern {
        identifier: STARTING_TILE_ID,
        rows: ["xcccccx", "ffcccff", "fffffff", "rrrrrrr", "fffffff", "fffffff", "xfffffx"],
        count: 4,
    },
    TilePattern {
        identifier: "city_cap",
        rows: ["xcccccx", "ffcccff", "fffffff", "fffffff", "fffffff", "fffffff", "xfffffx"],
        count: 5,
    },
    TilePattern {
        identifier: "city_bridge",
        rows: ["xfffffx", "ccfffcc", "ccccccc", "ccccccc", "ccccccc", "ccfffcc", "xfffffx"],
        count: 3,
    },
    TilePattern {
        identifier: "city_opposite_caps",
        rows: ["xcccccx", "ffcccff", "fffffff", "fffffff", "fffffff", "ffcccff", "xcccccx"],
        count: 3,
    },
    TilePattern {
        identifier: "city_corner_caps",
        rows: ["xcccccx", "cfcccff", "ccfffff", "ccfffff", "ccfffff", "cffffff", "xfffffx"],
        count: 2,
    },
    TilePattern {
        identifier: "city_road_curve",
        rows: ["xcccccx", "ffcccff", "fffffff", "fffrrrr", "fffrfff", "fffrfff", "xffrffx"],
        count: 6,
    },
    TilePattern {
        identifier: "city_road_junction",
        rows: ["xcccccx", "ffcccff", "fffffff", "rrrxrrr", "fffrfff", "fffrfff", "xffrffx"],
        count: 3,
    },
    TilePattern {
        identifier: "city_diagonal",
        rows: ["xcccccx", "cccccff", "ccccfff", "cccffff", "ccfffff", "cffffff", "xfffffx"],
        count: 5,
    },
    TilePattern {
        identifier: "city_diagonal_road",
        rows: ["xcccccx", "ccccfff", "cccffff", "ccffrrr", "cffrrff", "cffrfff", "xffrffx"],
        count: 5,
    },
    TilePattern {
        identifier: "city_three",
        rows: ["xcccccx", "ccccccc", "ccccccc", "ccccccc", "ccfffcc", "cfffffc", "xfffffx"],
        count: 4,
    },
    TilePattern {
        identifier: "city_three_road",
        rows: ["xcccccx", "ccccccc", "ccccccc", "ccccccc", "ccfcfcc", "cffrffc", "xffrffx"],
        count: 3,
    },
    TilePattern {
        identifier: "road_straight",
        rows: ["xffrffx", "fffrfff", "fffrfff", "fffrfff", "fffrfff", "fffrfff", "xffrffx"],
        count: 8,
    },
    TilePattern {
        identifier: "road_curve",
        rows: ["xfffffx", "fffffff", "fffffff", "rrrrfff", "fffrfff", "fffrfff", "xffrffx"],
        count: 9,
    },
    TilePattern {
        identifier: "road_junction",
        rows: ["xffrffx", "fffrfff", "fffrfff", "rrrxfff", "fffrfff", "fffrfff", "xffrffx"],
        count: 5,
    },
];

/// Canonical tile for every pattern, built once.
pub static TILE_CATALOG: Lazy<Vec<Tile>> = Lazy::new(|| {
    TILE_PATTERNS
        .iter()
        .map(|p| {
            Tile::from_pattern(&p.rows, p.identifier)
                .expect("built-in tile patterns are well formed")
        })
        .collect()
});

/// Fresh canonical tile for a catalog identifier.
pub fn tile_by_id(identifier: &str) -> Option<Tile> {
    TILE_CATALOG
        .iter()
        .find(|t| t.identifier() == identifier)
        .cloned()
}

/// Total number of tiles in the base game, starting tile included.
pub fn get_tile_total() -> u32 {
    TILE_PATTERNS.iter().map(|p| p.count).sum()
}

/// Every tile except the held-back starting tile, in catalog order.
pub fn build_tile_bag() -> Vec<Tile> {
    let mut bag = Vec::with_capacity(get_tile_total() as usize - 1);
    for (pattern, tile) in TILE_PATTERNS.iter().zip(TILE_CATALOG.iter()) {
        let count = if pattern.identifier == STARTING_TILE_ID {
            pattern.count - 1
        } else {
            pattern.count
        };
        for _ in 0..count {
            bag.push(tile.clone());
        }
    }
    bag
}

#[cfg(test)]
mod tests {
    use super::*;
    use TerrainKind::{City as C, Empty as X, Field as F, Road as R};

    const ASYMMETRIC: [&str; TILE_SPAN] = [
        "xcrffkx", "ffffffr", "cffffff", "fffffff", "fffffff", "ffffffk", "xfffrcx",
    ];

    fn asymmetric() -> Tile {
        Tile::from_pattern(&ASYMMETRIC, "asymmetric").unwrap()
    }

    #[test]
    fn test_catalog_counts() {
        assert_eq!(TILE_CATALOG.len(), 17);
        assert_eq!(get_tile_total(), 72);
        assert_eq!(build_tile_bag().len(), 71);
    }

    #[test]
    fn test_catalog_corners_are_empty() {
        for tile in TILE_CATALOG.iter() {
            for side in Side::ALL {
                let edge = tile.edge(side);
                assert_eq!(edge[0], X, "{} {:?}", tile.identifier(), side);
                assert_eq!(edge[TILE_SPAN - 1], X, "{} {:?}", tile.identifier(), side);
            }
        }
    }

    #[test]
    fn test_catalog_edges_use_standard_profiles() {
        let field = [X, F, F, F, F, F, X];
        let road = [X, F, F, R, F, F, X];
        let city = [X, C, C, C, C, C, X];
        for tile in TILE_CATALOG.iter() {
            for side in Side::ALL {
                let edge = tile.edge(side);
                assert!(
                    edge == field || edge == road || edge == city,
                    "{} has a non-standard {:?} edge: {:?}",
                    tile.identifier(),
                    side,
                    edge
                );
            }
        }
    }

    #[test]
    fn test_from_pattern_rejects_bad_shape() {
        let short = ["xfffffx"; 6];
        assert!(matches!(
            Tile::from_pattern(&short, "short"),
            Err(TileError::InvalidShape { rows: 6, .. })
        ));
        let mut ragged = ASYMMETRIC;
        ragged[3] = "ffff";
        assert!(Tile::from_pattern(&ragged, "ragged").is_err());
    }

    #[test]
    fn test_from_pattern_maps_characters() {
        let tile = Tile::from_pattern(
            &["XCCCCCX", "kKiIrRf", "FzzzzzF", "fffffff", "fffffff", "fffffff", "xfffffx"],
            "mixed",
        )
        .unwrap();
        assert_eq!(tile.cell_at(1, 0), C);
        assert_eq!(tile.cell_at(0, 1), TerrainKind::Cloister);
        assert_eq!(tile.cell_at(1, 1), TerrainKind::Cloister);
        assert_eq!(tile.cell_at(2, 1), TerrainKind::River);
        assert_eq!(tile.cell_at(4, 1), R);
        assert_eq!(tile.cell_at(6, 1), F);
        assert_eq!(tile.cell_at(2, 2), X);
    }

    #[test]
    fn test_four_clockwise_rotations_are_identity() {
        let original = asymmetric();
        for start in 0..4 {
            let mut base = original.clone();
            base.set_orientation(start);
            let mut tile = base.clone();
            for _ in 0..4 {
                tile.rotate_clockwise();
            }
            assert_eq!(tile, base);
        }
    }

    #[test]
    fn test_clockwise_then_counter_clockwise_is_noop() {
        let original = asymmetric();
        let mut tile = original.clone();
        tile.rotate_clockwise();
        assert_ne!(tile.cells(), original.cells());
        assert_eq!(tile.orientation(), 1);
        tile.rotate_counter_clockwise();
        assert_eq!(tile, original);
    }

    #[test]
    fn test_counter_clockwise_from_zero_wraps_to_three() {
        let mut tile = asymmetric();
        tile.rotate_counter_clockwise();
        assert_eq!(tile.orientation(), 3);
    }

    #[test]
    fn test_half_turn_moves_top_edge_to_bottom() {
        let original = asymmetric();
        let mut turned = original.clone();
        turned.rotate_clockwise();
        turned.rotate_clockwise();
        let mut top = original.edge(Side::Top);
        top.reverse();
        assert_eq!(turned.edge(Side::Bottom), top);
        assert_ne!(turned.edge(Side::Bottom), original.edge(Side::Top));
    }

    #[test]
    fn test_clockwise_moves_left_edge_to_top() {
        let original = asymmetric();
        let mut turned = original.clone();
        turned.rotate_clockwise();
        let mut left = original.edge(Side::Left);
        left.reverse();
        assert_eq!(turned.edge(Side::Top), left);
        assert_eq!(turned.edge(Side::Right), original.edge(Side::Top));
    }

    #[test]
    fn test_side_edges_are_column_reads() {
        let tile = asymmetric();
        assert_eq!(tile.edge(Side::Right)[1], R);
        assert_eq!(tile.edge(Side::Right)[5], TerrainKind::Cloister);
        assert_eq!(tile.edge(Side::Left)[2], C);
        assert_eq!(tile.edge(Side::Bottom)[4], R);
    }

    #[test]
    fn test_tile_by_id() {
        let start = tile_by_id(STARTING_TILE_ID).unwrap();
        assert_eq!(start.edge(Side::Top), [X, C, C, C, C, C, X]);
        assert_eq!(start.edge(Side::Left), [X, F, F, R, F, F, X]);
        assert!(tile_by_id("nope").is_none());
    }
}
