//! Scoring passes for cloisters, roads, cities and fields.
//!
//! Every pass starts from the meeples currently on the board, surveys the
//! feature under each one, awards points to the majority owner(s) and
//! returns the meeples of every scored feature to their pools.

use std::collections::{HashMap, HashSet};

use super::board::Board;
use super::features::{survey_feature, FeatureSurvey};
use super::player::{FeatureCategory, MeepleId, Player};
use super::types::*;

/// Points per tile for a road, in play or at game end.
pub const ROAD_POINTS_PER_TILE: u32 = 1;
/// Points per tile for a city closed during play.
pub const CITY_POINTS_PER_TILE: u32 = 2;
/// Points per tile for a city still open at game end.
pub const OPEN_CITY_POINTS_PER_TILE: u32 = 1;
/// Points per completed city bordering a field.
pub const FIELD_POINTS_PER_CITY: u32 = 3;

/// Seats holding the most meeples among `meeples`. Ties all win.
pub fn majority_owners(meeples: &[MeepleId]) -> Vec<usize> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for meeple in meeples {
        *counts.entry(meeple.player).or_insert(0) += 1;
    }
    let Some(&max) = counts.values().max() else {
        return Vec::new();
    };
    let mut owners: Vec<usize> = counts
        .into_iter()
        .filter(|&(_, count)| count == max)
        .map(|(player, _)| player)
        .collect();
    owners.sort_unstable();
    owners
}

/// Placed meeples standing on cells of `kind`, in meeple order.
fn meeples_on(board: &Board, kind: TerrainKind) -> Vec<(MeepleId, BoardPosition)> {
    board
        .meeples()
        .iter()
        .filter(|&(_, cell)| board.terrain_at(cell) == Some(kind))
        .collect()
}

fn award(
    players: &mut [Player],
    survey: &FeatureSurvey,
    category: FeatureCategory,
    points: u32,
) {
    let owners = majority_owners(&survey.meeples);
    for &owner in &owners {
        players[owner].add_points(category, points);
    }
    tracing::debug!(
        ?category,
        points,
        ?owners,
        tiles = survey.tile_count(),
        complete = survey.complete,
        "feature scored"
    );
}

fn release_all(board: &mut Board, meeples: &[MeepleId], removed: &mut Vec<BoardPosition>) {
    for &meeple in meeples {
        if let Some(cell) = board.meeples_mut().release(meeple) {
            removed.push(cell);
        }
    }
}

/// Score every claimed feature of `kind` whose tiles are worth `per_tile`.
/// Open features only score when the game has ended.
fn score_linear(
    board: &mut Board,
    players: &mut [Player],
    kind: TerrainKind,
    category: FeatureCategory,
    per_tile: u32,
    game_ended: bool,
) -> Vec<BoardPosition> {
    let mut removed = Vec::new();
    let mut seen: HashSet<BoardPosition> = HashSet::new();

    for (_, cell) in meeples_on(board, kind) {
        if seen.contains(&cell) {
            continue;
        }
        let survey = survey_feature(board, cell);
        seen.extend(survey.cells.iter().copied());

        if !(game_ended || survey.complete) {
            continue;
        }
        let points = survey.tile_count() as u32 * per_tile;
        award(players, &survey, category, points);
        release_all(board, &survey.meeples, &mut removed);
    }

    removed
}

pub fn score_roads(
    board: &mut Board,
    players: &mut [Player],
    game_ended: bool,
) -> Vec<BoardPosition> {
    score_linear(
        board,
        players,
        TerrainKind::Road,
        FeatureCategory::Road,
        ROAD_POINTS_PER_TILE,
        game_ended,
    )
}

pub fn score_cities(
    board: &mut Board,
    players: &mut [Player],
    game_ended: bool,
) -> Vec<BoardPosition> {
    let per_tile = if game_ended {
        OPEN_CITY_POINTS_PER_TILE
    } else {
        CITY_POINTS_PER_TILE
    };
    score_linear(
        board,
        players,
        TerrainKind::City,
        FeatureCategory::City,
        per_tile,
        game_ended,
    )
}

/// A cloister is complete once all eight surrounding board positions hold a
/// tile; it is worth one point for itself plus one per surrounding tile.
pub fn score_cloisters(
    board: &mut Board,
    players: &mut [Player],
    game_ended: bool,
) -> Vec<BoardPosition> {
    let mut removed = Vec::new();

    for (meeple, cell) in meeples_on(board, TerrainKind::Cloister) {
        let (x, y) = cell.tile();
        let neighbors = board.surrounding_tile_count(x, y);
        if neighbors < 8 && !game_ended {
            continue;
        }
        let points = neighbors as u32 + 1;
        players[meeple.player].add_points(FeatureCategory::Cloister, points);
        tracing::debug!(owner = meeple.player, points, x, y, "cloister scored");
        release_all(board, &[meeple], &mut removed);
    }

    removed
}

/// Map every cell of every completed city to an id for that city.
pub fn completed_cities(board: &Board) -> HashMap<BoardPosition, usize> {
    let mut index: HashMap<BoardPosition, usize> = HashMap::new();
    let mut seen: HashSet<BoardPosition> = HashSet::new();
    let mut next_id = 0;

    for &(x_board, y_board) in board.placed_positions() {
        for y_tile in 0..TILE_SPAN {
            for x_tile in 0..TILE_SPAN {
                let cell = BoardPosition::new(x_board, y_board, x_tile, y_tile);
                if seen.contains(&cell) || board.terrain_at(cell) != Some(TerrainKind::City) {
                    continue;
                }
                let survey = survey_feature(board, cell);
                seen.extend(survey.cells.iter().copied());
                if !survey.complete {
                    continue;
                }
                for city_cell in survey.cells {
                    index.insert(city_cell, next_id);
                }
                next_id += 1;
            }
        }
    }

    index
}

/// End-of-game field scoring: three points per distinct completed city
/// bordering the field.
pub fn score_fields(board: &mut Board, players: &mut [Player]) -> Vec<BoardPosition> {
    let cities = completed_cities(board);
    let mut removed = Vec::new();
    let mut seen: HashSet<BoardPosition> = HashSet::new();

    for (_, cell) in meeples_on(board, TerrainKind::Field) {
        if seen.contains(&cell) {
            continue;
        }
        let survey = survey_feature(board, cell);
        seen.extend(survey.cells.iter().copied());

        let bordering: HashSet<usize> = survey
            .border
            .iter()
            .filter_map(|pos| cities.get(pos).copied())
            .collect();
        let points = bordering.len() as u32 * FIELD_POINTS_PER_CITY;
        award(players, &survey, FeatureCategory::Field, points);
        release_all(board, &survey.meeples, &mut removed);
    }

    removed
}
