//! Feature discovery: cell stepping across tile boundaries and flood fill.

use std::collections::{HashSet, VecDeque};

use super::board::Board;
use super::player::MeepleId;
use super::types::*;

/// Outcome of stepping one cell in some direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Landed on a cell of a placed tile, possibly a neighbouring one.
    Cell(BoardPosition),
    /// Walked off a tile edge into board space with no tile.
    Open,
}

/// Step from `pos` towards `side`. Leaving a tile through an edge enters the
/// facing edge cell of the adjacent board tile.
pub fn step(board: &Board, pos: BoardPosition, side: Side) -> Step {
    let (dx, dy) = side.offset();
    let tx = pos.x_tile as isize + dx;
    let ty = pos.y_tile as isize + dy;
    let span = TILE_SPAN as isize;

    if (0..span).contains(&tx) && (0..span).contains(&ty) {
        return Step::Cell(BoardPosition::new(
            pos.x_board,
            pos.y_board,
            tx as usize,
            ty as usize,
        ));
    }

    let Some((bx, by)) = offset_board(pos.x_board, pos.y_board, dx, dy) else {
        return Step::Open;
    };
    if !board.is_occupied(bx, by) {
        return Step::Open;
    }
    Step::Cell(BoardPosition::new(
        bx,
        by,
        tx.rem_euclid(span) as usize,
        ty.rem_euclid(span) as usize,
    ))
}

/// Everything a flood fill learned about one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSurvey {
    pub kind: TerrainKind,
    pub cells: HashSet<BoardPosition>,
    pub tiles: HashSet<(usize, usize)>,
    pub meeples: Vec<MeepleId>,
    /// Neighbouring cells of another claimable kind.
    pub border: HashSet<BoardPosition>,
    /// No step ever led into empty board space.
    pub complete: bool,
}

impl FeatureSurvey {
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

/// Flood-fill the feature containing `start`.
///
/// Panics if `start` is not on a placed tile.
pub fn survey_feature(board: &Board, start: BoardPosition) -> FeatureSurvey {
    explore(board, start, false)
}

/// Whether no meeple stands anywhere on the feature containing `start`.
/// Stops at the first meeple found.
pub fn feature_is_unclaimed(board: &Board, start: BoardPosition) -> bool {
    explore(board, start, true).meeples.is_empty()
}

fn explore(board: &Board, start: BoardPosition, stop_at_meeple: bool) -> FeatureSurvey {
    let kind = board
        .terrain_at(start)
        .expect("feature search must start on a placed tile");

    let mut survey = FeatureSurvey {
        kind,
        cells: HashSet::new(),
        tiles: HashSet::new(),
        meeples: Vec::new(),
        border: HashSet::new(),
        complete: true,
    };

    let mut frontier = VecDeque::from([start]);
    survey.cells.insert(start);

    while let Some(pos) = frontier.pop_front() {
        survey.tiles.insert(pos.tile());
        if let Some(meeple) = board.meeples().meeple_at(&pos) {
            survey.meeples.push(meeple);
            if stop_at_meeple {
                return survey;
            }
        }

        for side in Side::ALL {
            let next = match step(board, pos, side) {
                Step::Cell(next) => next,
                Step::Open => {
                    survey.complete = false;
                    continue;
                }
            };
            let Some(next_kind) = board.terrain_at(next) else {
                continue;
            };
            if next_kind != kind {
                if next_kind.is_claimable() {
                    survey.border.insert(next);
                }
                continue;
            }
            if survey.cells.insert(next) {
                frontier.push_back(next);
            }
        }
    }

    survey.meeples.sort();
    survey
}
