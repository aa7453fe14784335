//! Protocol vocabulary: actions a client may send and the replies it gets back.

use serde::{Deserialize, Serialize};

use crate::games::carcassonne::player::{MeepleId, ScoreBreakdown};
use crate::games::carcassonne::types::{BoardPosition, GameState, Rotation};

/// Rejection code for wire lines that do not parse as an action.
pub const MALFORMED_REQUEST_CODE: u8 = 99;
/// Rejection code when the server cannot host another session.
pub const SESSION_LIMIT_CODE: u8 = 98;

/// Everything a client can ask of a game. Board and tile coordinates arrive
/// signed so that out-of-range values are rejected rather than mis-parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Init {
        num_players: usize,
    },
    DrawTile {
        player: usize,
    },
    RotateTile {
        player: usize,
        direction: Rotation,
    },
    PlaceTile {
        player: usize,
        x: i64,
        y: i64,
    },
    PlaceMeeple {
        player: usize,
        board_x: i64,
        board_y: i64,
        tile_x: i64,
        tile_y: i64,
    },
    EndTurn {
        player: usize,
    },
    QueryGameInfo,
    QueryPlayerInfo {
        player: usize,
    },
    Exit,
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Init { .. } => "init",
            Action::DrawTile { .. } => "draw_tile",
            Action::RotateTile { .. } => "rotate_tile",
            Action::PlaceTile { .. } => "place_tile",
            Action::PlaceMeeple { .. } => "place_meeple",
            Action::EndTurn { .. } => "end_turn",
            Action::QueryGameInfo => "query_game_info",
            Action::QueryPlayerInfo { .. } => "query_player_info",
            Action::Exit => "exit",
        }
    }

    /// The seat this action claims to act for, if it is a turn action.
    pub fn player(&self) -> Option<usize> {
        match self {
            Action::DrawTile { player }
            | Action::RotateTile { player, .. }
            | Action::PlaceTile { player, .. }
            | Action::PlaceMeeple { player, .. }
            | Action::EndTurn { player } => Some(*player),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub final_scores: Vec<u32>,
    pub winners: Vec<usize>,
}

/// What closing a turn did to the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub removed_meeples: Vec<BoardPosition>,
    pub next_player: usize,
    pub state: GameState,
    pub scores: Vec<u32>,
    #[serde(default)]
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandTile {
    pub identifier: String,
    pub orientation: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Started {
        num_players: usize,
        current_player: usize,
        state: GameState,
    },
    TileDrawn {
        identifier: String,
        orientation: u8,
        tiles_remaining: usize,
        discarded: usize,
    },
    TileRotated {
        orientation: u8,
    },
    TilePlaced {
        x: usize,
        y: usize,
    },
    MeeplePlaced {
        meeple: MeepleId,
        position: BoardPosition,
        turn: TurnSummary,
    },
    TurnEnded {
        turn: TurnSummary,
    },
    /// The pile ran dry during a draw.
    GameOver {
        removed_meeples: Vec<BoardPosition>,
        /// Tiles discarded over the whole game, the final run included.
        discarded: usize,
        result: GameResult,
    },
    GameInfo {
        state: GameState,
        current_player: usize,
        num_players: usize,
        tiles_remaining: usize,
        pile_empty: bool,
        scores: Vec<u32>,
    },
    PlayerInfo {
        player: usize,
        score: u32,
        meeples_placed: usize,
        meeples_available: usize,
        breakdown: ScoreBreakdown,
        hand: Option<HandTile>,
    },
    Rejected {
        code: u8,
        reason: String,
    },
    Bye,
}

impl Reply {
    /// 0 on success, the rejection code otherwise.
    pub fn code(&self) -> u8 {
        match self {
            Reply::Rejected { code, .. } => *code,
            _ => 0,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Reply::Rejected { .. })
    }

    pub fn malformed(reason: impl std::fmt::Display) -> Self {
        Reply::Rejected {
            code: MALFORMED_REQUEST_CODE,
            reason: format!("malformed request: {reason}"),
        }
    }
}

/// One request line on the wire: the session it targets plus the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub game_id: String,
    #[serde(flatten)]
    pub action: Action,
}

/// One response line on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub game_id: String,
    #[serde(flatten)]
    pub reply: Reply,
}
