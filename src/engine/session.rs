//! Turn controller: the per-game state machine every client action passes through.
//!
//! A rejected action never touches the game. Only the verb expected in the
//! current state, claimed by the current player, reaches [`Game`].

use crate::engine::models::{Action, GameResult, HandTile, Reply, TurnSummary};
use crate::games::carcassonne::board::{board_coords, tile_coords, MeepleError, PlacementError};
use crate::games::carcassonne::draw_pile::PileEmpty;
use crate::games::carcassonne::game::Game;
use crate::games::carcassonne::types::{BoardPosition, GameState, MEEPLES_PER_PLAYER};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("no game in progress, send init first")]
    NotStarted,
    #[error("game already started")]
    AlreadyStarted,
    #[error("{action} is not accepted while in state {state}")]
    WrongState {
        action: &'static str,
        state: GameState,
    },
    #[error("player {claimed} acted out of turn, current player is {current}")]
    NotYourTurn { claimed: usize, current: usize },
    #[error("player count must be {min}..={max}, got {0}", min = MIN_PLAYERS, max = MAX_PLAYERS)]
    InvalidPlayerCount(usize),
    #[error("no player {0} in this game")]
    UnknownPlayer(usize),
    #[error("game is over")]
    GameOver,
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Meeple(#[from] MeepleError),
    #[error(transparent)]
    PileEmpty(#[from] PileEmpty),
}

impl TurnError {
    pub fn code(&self) -> u8 {
        match self {
            TurnError::NotStarted => 20,
            TurnError::AlreadyStarted => 21,
            TurnError::WrongState { .. } => 22,
            TurnError::NotYourTurn { .. } => 23,
            TurnError::InvalidPlayerCount(_) => 24,
            TurnError::UnknownPlayer(_) => 25,
            TurnError::GameOver => 26,
            TurnError::Placement(e) => e.code(),
            TurnError::Meeple(e) => e.code(),
            TurnError::PileEmpty(_) => 30,
        }
    }
}

/// Owns one game and serializes every action against it.
#[derive(Debug, Clone, Default)]
pub struct TurnController {
    game: Option<Game>,
    seed: Option<u64>,
}

impl TurnController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Games started by this controller shuffle their pile from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            game: None,
            seed: Some(seed),
        }
    }

    pub fn state(&self) -> GameState {
        self.game
            .as_ref()
            .map_or(GameState::StartGame, |g| g.state())
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.state() == GameState::EndGame
    }

    /// Apply `action`, turning any rule violation into [`Reply::Rejected`].
    pub fn handle(&mut self, action: Action) -> Reply {
        let verb = action.verb();
        let player = action.player();
        match self.apply(action) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(action = verb, ?player, state = %self.state(), code = e.code(), error = %e, "action rejected");
                Reply::Rejected {
                    code: e.code(),
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn apply(&mut self, action: Action) -> Result<Reply, TurnError> {
        match action {
            Action::Init { num_players } => self.init(num_players),
            Action::Exit => Ok(Reply::Bye),
            Action::QueryGameInfo => {
                let game = self.game.as_ref().ok_or(TurnError::NotStarted)?;
                Ok(Reply::GameInfo {
                    state: game.state(),
                    current_player: game.current_player(),
                    num_players: game.num_players(),
                    tiles_remaining: game.tiles_remaining(),
                    pile_empty: game.is_pile_empty(),
                    scores: game.scores(),
                })
            }
            Action::QueryPlayerInfo { player } => {
                let game = self.game.as_ref().ok_or(TurnError::NotStarted)?;
                let info = game.player(player).ok_or(TurnError::UnknownPlayer(player))?;
                let meeples_placed = game.num_meeples_placed(player);
                Ok(Reply::PlayerInfo {
                    player,
                    score: info.score(),
                    meeples_placed,
                    meeples_available: MEEPLES_PER_PLAYER - meeples_placed,
                    breakdown: info.breakdown(),
                    hand: info.hand().map(|t| HandTile {
                        identifier: t.identifier().to_string(),
                        orientation: t.orientation(),
                    }),
                })
            }
            Action::DrawTile { player } => {
                let game = expect_turn(&mut self.game, GameState::DrawTile, player, "draw_tile")?;
                match game.draw_tile(player) {
                    Ok(drawn) => Ok(Reply::TileDrawn {
                        identifier: drawn.identifier,
                        orientation: drawn.orientation,
                        tiles_remaining: drawn.tiles_remaining,
                        discarded: drawn.discarded,
                    }),
                    Err(PileEmpty) => {
                        let discarded = game.tiles_discarded();
                        tracing::info!(discarded, "draw pile exhausted by discards");
                        let removed_meeples = game.finish();
                        Ok(Reply::GameOver {
                            removed_meeples,
                            discarded,
                            result: game_result(game),
                        })
                    }
                }
            }
            Action::RotateTile { player, direction } => {
                let game =
                    expect_turn(&mut self.game, GameState::PlaceTile, player, "rotate_tile")?;
                let tile = game.rotate_tile(player, direction)?;
                Ok(Reply::TileRotated {
                    orientation: tile.orientation(),
                })
            }
            Action::PlaceTile { player, x, y } => {
                let game = expect_turn(&mut self.game, GameState::PlaceTile, player, "place_tile")?;
                let (x, y) = board_coords(x, y)?;
                game.place_tile(player, x, y)?;
                Ok(Reply::TilePlaced { x, y })
            }
            Action::PlaceMeeple {
                player,
                board_x,
                board_y,
                tile_x,
                tile_y,
            } => {
                let game =
                    expect_turn(&mut self.game, GameState::PlaceMeeple, player, "place_meeple")?;
                let (bx, by) =
                    board_coords(board_x, board_y).map_err(|_| MeepleError::NotLastPlacedTile)?;
                let (tx, ty) = tile_coords(tile_x, tile_y)?;
                let meeple = game.place_meeple(player, bx, by, tx, ty)?;
                Ok(Reply::MeeplePlaced {
                    meeple,
                    position: BoardPosition::new(bx, by, tx, ty),
                    turn: close_turn(game),
                })
            }
            Action::EndTurn { player } => {
                let game = expect_turn(&mut self.game, GameState::PlaceMeeple, player, "end_turn")?;
                Ok(Reply::TurnEnded {
                    turn: close_turn(game),
                })
            }
        }
    }

    fn init(&mut self, num_players: usize) -> Result<Reply, TurnError> {
        if self.game.is_some() {
            return Err(TurnError::AlreadyStarted);
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(TurnError::InvalidPlayerCount(num_players));
        }
        let game = match self.seed {
            Some(seed) => Game::with_seed(num_players, seed),
            None => Game::new(num_players),
        };
        tracing::info!(num_players, seed = ?self.seed, "game started");
        let reply = Reply::Started {
            num_players,
            current_player: game.current_player(),
            state: game.state(),
        };
        self.game = Some(game);
        Ok(reply)
    }
}

#[cfg(test)]
impl TurnController {
    pub(crate) fn with_game(game: Game) -> Self {
        Self {
            game: Some(game),
            seed: None,
        }
    }
}

/// The live game, provided it sits in `state` and `player` holds the turn.
fn expect_turn<'a>(
    game: &'a mut Option<Game>,
    state: GameState,
    player: usize,
    action: &'static str,
) -> Result<&'a mut Game, TurnError> {
    let game = game.as_mut().ok_or(TurnError::NotStarted)?;
    if game.state() == GameState::EndGame {
        return Err(TurnError::GameOver);
    }
    if game.state() != state {
        return Err(TurnError::WrongState {
            action,
            state: game.state(),
        });
    }
    if player != game.current_player() {
        return Err(TurnError::NotYourTurn {
            claimed: player,
            current: game.current_player(),
        });
    }
    Ok(game)
}

fn close_turn(game: &mut Game) -> TurnSummary {
    let outcome = game.end_turn();
    TurnSummary {
        removed_meeples: outcome.removed_meeples,
        next_player: game.current_player(),
        state: game.state(),
        scores: game.scores(),
        result: outcome.game_over.then(|| game_result(game)),
    }
}

fn game_result(game: &Game) -> GameResult {
    GameResult {
        final_scores: game.scores(),
        winners: game.winners(),
    }
}
