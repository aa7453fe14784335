//! Random-legal-move playouts driven through the turn controller.
//! Used by self-play, the benchmarks and the end-to-end tests.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::engine::models::{Action, Reply};
use crate::engine::session::TurnController;
use crate::games::carcassonne::types::{GameState, Rotation, TILE_SPAN};

/// Chance that a simulated player tries to put down a meeple after placing a tile.
const MEEPLE_ATTEMPT_PROBABILITY: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub scores: Vec<u32>,
    pub winners: Vec<usize>,
    pub turns: usize,
    pub tiles_placed: usize,
    pub tiles_discarded: usize,
    pub meeples_placed: usize,
    pub rejections: usize,
}

/// Play one game to the end with uniformly random legal choices.
pub fn play_random_game(num_players: usize, seed: u64) -> GameSummary {
    let mut controller = TurnController::with_seed(seed);
    let mut rng = StdRng::seed_from_u64(seed.rotate_left(17));
    let mut summary = GameSummary {
        seed,
        scores: Vec::new(),
        winners: Vec::new(),
        turns: 0,
        tiles_placed: 0,
        tiles_discarded: 0,
        meeples_placed: 0,
        rejections: 0,
    };

    let reply = controller.handle(Action::Init { num_players });
    assert!(!reply.is_rejected(), "simulator started with {num_players} players: {reply:?}");

    while !controller.is_finished() {
        let Some(game) = controller.game() else {
            break;
        };
        let player = game.current_player();

        let reply = match game.state() {
            GameState::DrawTile => controller.handle(Action::DrawTile { player }),
            GameState::PlaceTile => {
                let placements = game.valid_placements(player);
                let current = game
                    .player(player)
                    .and_then(|p| p.hand())
                    .map_or(0, |t| t.orientation());
                let Some(&(x, y, orientation)) = placements.choose(&mut rng) else {
                    tracing::warn!(seed, player, "hand tile has no legal placement, abandoning playout");
                    break;
                };
                for _ in 0..(orientation + 4 - current) % 4 {
                    controller.handle(Action::RotateTile {
                        player,
                        direction: Rotation::Clockwise,
                    });
                }
                controller.handle(Action::PlaceTile {
                    player,
                    x: x as i64,
                    y: y as i64,
                })
            }
            GameState::PlaceMeeple => {
                let attempt = rng.gen_bool(MEEPLE_ATTEMPT_PROBABILITY);
                let target = game
                    .player(player)
                    .and_then(|p| p.last_placed())
                    .filter(|_| attempt);
                match target {
                    Some((bx, by)) => {
                        let tile_x = rng.gen_range(0..TILE_SPAN) as i64;
                        let tile_y = rng.gen_range(0..TILE_SPAN) as i64;
                        let reply = controller.handle(Action::PlaceMeeple {
                            player,
                            board_x: bx as i64,
                            board_y: by as i64,
                            tile_x,
                            tile_y,
                        });
                        if reply.is_rejected() {
                            // Unclaimable cell or taken feature: pass instead.
                            summary.rejections += 1;
                            controller.handle(Action::EndTurn { player })
                        } else {
                            reply
                        }
                    }
                    None => controller.handle(Action::EndTurn { player }),
                }
            }
            GameState::StartGame | GameState::EndTurn | GameState::EndGame => break,
        };

        match &reply {
            Reply::TilePlaced { .. } => summary.tiles_placed += 1,
            Reply::MeeplePlaced { .. } => {
                summary.meeples_placed += 1;
                summary.turns += 1;
            }
            Reply::TurnEnded { .. } => summary.turns += 1,
            Reply::Rejected { .. } => summary.rejections += 1,
            _ => {}
        }
    }

    if let Some(game) = controller.game() {
        summary.scores = game.scores();
        summary.winners = game.winners();
        summary.tiles_discarded = game.tiles_discarded();
    }
    tracing::debug!(seed, scores = ?summary.scores, turns = summary.turns, "playout finished");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playout_uses_every_tile() {
        let summary = play_random_game(2, 11);
        assert_eq!(summary.tiles_placed + summary.tiles_discarded, 72);
        assert_eq!(summary.turns, summary.tiles_placed);
        assert_eq!(summary.scores.len(), 2);
        assert!(!summary.winners.is_empty());
    }

    #[test]
    fn test_playout_is_deterministic_per_seed() {
        assert_eq!(play_random_game(3, 99), play_random_game(3, 99));
    }
}
