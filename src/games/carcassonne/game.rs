//! One game: board, draw pile and players, driven turn by turn.

use super::board::{Board, MeepleError, PlacementError};
use super::draw_pile::{DrawPile, PileEmpty};
use super::player::{MeepleId, Player};
use super::scoring::{score_cities, score_cloisters, score_fields, score_roads};
use super::tiles::Tile;
use super::types::*;

/// What a successful draw handed the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnTile {
    pub identifier: String,
    pub orientation: u8,
    /// Tiles thrown away before this one because they fit nowhere.
    pub discarded: usize,
    pub tiles_remaining: usize,
}

/// Result of closing a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub removed_meeples: Vec<BoardPosition>,
    pub game_over: bool,
}

#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    pile: DrawPile,
    players: Vec<Player>,
    current_player: usize,
    state: GameState,
    discarded: usize,
}

impl Game {
    pub fn new(num_players: usize) -> Self {
        Self::with_pile(num_players, DrawPile::new())
    }

    pub fn with_seed(num_players: usize, seed: u64) -> Self {
        Self::with_pile(num_players, DrawPile::with_seed(seed))
    }

    pub fn with_pile(num_players: usize, pile: DrawPile) -> Self {
        assert!(num_players > 0, "a game needs at least one player");
        Self {
            board: Board::new(),
            pile,
            players: (0..num_players).map(Player::new).collect(),
            current_player: 0,
            state: GameState::DrawTile,
            discarded: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_pile_empty(&self) -> bool {
        self.pile.is_empty()
    }

    pub fn tiles_remaining(&self) -> usize {
        self.pile.remaining()
    }

    /// Tiles discarded over the whole game for fitting nowhere.
    pub fn tiles_discarded(&self) -> usize {
        self.discarded
    }

    /// Draw until the player holds a tile that fits somewhere on the board.
    pub fn draw_tile(&mut self, player: usize) -> Result<DrawnTile, PileEmpty> {
        let mut discarded = 0;
        let tile = loop {
            let tile = match self.pile.draw() {
                Ok(tile) => tile,
                Err(empty) => {
                    self.discarded += discarded;
                    return Err(empty);
                }
            };
            if self.board.has_valid_placement(&tile) {
                break tile;
            }
            tracing::debug!(tile = tile.identifier(), "discarding tile with no legal placement");
            discarded += 1;
        };
        self.discarded += discarded;

        let drawn = DrawnTile {
            identifier: tile.identifier().to_string(),
            orientation: tile.orientation(),
            discarded,
            tiles_remaining: self.pile.remaining(),
        };
        tracing::debug!(player, tile = %drawn.identifier, remaining = drawn.tiles_remaining, "tile drawn");
        self.players[player].set_hand(tile);
        self.state = GameState::PlaceTile;
        Ok(drawn)
    }

    pub fn rotate_tile(&mut self, player: usize, rotation: Rotation) -> Result<&Tile, PlacementError> {
        let tile = self.players[player]
            .hand_mut()
            .ok_or(PlacementError::NoTileInHand)?;
        tile.rotate(rotation);
        Ok(tile)
    }

    pub fn place_tile(&mut self, player: usize, x: usize, y: usize) -> Result<(), PlacementError> {
        self.board.place_tile(&mut self.players[player], x, y)?;
        tracing::debug!(player, x, y, "tile placed");
        self.state = GameState::PlaceMeeple;
        Ok(())
    }

    pub fn place_meeple(
        &mut self,
        player: usize,
        x_board: usize,
        y_board: usize,
        x_tile: usize,
        y_tile: usize,
    ) -> Result<MeepleId, MeepleError> {
        let meeple =
            self.board
                .place_meeple(&self.players[player], x_board, y_board, x_tile, y_tile)?;
        tracing::debug!(player, x_board, y_board, x_tile, y_tile, "meeple placed");
        Ok(meeple)
    }

    pub fn num_meeples_placed(&self, player: usize) -> usize {
        self.board.meeples_placed(player)
    }

    /// Every `(x, y, orientation)` where the hand tile may legally go.
    pub fn valid_placements(&self, player: usize) -> Vec<(usize, usize, u8)> {
        let Some(hand) = self.players.get(player).and_then(|p| p.hand()) else {
            return Vec::new();
        };
        let open = self.board.open_positions();
        let mut candidate = hand.clone();
        let mut placements = Vec::new();
        for _ in 0..4 {
            for &(x, y) in &open {
                if self.board.can_place(&candidate, x, y) {
                    placements.push((x, y, candidate.orientation()));
                }
            }
            candidate.rotate_clockwise();
        }
        placements.sort_unstable();
        placements
    }

    /// Run the scoring passes: cloisters, roads, cities, and fields once the game is over.
    pub fn score(&mut self, game_ended: bool) -> Vec<BoardPosition> {
        let mut removed = score_cloisters(&mut self.board, &mut self.players, game_ended);
        removed.extend(score_roads(&mut self.board, &mut self.players, game_ended));
        removed.extend(score_cities(&mut self.board, &mut self.players, game_ended));
        if game_ended {
            removed.extend(score_fields(&mut self.board, &mut self.players));
        }
        removed
    }

    /// Close the current turn: score what the last tile completed, then
    /// either hand over to the next player or, with the pile empty, end the game.
    pub fn end_turn(&mut self) -> TurnOutcome {
        self.state = GameState::EndTurn;
        let mut removed_meeples = self.score(false);

        if self.pile.is_empty() {
            removed_meeples.extend(self.finish());
            return TurnOutcome {
                removed_meeples,
                game_over: true,
            };
        }

        self.current_player = (self.current_player + 1) % self.players.len();
        self.state = GameState::DrawTile;
        TurnOutcome {
            removed_meeples,
            game_over: false,
        }
    }

    /// Final scoring; the game accepts no further turns afterwards.
    pub fn finish(&mut self) -> Vec<BoardPosition> {
        let removed = self.score(true);
        self.state = GameState::EndGame;
        tracing::info!(scores = ?self.scores(), winners = ?self.winners(), "game over");
        removed
    }

    pub fn scores(&self) -> Vec<u32> {
        self.players.iter().map(|p| p.score()).collect()
    }

    /// Seats tied for the top score.
    pub fn winners(&self) -> Vec<usize> {
        let best = self.players.iter().map(|p| p.score()).max().unwrap_or(0);
        self.players
            .iter()
            .filter(|p| p.score() == best)
            .map(|p| p.index())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::carcassonne::tiles::STARTING_TILE_ID;

    const C: usize = BOARD_CENTER;

    #[test]
    fn test_opening_turn() {
        let mut game = Game::with_seed(2, 5);
        assert_eq!(game.state(), GameState::DrawTile);

        let drawn = game.draw_tile(0).unwrap();
        assert_eq!(drawn.identifier, STARTING_TILE_ID);
        assert_eq!(drawn.discarded, 0);
        assert_eq!(drawn.tiles_remaining, 71);
        assert_eq!(game.state(), GameState::PlaceTile);
        assert_eq!(game.valid_placements(0).len(), 4);

        game.place_tile(0, C, C).unwrap();
        assert_eq!(game.state(), GameState::PlaceMeeple);
        game.place_meeple(0, C, C, 3, 0).unwrap();
        assert_eq!(game.num_meeples_placed(0), 1);

        let outcome = game.end_turn();
        assert!(!outcome.game_over);
        assert!(outcome.removed_meeples.is_empty());
        assert_eq!(game.current_player(), 1);
        assert_eq!(game.state(), GameState::DrawTile);
    }

    #[test]
    fn test_rotate_without_tile_fails() {
        let mut game = Game::with_seed(2, 1);
        assert_eq!(
            game.rotate_tile(0, Rotation::Clockwise).err(),
            Some(PlacementError::NoTileInHand)
        );
        game.draw_tile(0).unwrap();
        assert_eq!(game.rotate_tile(0, Rotation::Clockwise).unwrap().orientation(), 1);
        assert_eq!(
            game.rotate_tile(0, Rotation::CounterClockwise).unwrap().orientation(),
            0
        );
    }

    #[test]
    fn test_failed_placement_keeps_state() {
        let mut game = Game::with_seed(2, 9);
        game.draw_tile(0).unwrap();
        game.place_tile(0, C, C).unwrap();
        game.end_turn();

        game.draw_tile(1).unwrap();
        assert_eq!(
            game.place_tile(1, C + 3, C),
            Err(PlacementError::NotAdjacent(C + 3, C))
        );
        assert_eq!(game.state(), GameState::PlaceTile);
        assert!(game.player(1).unwrap().hand().is_some());
    }

    #[test]
    fn test_valid_placements_are_all_legal() {
        let mut game = Game::with_seed(3, 21);
        game.draw_tile(0).unwrap();
        game.place_tile(0, C, C).unwrap();
        game.end_turn();
        game.draw_tile(1).unwrap();

        let placements = game.valid_placements(1);
        assert!(!placements.is_empty());
        let hand = game.player(1).unwrap().hand().unwrap().clone();
        for (x, y, orientation) in placements {
            let mut candidate = hand.clone();
            candidate.set_orientation(orientation);
            assert!(game.board().can_place(&candidate, x, y));
        }
    }

    #[test]
    fn test_winners_reports_ties() {
        let game = Game::with_seed(3, 0);
        assert_eq!(game.winners(), vec![0, 1, 2]);
    }

    #[test]
    fn test_score_order_removes_each_meeple_once() {
        let mut game = Game::with_seed(1, 4);
        game.draw_tile(0).unwrap();
        game.place_tile(0, C, C).unwrap();
        game.place_meeple(0, C, C, 3, 0).unwrap();

        let removed = game.score(true);
        assert_eq!(removed, vec![BoardPosition::new(C, C, 3, 0)]);
        assert_eq!(game.player(0).unwrap().score(), 1);
        assert!(game.score(true).is_empty());
    }

    #[test]
    fn test_discards_that_empty_the_pile_are_counted() {
        use crate::games::carcassonne::board::test_support::tile;

        // Nothing next to a lone road fits a tile that is city on every side.
        let pile = DrawPile::stacked(tile("road_straight", 0), vec![tile("city_full", 0)]);
        let mut game = Game::with_pile(2, pile);
        game.draw_tile(0).unwrap();
        game.place_tile(0, C, C).unwrap();
        assert!(!game.end_turn().game_over);

        assert_eq!(game.draw_tile(1), Err(PileEmpty));
        assert_eq!(game.tiles_discarded(), 1);
        assert!(game.is_pile_empty());
        assert_eq!(game.board().placed_positions().len() + game.tiles_discarded(), 2);
    }
}
