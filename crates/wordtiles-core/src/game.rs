//! The placement engine: one board, one tray and the tiles they hold.

use crate::board::{Board, BoardSnapshot};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::geometry::{Coord, Direction};
use crate::placement::{DropTarget, Placement, resolve};
use crate::tile::{Tile, TileData, TileId, TileSet, Zone};
use crate::tray::Tray;
use crate::validity::ValidityOverlay;
use rand::Rng;

/// A player's board, tray and tiles.
///
/// Every mutation goes through this type so that a tile always has exactly
/// one owner and the tray stays gap-free, including across shift cascades.
/// `revision` counts topology changes and tags verification requests.
#[derive(Debug, Clone)]
pub struct Game {
    config: EngineConfig,
    tiles: TileSet,
    board: Board,
    tray: Tray,
    overlay: ValidityOverlay,
    revision: u64,
}

impl Game {
    /// Empty game laid out from `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            board: Board::new(config.board_width, config.board_height, config.board_expands),
            tray: Tray::new(config.tray_slots),
            tiles: TileSet::new(),
            overlay: ValidityOverlay::new(),
            revision: 0,
            config,
        }
    }

    /// Configuration the game was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The tray.
    pub fn tray(&self) -> &Tray {
        &self.tray
    }

    /// Every tile issued this round.
    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    /// Look up a tile by id.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    /// Current validity markers.
    pub fn overlay(&self) -> &ValidityOverlay {
        &self.overlay
    }

    /// Topology generation. Bumped by every placement, shift, expansion and reset.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Create a tile in the tray's first empty slot.
    pub fn issue_tile(&mut self, data: TileData) -> EngineResult<TileId> {
        let id = self.tiles.insert(Tile::new(data, self.tray.len()));
        self.tray.add_to_first_empty_cell(id, &mut self.tiles)?;
        Ok(id)
    }

    /// Issue several tiles in order.
    pub fn deal(&mut self, tiles: impl IntoIterator<Item = TileData>) -> EngineResult<Vec<TileId>> {
        tiles.into_iter().map(|data| self.issue_tile(data)).collect()
    }

    /// Move a tile to wherever `target` resolves.
    ///
    /// The tile is detached first, so dropping it on or next to its own cell
    /// works. The returned placement is where it was put; a board placement
    /// may then have shifted it, see [`Tile::position`].
    pub fn move_tile_to(&mut self, id: TileId, target: DropTarget) -> EngineResult<Placement> {
        self.tiles.require(id)?;
        self.overlay.validate_tiles(&mut self.tiles);
        self.detach(id);

        let placement = resolve(&self.board, &self.tray, &target);
        match placement {
            Placement::Board(cell) => self.board.add_tile(id, cell, &mut self.tiles, &mut self.tray)?,
            Placement::Tray(index) => {
                self.tray.add_tile(id, Some(index), &mut self.tiles)?;
            }
            Placement::TrayAppend(_) => {
                self.tray.add_to_first_empty_cell(id, &mut self.tiles)?;
            }
        }
        self.revision += 1;
        log::debug!("Tile {} -> {:?}", id, placement);
        Ok(placement)
    }

    /// Return a tile to the tray's first empty slot.
    pub fn send_to_tray(&mut self, id: TileId) -> EngineResult<usize> {
        self.tiles.require(id)?;
        self.overlay.validate_tiles(&mut self.tiles);
        self.detach(id);
        let index = self.tray.add_to_first_empty_cell(id, &mut self.tiles)?;
        self.revision += 1;
        Ok(index)
    }

    /// Clear the board into the tray.
    pub fn send_all_tiles_to_tray(&mut self) -> EngineResult<usize> {
        self.overlay.validate_tiles(&mut self.tiles);
        let moved = self.board.send_all_tiles_to_tray(&mut self.tiles, &mut self.tray)?;
        self.revision += 1;
        Ok(moved)
    }

    /// Shuffle the tray order.
    pub fn shuffle_tray<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.overlay.validate_tiles(&mut self.tiles);
        self.tray.shuffle(rng, &mut self.tiles);
        self.revision += 1;
    }

    /// Shift the board one step, evicting the far line into the tray.
    pub fn shift_tiles(&mut self, direction: Direction) -> EngineResult<Vec<TileId>> {
        self.overlay.validate_tiles(&mut self.tiles);
        let evicted = self.board.shift_tiles(direction, &mut self.tiles, &mut self.tray)?;
        self.revision += 1;
        Ok(evicted)
    }

    /// Shift the board one step only if no tile would fall off.
    pub fn nudge(&mut self, direction: Direction) -> EngineResult<bool> {
        if !self.board.can_shift(direction) {
            return Ok(false);
        }
        self.shift_tiles(direction)?;
        Ok(true)
    }

    /// Grow the board by one line on the `direction` side.
    pub fn expand(&mut self, direction: Direction) -> EngineResult<()> {
        self.overlay.validate_tiles(&mut self.tiles);
        self.board.expand(direction, &mut self.tiles, &mut self.tray)?;
        self.revision += 1;
        Ok(())
    }

    /// Apply verification markers. Returns how many tiles were marked.
    pub fn invalidate_tiles(&mut self, positions: &[Coord]) -> usize {
        self.overlay.invalidate_tiles(positions, &self.board, &mut self.tiles)
    }

    /// Clear every invalid marker.
    pub fn validate_tiles(&mut self) {
        self.overlay.validate_tiles(&mut self.tiles);
    }

    /// Destroy every tile. Board dimensions are kept.
    pub fn remove_all_tiles(&mut self) {
        self.board.remove_all_tiles();
        self.tray.clear();
        self.tiles.clear();
        self.overlay = ValidityOverlay::new();
        self.revision += 1;
    }

    /// Board letters for a verification request.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot(&self.tiles)
    }

    fn detach(&mut self, id: TileId) {
        match self.tiles.get(id).map(Tile::owner) {
            Some(Zone::Board) => {
                self.board.remove_tile(id, &self.tiles);
            }
            Some(Zone::Tray) => {
                self.tray.remove_tile(id, &mut self.tiles);
            }
            None => {}
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    pub(crate) fn game_with(letters: &str) -> (Game, Vec<TileId>) {
        let mut game = Game::default();
        let ids = game
            .deal(letters.chars().map(|c| TileData::new(c, 1)))
            .unwrap();
        (game, ids)
    }

    pub(crate) fn assert_consistent(game: &Game) {
        let mut seen = 0;
        for (pos, id) in game.board().occupied() {
            let tile = game.tile(id).unwrap();
            assert_eq!(tile.owner(), Zone::Board);
            assert_eq!(tile.position(), pos);
            seen += 1;
        }
        for (i, id) in game.tray().tiles().iter().enumerate() {
            let tile = game.tile(*id).unwrap();
            assert_eq!(tile.owner(), Zone::Tray);
            assert_eq!(tile.position(), Coord::new(i as i32, 0));
            seen += 1;
        }
        assert_eq!(seen, game.tiles().len());
    }

    #[test]
    fn test_deal_fills_tray() {
        let (game, ids) = game_with("ABC");
        assert_eq!(game.tray().tiles(), ids.as_slice());
        assert_consistent(&game);
    }

    #[test]
    fn test_edge_drop_shifts_right() {
        let (mut game, ids) = game_with("ABC");
        let placement = game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(0, 0))).unwrap();
        assert_eq!(placement, Placement::Board(Coord::new(0, 0)));
        assert_eq!(game.tile(ids[0]).unwrap().position(), Coord::new(1, 0));
        assert_eq!(game.tray().tiles(), &[ids[1], ids[2]]);
        assert_consistent(&game);
    }

    #[test]
    fn test_drop_back_on_own_cell() {
        let (mut game, ids) = game_with("AB");
        game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(5, 5))).unwrap();
        let placement = game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(5, 5))).unwrap();
        assert_eq!(placement, Placement::Board(Coord::new(5, 5)));
        assert_consistent(&game);
    }

    #[test]
    fn test_drop_on_occupied_uses_neighbour() {
        let (mut game, ids) = game_with("AB");
        game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(5, 5))).unwrap();
        let placement = game.move_tile_to(ids[1], DropTarget::board_only(Coord::new(5, 5))).unwrap();
        assert_eq!(placement, Placement::Board(Coord::new(6, 5)));
        assert_consistent(&game);
    }

    #[test]
    fn test_drop_into_tray_index() {
        let (mut game, ids) = game_with("ABCD");
        let placement = game.move_tile_to(ids[3], DropTarget::tray_only(Coord::new(1, 0))).unwrap();
        assert_eq!(placement, Placement::Tray(1));
        assert_eq!(game.tray().tiles(), &[ids[0], ids[3], ids[1], ids[2]]);
        assert_consistent(&game);
    }

    #[test]
    fn test_drop_nowhere_appends() {
        let (mut game, ids) = game_with("ABC");
        game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(4, 4))).unwrap();
        let placement = game
            .move_tile_to(ids[0], DropTarget::new(Coord::new(-5, -5), Coord::new(9, 9)))
            .unwrap();
        assert_eq!(placement, Placement::TrayAppend(2));
        assert_eq!(game.tray().tiles(), &[ids[1], ids[2], ids[0]]);
        assert_consistent(&game);
    }

    #[test]
    fn test_unknown_tile() {
        let (mut game, _) = game_with("A");
        let bogus = uuid::Uuid::new_v4();
        assert!(game.move_tile_to(bogus, DropTarget::default()).is_err());
        assert!(game.send_to_tray(bogus).is_err());
    }

    #[test]
    fn test_placement_clears_markers() {
        let (mut game, ids) = game_with("AB");
        game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(2, 3))).unwrap();
        assert_eq!(game.invalidate_tiles(&[Coord::new(2, 3)]), 1);
        assert!(!game.tile(ids[0]).unwrap().is_valid());
        game.move_tile_to(ids[1], DropTarget::board_only(Coord::new(6, 6))).unwrap();
        assert!(game.tiles().iter().all(|t| t.is_valid()));
        assert!(!game.overlay().showing_invalid());
    }

    #[test]
    fn test_nudge_refuses_to_evict() {
        let (mut game, ids) = game_with("A");
        game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(10, 5))).unwrap();
        assert!(game.nudge(Direction::Right).unwrap());
        assert_eq!(game.tile(ids[0]).unwrap().position(), Coord::new(11, 5));
        assert!(!game.nudge(Direction::Right).unwrap());
        assert_eq!(game.tile(ids[0]).unwrap().owner(), Zone::Board);
        assert_consistent(&game);
    }

    #[test]
    fn test_shift_evicts_to_tray() {
        let (mut game, ids) = game_with("AB");
        game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(10, 5))).unwrap();
        game.shift_tiles(Direction::Right).unwrap();
        let evicted = game.shift_tiles(Direction::Right).unwrap();
        assert_eq!(evicted, vec![ids[0]]);
        assert_eq!(game.tray().tiles(), &[ids[1], ids[0]]);
        assert_consistent(&game);
    }

    #[test]
    fn test_send_all_and_shuffle() {
        let (mut game, ids) = game_with("ABCDE");
        for (i, id) in ids.iter().enumerate() {
            game.move_tile_to(*id, DropTarget::board_only(Coord::new(2 + i as i32, 4))).unwrap();
        }
        assert!(game.tray().is_empty());
        assert_eq!(game.send_all_tiles_to_tray().unwrap(), 5);
        let mut rng = StdRng::seed_from_u64(11);
        game.shuffle_tray(&mut rng);
        assert_eq!(game.tray().len(), 5);
        assert_consistent(&game);
    }

    #[test]
    fn test_remove_all_tiles_resets() {
        let (mut game, ids) = game_with("ABC");
        game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(4, 4))).unwrap();
        game.expand(Direction::Down).unwrap();
        let before = game.revision();
        game.remove_all_tiles();
        assert!(game.tiles().is_empty());
        assert!(game.board().is_empty());
        assert!(game.tray().is_empty());
        assert_eq!(game.board().height(), 13);
        assert!(game.revision() > before);
    }

    #[test]
    fn test_revision_tracks_topology() {
        let (mut game, ids) = game_with("A");
        let r0 = game.revision();
        game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(4, 4))).unwrap();
        assert_eq!(game.revision(), r0 + 1);
        game.invalidate_tiles(&[Coord::new(4, 4)]);
        assert_eq!(game.revision(), r0 + 1);
    }

    #[test]
    fn test_snapshot_reflects_board() {
        let (mut game, ids) = game_with("QI");
        game.move_tile_to(ids[0], DropTarget::board_only(Coord::new(3, 3))).unwrap();
        game.move_tile_to(ids[1], DropTarget::board_only(Coord::new(4, 3))).unwrap();
        let snap = game.snapshot();
        assert_eq!(snap.get(Coord::new(3, 3)), Some('Q'));
        assert_eq!(snap.get(Coord::new(4, 3)), Some('I'));
        assert_eq!(snap.tile_count(), 2);
    }
}
