//! Flag-gated correctness markers driven by verification results.

use crate::board::Board;
use crate::geometry::Coord;
use crate::tile::TileSet;

/// Tracks whether invalid markers are currently shown.
///
/// While `showing_invalid` is false every tile is valid, so a sweep can be
/// skipped entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityOverlay {
    showing_invalid: bool,
}

impl ValidityOverlay {
    /// Overlay with nothing marked.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while any invalid marker is shown.
    pub fn showing_invalid(&self) -> bool {
        self.showing_invalid
    }

    /// Mark the tiles at `positions` invalid. Returns how many were marked.
    pub fn invalidate_tiles(&mut self, positions: &[Coord], board: &Board, tiles: &mut TileSet) -> usize {
        if !self.showing_invalid {
            self.sweep(tiles);
            self.showing_invalid = true;
        }
        let mut marked = 0;
        for pos in positions {
            match board.cell(*pos).and_then(|id| tiles.get_mut(id)) {
                Some(tile) => {
                    tile.valid = false;
                    marked += 1;
                }
                None => log::warn!("No tile at {} to mark invalid", pos),
            }
        }
        marked
    }

    /// Clear all invalid markers. No-op unless markers are showing.
    pub fn validate_tiles(&mut self, tiles: &mut TileSet) {
        if !self.showing_invalid {
            return;
        }
        self.showing_invalid = false;
        self.sweep(tiles);
    }

    fn sweep(&self, tiles: &mut TileSet) {
        for tile in tiles.iter_mut() {
            tile.valid = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Tile, TileData, TileId};
    use crate::tray::Tray;

    fn board_with(positions: &[(i32, i32)]) -> (Board, TileSet, Vec<TileId>) {
        let mut board = Board::new(8, 8, false);
        let mut tray = Tray::new(8);
        let mut tiles = TileSet::new();
        let mut ids = Vec::new();
        for (x, y) in positions {
            let id = tiles.insert(Tile::new(TileData::new('A', 1), 0));
            board.add_tile(id, Coord::new(*x, *y), &mut tiles, &mut tray).unwrap();
            ids.push(id);
        }
        (board, tiles, ids)
    }

    #[test]
    fn test_invalidate_marks_only_listed() {
        let (board, mut tiles, ids) = board_with(&[(2, 3), (4, 4)]);
        let mut overlay = ValidityOverlay::new();
        assert_eq!(overlay.invalidate_tiles(&[Coord::new(2, 3)], &board, &mut tiles), 1);
        assert!(overlay.showing_invalid());
        assert!(!tiles.get(ids[0]).unwrap().is_valid());
        assert!(tiles.get(ids[1]).unwrap().is_valid());
    }

    #[test]
    fn test_validate_clears_everything() {
        let (board, mut tiles, _) = board_with(&[(2, 3), (4, 4)]);
        let mut overlay = ValidityOverlay::new();
        overlay.invalidate_tiles(&[Coord::new(2, 3), Coord::new(4, 4)], &board, &mut tiles);
        overlay.validate_tiles(&mut tiles);
        assert!(!overlay.showing_invalid());
        assert!(tiles.iter().all(|t| t.is_valid()));
    }

    #[test]
    fn test_validate_is_noop_when_hidden() {
        let (_, mut tiles, ids) = board_with(&[(2, 3)]);
        let mut overlay = ValidityOverlay::new();
        // stray marker set behind the overlay's back survives a no-op validate
        tiles.get_mut(ids[0]).unwrap().valid = false;
        overlay.validate_tiles(&mut tiles);
        assert!(!tiles.get(ids[0]).unwrap().is_valid());
    }

    #[test]
    fn test_invalidate_skips_empty_cells() {
        let (board, mut tiles, _) = board_with(&[(2, 3)]);
        let mut overlay = ValidityOverlay::new();
        assert_eq!(overlay.invalidate_tiles(&[Coord::new(5, 5), Coord::new(-1, 0)], &board, &mut tiles), 0);
        assert!(overlay.showing_invalid());
    }

    #[test]
    fn test_second_invalidate_keeps_previous_markers() {
        let (board, mut tiles, ids) = board_with(&[(2, 3), (4, 4)]);
        let mut overlay = ValidityOverlay::new();
        overlay.invalidate_tiles(&[Coord::new(2, 3)], &board, &mut tiles);
        overlay.invalidate_tiles(&[Coord::new(4, 4)], &board, &mut tiles);
        assert!(!tiles.get(ids[0]).unwrap().is_valid());
        assert!(!tiles.get(ids[1]).unwrap().is_valid());
    }
}
