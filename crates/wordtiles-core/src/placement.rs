//! Drop resolution: decides where a released tile ends up.

use crate::board::Board;
use crate::geometry::Coord;
use crate::tray::Tray;
use serde::{Deserialize, Serialize};

/// A drop point expressed in each container's cell frame.
///
/// Either side may be `None` when the point has no meaning for that
/// container (keyboard placement only targets the board, for instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DropTarget {
    pub board: Option<Coord>,
    pub tray: Option<Coord>,
}

impl DropTarget {
    /// Drop that may land on the board at `board` or in the tray at `tray`.
    pub fn new(board: Coord, tray: Coord) -> Self {
        Self {
            board: Some(board),
            tray: Some(tray),
        }
    }

    /// Drop that only touches the board.
    pub fn board_only(pos: Coord) -> Self {
        Self {
            board: Some(pos),
            tray: None,
        }
    }

    /// Drop that only touches the tray.
    pub fn tray_only(pos: Coord) -> Self {
        Self {
            board: None,
            tray: Some(pos),
        }
    }
}

/// Where a drop resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "at", rename_all = "snake_case")]
pub enum Placement {
    /// A free board cell at or next to the drop point.
    Board(Coord),
    /// An existing tray index; the tile is spliced in there.
    Tray(usize),
    /// Fallback: the tray's first empty slot.
    TrayAppend(usize),
}

/// Resolve a drop in three tiers: board, then tray index, then tray append.
///
/// Always yields a placement. Callers detach the tile before resolving so its
/// old cell counts as free.
pub fn resolve(board: &Board, tray: &Tray, target: &DropTarget) -> Placement {
    if let Some(cell) = target.board.and_then(|pos| board.find_nearest_empty_cell(pos)) {
        return Placement::Board(cell);
    }
    if let Some(index) = target.tray.and_then(|pos| tray.find_nearest(pos)) {
        return Placement::Tray(index);
    }
    Placement::TrayAppend(tray.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_wins_in_bounds() {
        let board = Board::new(5, 5, false);
        let tray = Tray::new(5);
        let target = DropTarget::new(Coord::new(2, 2), Coord::new(0, 0));
        assert_eq!(resolve(&board, &tray, &target), Placement::Board(Coord::new(2, 2)));
    }

    #[test]
    fn test_falls_back_to_append() {
        let board = Board::new(5, 5, false);
        let tray = Tray::new(5);
        let target = DropTarget::new(Coord::new(-3, 8), Coord::new(-3, -2));
        assert_eq!(resolve(&board, &tray, &target), Placement::TrayAppend(0));
        assert_eq!(resolve(&board, &tray, &DropTarget::default()), Placement::TrayAppend(0));
    }

    #[test]
    fn test_placement_json() {
        let json = serde_json::to_string(&Placement::Tray(3)).unwrap();
        assert_eq!(json, r#"{"type":"tray","at":3}"#);
    }
}
