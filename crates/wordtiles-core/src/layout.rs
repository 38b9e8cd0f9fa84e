//! Pixel to cell conversion for the board and tray frames.
//!
//! The engine works purely in cell coordinates. Renderers and input layers
//! use these frames to go between logical pixels and cells.

use crate::config::EngineConfig;
use crate::geometry::Coord;
use crate::placement::DropTarget;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A regular grid anchored at `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridFrame {
    /// Top-left corner of cell `(0, 0)`.
    pub origin: Point,
    pub cell_size: f64,
}

impl GridFrame {
    /// Grid with its top-left cell at `origin`.
    pub fn new(origin: Point, cell_size: f64) -> Self {
        Self { origin, cell_size }
    }

    /// The cell containing `point`. Points left of or above the origin map
    /// to negative cells.
    pub fn cell_at(&self, point: Point) -> Coord {
        let local = point - self.origin;
        Coord::new(
            (local.x / self.cell_size).floor() as i32,
            (local.y / self.cell_size).floor() as i32,
        )
    }

    /// Top-left corner of a cell.
    pub fn cell_origin(&self, cell: Coord) -> Point {
        self.origin + Vec2::new(cell.x as f64 * self.cell_size, cell.y as f64 * self.cell_size)
    }

    /// Screen rectangle covered by `cell`.
    pub fn cell_rect(&self, cell: Coord) -> Rect {
        let p = self.cell_origin(cell);
        Rect::new(p.x, p.y, p.x + self.cell_size, p.y + self.cell_size)
    }

    /// Screen point at the middle of `cell`.
    pub fn cell_center(&self, cell: Coord) -> Point {
        self.cell_rect(cell).center()
    }
}

/// Screen layout of the board and tray.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub board: GridFrame,
    pub tray: GridFrame,
}

impl Layout {
    /// Board and tray frames from the configured origins and cell size.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            board: GridFrame::new(config.board_origin, config.cell_size),
            tray: GridFrame::new(config.tray_origin, config.cell_size),
        }
    }

    /// Convert a release point to the resolver's input.
    pub fn drop_target(&self, point: Point) -> DropTarget {
        DropTarget::new(self.board.cell_at(point), self.tray.cell_at(point))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_at_floors() {
        let frame = GridFrame::new(Point::new(10.0, 10.0), 64.0);
        assert_eq!(frame.cell_at(Point::new(10.0, 10.0)), Coord::new(0, 0));
        assert_eq!(frame.cell_at(Point::new(73.9, 138.0)), Coord::new(0, 2));
        assert_eq!(frame.cell_at(Point::new(9.0, 10.0)), Coord::new(-1, 0));
    }

    #[test]
    fn test_cell_rect_roundtrip() {
        let frame = GridFrame::new(Point::new(5.0, 0.0), 32.0);
        let cell = Coord::new(3, 4);
        let rect = frame.cell_rect(cell);
        assert!((rect.x0 - 101.0).abs() < f64::EPSILON);
        assert!((rect.y0 - 128.0).abs() < f64::EPSILON);
        assert_eq!(frame.cell_at(frame.cell_center(cell)), cell);
    }

    #[test]
    fn test_drop_target_both_frames() {
        let layout = Layout::default();
        let target = layout.drop_target(Point::new(42.0, 840.0));
        assert_eq!(target.board, Some(Coord::new(0, 12)));
        assert_eq!(target.tray, Some(Coord::new(0, 0)));
    }
}
