//! Integer cell coordinates and directions shared by the board and tray.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate in a container's logical grid.
///
/// `x` is the column, `y` is the row. Both grow away from the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    /// Cell at column `x`, row `y`.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate one step away in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Orthogonal neighbours in +x, -x, +y, -y order.
    pub fn neighbours(self) -> [Coord; 4] {
        [
            Self::new(self.x + 1, self.y),
            Self::new(self.x - 1, self.y),
            Self::new(self.x, self.y + 1),
            Self::new(self.x, self.y - 1),
        ]
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    /// Unit step `(dx, dy)` for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// True for directions that move along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_and_opposite() {
        let c = Coord::new(2, 3);
        for dir in Direction::ALL {
            assert_eq!(c.step(dir).step(dir.opposite()), c);
        }
        assert_eq!(c.step(Direction::Up), Coord::new(2, 2));
        assert_eq!(c.step(Direction::Right), Coord::new(3, 3));
    }

    #[test]
    fn test_neighbour_order() {
        let n = Coord::new(0, 0).neighbours();
        assert_eq!(n, [Coord::new(1, 0), Coord::new(-1, 0), Coord::new(0, 1), Coord::new(0, -1)]);
    }

    #[test]
    fn test_coord_serialize() {
        let json = serde_json::to_string(&Coord::new(4, 7)).unwrap();
        assert_eq!(json, r#"{"x":4,"y":7}"#);
    }
}
