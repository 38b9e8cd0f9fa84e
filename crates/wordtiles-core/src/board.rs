//! The board: an expandable grid of placed tiles.
//!
//! Cells are stored column-major (`cells[x][y]`), the same layout the
//! verification payload uses on the wire.

use crate::error::{EngineError, EngineResult};
use crate::geometry::{Coord, Direction};
use crate::tile::{TileId, TileSet, Zone};
use crate::tray::Tray;
use serde::{Deserialize, Serialize};

/// Placement surface for tiles.
///
/// Dimensions only ever grow. Placing a tile on an edge cell moves the
/// content one step away from that edge, either by shifting (dropping the far
/// line into the tray) or, when `expands` is set, by growing the board.
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Vec<Option<TileId>>>,
    expands: bool,
}

impl Board {
    /// Empty board of `width` columns and `height` rows.
    pub fn new(width: usize, height: usize, expands: bool) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![None; height]; width],
            expands,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether edge placements grow the board instead of shifting it.
    pub fn expands(&self) -> bool {
        self.expands
    }

    /// True when `pos` lies on the board.
    pub fn contains(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Tile at `pos`, or `None` for empty and out-of-bounds cells.
    pub fn cell(&self, pos: Coord) -> Option<TileId> {
        if !self.contains(pos) {
            return None;
        }
        self.cells[pos.x as usize][pos.y as usize]
    }

    /// Raw cell write. Does not touch tile ownership.
    pub fn set_cell(&mut self, pos: Coord, value: Option<TileId>) -> EngineResult<()> {
        if !self.contains(pos) {
            return Err(EngineError::OutOfBounds(pos));
        }
        self.cells[pos.x as usize][pos.y as usize] = value;
        Ok(())
    }

    /// True when no cell holds a tile.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    /// Occupied cells in column order.
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, TileId)> + '_ {
        self.cells.iter().enumerate().flat_map(|(x, column)| {
            column
                .iter()
                .enumerate()
                .filter_map(move |(y, cell)| cell.map(|id| (Coord::new(x as i32, y as i32), id)))
        })
    }

    /// Nearest free cell to `pos`: the cell itself, then +x, -x, +y, -y.
    ///
    /// Returns `None` when `pos` lies outside the board or every candidate is
    /// taken. The search never looks further than one step.
    pub fn find_nearest_empty_cell(&self, pos: Coord) -> Option<Coord> {
        if !self.contains(pos) {
            return None;
        }
        std::iter::once(pos)
            .chain(pos.neighbours())
            .find(|c| self.contains(*c) && self.cell(*c).is_none())
    }

    /// Place a tile at `pos`, then react to edge contact.
    ///
    /// A tile already on this board is moved; its old cell is cleared.
    pub fn add_tile(&mut self, id: TileId, pos: Coord, tiles: &mut TileSet, tray: &mut Tray) -> EngineResult<()> {
        if !self.contains(pos) {
            return Err(EngineError::OutOfBounds(pos));
        }
        if let Some(other) = self.cell(pos) {
            if other != id {
                return Err(EngineError::CellOccupied(pos));
            }
        }

        let tile = tiles.require_mut(id)?;
        if tile.owner == Zone::Board && tile.position != pos {
            let old = tile.position;
            if self.cell(old) == Some(id) {
                self.set_cell(old, None)?;
            }
        }
        tile.place(Zone::Board, pos);
        self.set_cell(pos, Some(id))?;

        if let Some(away) = self.edge_response(pos) {
            if self.expands {
                self.expand(away.opposite(), tiles, tray)?;
            } else {
                self.shift_tiles(away, tiles, tray)?;
            }
        }
        Ok(())
    }

    /// Direction to move content after a placement at `pos`. Columns win over rows.
    fn edge_response(&self, pos: Coord) -> Option<Direction> {
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x == 0 {
            Some(Direction::Right)
        } else if x + 1 == self.width {
            Some(Direction::Left)
        } else if y == 0 {
            Some(Direction::Down)
        } else if y + 1 == self.height {
            Some(Direction::Up)
        } else {
            None
        }
    }

    /// Clear the cell holding `id`. Returns the cell it was in.
    pub fn remove_tile(&mut self, id: TileId, tiles: &TileSet) -> Option<Coord> {
        let hinted = tiles
            .get(id)
            .filter(|t| t.owner() == Zone::Board)
            .map(|t| t.position())
            .filter(|p| self.cell(*p) == Some(id));
        let pos = hinted.or_else(|| self.occupied().find(|(_, t)| *t == id).map(|(p, _)| p))?;
        self.cells[pos.x as usize][pos.y as usize] = None;
        Some(pos)
    }

    /// True when shifting in `direction` would not push any tile off the board.
    pub fn can_shift(&self, direction: Direction) -> bool {
        match direction {
            Direction::Right => self.cells.last().is_none_or(|col| col.iter().all(Option::is_none)),
            Direction::Left => self.cells.first().is_none_or(|col| col.iter().all(Option::is_none)),
            Direction::Down => self.cells.iter().all(|col| col.last().is_none_or(Option::is_none)),
            Direction::Up => self.cells.iter().all(|col| col.first().is_none_or(Option::is_none)),
        }
    }

    /// Move every tile one step in `direction`.
    ///
    /// The far line is dropped and an empty one appears at the near edge.
    /// Tiles on the dropped line go back to the tray. Returns the evicted tiles.
    pub fn shift_tiles(&mut self, direction: Direction, tiles: &mut TileSet, tray: &mut Tray) -> EngineResult<Vec<TileId>> {
        let height = self.height;
        let dropped: Vec<Option<TileId>> = match direction {
            Direction::Right => {
                let last = self.cells.pop().unwrap_or_default();
                self.cells.insert(0, vec![None; height]);
                last
            }
            Direction::Left => {
                let first = if self.cells.is_empty() { Vec::new() } else { self.cells.remove(0) };
                self.cells.push(vec![None; height]);
                first
            }
            Direction::Down => self
                .cells
                .iter_mut()
                .map(|col| {
                    let last = col.pop().flatten();
                    col.insert(0, None);
                    last
                })
                .collect(),
            Direction::Up => self
                .cells
                .iter_mut()
                .map(|col| {
                    let first = if col.is_empty() { None } else { col.remove(0) };
                    col.push(None);
                    first
                })
                .collect(),
        };

        self.sync_positions(tiles);

        let evicted: Vec<TileId> = dropped.into_iter().flatten().collect();
        for id in &evicted {
            tray.add_to_first_empty_cell(*id, tiles)?;
        }
        if !evicted.is_empty() {
            log::info!("Shift {:?} evicted {} tile(s) to the tray", direction, evicted.len());
        }
        Ok(evicted)
    }

    /// Grow the board by one line on the `direction` side.
    ///
    /// Growing left or up shifts the content so it stays put relative to
    /// the old lines.
    pub fn expand(&mut self, direction: Direction, tiles: &mut TileSet, tray: &mut Tray) -> EngineResult<()> {
        if direction.is_horizontal() {
            self.cells.push(vec![None; self.height]);
            self.width += 1;
        } else {
            for col in &mut self.cells {
                col.push(None);
            }
            self.height += 1;
        }
        log::debug!("Board expanded {:?} to {}x{}", direction, self.width, self.height);

        match direction {
            Direction::Left => {
                self.shift_tiles(Direction::Right, tiles, tray)?;
            }
            Direction::Up => {
                self.shift_tiles(Direction::Down, tiles, tray)?;
            }
            Direction::Right | Direction::Down => {}
        }
        Ok(())
    }

    /// Clear every cell. Tiles themselves are left to the caller.
    pub fn remove_all_tiles(&mut self) {
        for col in &mut self.cells {
            col.fill(None);
        }
    }

    /// Move every placed tile into the tray, in column order.
    pub fn send_all_tiles_to_tray(&mut self, tiles: &mut TileSet, tray: &mut Tray) -> EngineResult<usize> {
        let placed: Vec<TileId> = self.occupied().map(|(_, id)| id).collect();
        self.remove_all_tiles();
        for id in &placed {
            tray.add_to_first_empty_cell(*id, tiles)?;
        }
        Ok(placed.len())
    }

    /// Letters on the board, column-major, for verification requests.
    pub fn snapshot(&self, tiles: &TileSet) -> BoardSnapshot {
        BoardSnapshot(
            self.cells
                .iter()
                .map(|col| col.iter().map(|cell| cell.and_then(|id| tiles.get(id)).map(|t| t.value())).collect())
                .collect(),
        )
    }

    fn sync_positions(&self, tiles: &mut TileSet) {
        for (pos, id) in self.occupied() {
            if let Some(tile) = tiles.get_mut(id) {
                tile.place(Zone::Board, pos);
            }
        }
    }
}

/// Board letters indexed `[x][y]`, `None` for empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardSnapshot(pub Vec<Vec<Option<char>>>);

impl BoardSnapshot {
    /// Build a snapshot from row strings, `.` marking an empty cell.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut columns = vec![vec![None; rows.len()]; width];
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c != '.' {
                    columns[x][y] = Some(c.to_ascii_uppercase());
                }
            }
        }
        Self(columns)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// Rows in the first column.
    pub fn height(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    /// Letter at `pos`, if any.
    pub fn get(&self, pos: Coord) -> Option<char> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        self.0.get(pos.x as usize)?.get(pos.y as usize).copied().flatten()
    }

    /// Occupied cells in column order.
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, char)> + '_ {
        self.0.iter().enumerate().flat_map(|(x, column)| {
            column
                .iter()
                .enumerate()
                .filter_map(move |(y, c)| c.map(|c| (Coord::new(x as i32, y as i32), c)))
        })
    }

    /// Number of occupied cells.
    pub fn tile_count(&self) -> usize {
        self.occupied().count()
    }
}
