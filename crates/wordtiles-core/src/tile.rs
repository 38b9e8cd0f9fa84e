//! Letter tiles and the arena that owns them.

use crate::error::{EngineError, EngineResult};
use crate::geometry::Coord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for tiles.
pub type TileId = Uuid;

/// The container a tile currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Board,
    Tray,
}

/// Letter and point value of a tile as issued by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileData {
    pub value: char,
    pub points: u32,
}

impl TileData {
    /// Tile data; the letter is uppercased.
    pub fn new(value: char, points: u32) -> Self {
        Self {
            value: value.to_ascii_uppercase(),
            points,
        }
    }
}

/// A single lettered tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub(crate) id: TileId,
    value: char,
    points: u32,
    pub(crate) owner: Zone,
    pub(crate) position: Coord,
    pub(crate) valid: bool,
}

impl Tile {
    /// Create a tile sitting in the tray at the given slot.
    pub(crate) fn new(data: TileData, slot: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            value: data.value,
            points: data.points,
            owner: Zone::Tray,
            position: Coord::new(slot as i32, 0),
            valid: true,
        }
    }

    /// Unique id.
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Letter shown on the tile.
    pub fn value(&self) -> char {
        self.value
    }

    /// Point value.
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Which container holds this tile.
    pub fn owner(&self) -> Zone {
        self.owner
    }

    /// Position within the owner's grid. Tray tiles always sit on row 0.
    pub fn position(&self) -> Coord {
        self.position
    }

    /// False while an invalid marker is shown.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Letter and points.
    pub fn data(&self) -> TileData {
        TileData {
            value: self.value,
            points: self.points,
        }
    }

    pub(crate) fn place(&mut self, owner: Zone, position: Coord) {
        self.owner = owner;
        self.position = position;
    }
}

/// Arena of every live tile, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    tiles: HashMap<TileId, Tile>,
}

impl TileSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, tile: Tile) -> TileId {
        let id = tile.id;
        self.tiles.insert(id, tile);
        id
    }

    /// Look up a tile.
    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(&id)
    }

    /// Look up a tile, failing with `UnknownTile`.
    pub fn require(&self, id: TileId) -> EngineResult<&Tile> {
        self.tiles.get(&id).ok_or(EngineError::UnknownTile(id))
    }

    pub(crate) fn require_mut(&mut self, id: TileId) -> EngineResult<&mut Tile> {
        self.tiles.get_mut(&id).ok_or(EngineError::UnknownTile(id))
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True when no tiles were issued.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.values_mut()
    }

    pub(crate) fn clear(&mut self) {
        self.tiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tile_starts_in_tray() {
        let tile = Tile::new(TileData::new('q', 10), 3);
        assert_eq!(tile.value(), 'Q');
        assert_eq!(tile.owner(), Zone::Tray);
        assert_eq!(tile.position(), Coord::new(3, 0));
        assert!(tile.is_valid());
    }

    #[test]
    fn test_require_unknown() {
        let set = TileSet::new();
        let id = Uuid::new_v4();
        assert!(matches!(set.require(id), Err(EngineError::UnknownTile(e)) if e == id));
    }

    #[test]
    fn test_tile_data_json() {
        let data: TileData = serde_json::from_str(r#"{"value":"E","points":1}"#).unwrap();
        assert_eq!(data, TileData::new('E', 1));
    }
}
