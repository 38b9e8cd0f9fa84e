//! The tray: a gap-free rack of tiles waiting to be played.

use crate::error::EngineResult;
use crate::geometry::Coord;
use crate::tile::{TileId, TileSet, Zone};
use rand::Rng;
use rand::seq::SliceRandom;

/// Ordered rack of tiles.
///
/// The tray is laid out as a single row. The tile at index `i` always sits at
/// `(i, 0)`. `slots` is how many cells the row shows; it grows whenever an
/// insertion finds every slot occupied and never shrinks.
#[derive(Debug, Clone)]
pub struct Tray {
    tiles: Vec<TileId>,
    slots: usize,
}

impl Tray {
    /// Empty tray with `slots` slots.
    pub fn new(slots: usize) -> Self {
        Self {
            tiles: Vec::with_capacity(slots),
            slots,
        }
    }

    /// Number of tiles held.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True when the tray holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of cells the tray row currently shows.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Tiles in index order.
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// Tile at `index`, if any.
    pub fn get(&self, index: usize) -> Option<TileId> {
        self.tiles.get(index).copied()
    }

    /// Slot holding `id`.
    pub fn index_of(&self, id: TileId) -> Option<usize> {
        self.tiles.iter().position(|t| *t == id)
    }

    /// True when `id` is in the tray.
    pub fn contains(&self, id: TileId) -> bool {
        self.index_of(id).is_some()
    }

    /// Insert a tile at `index`, or append when `index` is `None`.
    ///
    /// Later tiles move one slot right. An index past the end is clamped to
    /// the end. Returns the index the tile landed at.
    pub fn add_tile(&mut self, id: TileId, index: Option<usize>, tiles: &mut TileSet) -> EngineResult<usize> {
        tiles.require(id)?;
        let index = index.map_or(self.tiles.len(), |i| i.min(self.tiles.len()));
        self.tiles.insert(index, id);
        self.slots = self.slots.max(self.tiles.len());
        self.reflow(index, tiles);
        Ok(index)
    }

    /// Remove a tile and close the gap. Returns the index it was removed from.
    pub fn remove_tile(&mut self, id: TileId, tiles: &mut TileSet) -> Option<usize> {
        let index = self.index_of(id)?;
        self.tiles.remove(index);
        self.reflow(index, tiles);
        Some(index)
    }

    /// Map a cell coordinate in the tray's frame to an occupied index.
    pub fn find_nearest(&self, pos: Coord) -> Option<usize> {
        if pos.y != 0 || pos.x < 0 {
            return None;
        }
        let index = pos.x as usize;
        (index < self.tiles.len()).then_some(index)
    }

    /// First tile in index order carrying `value`.
    pub fn find_by_value(&self, value: char, tiles: &TileSet) -> Option<TileId> {
        let value = value.to_ascii_uppercase();
        self.tiles
            .iter()
            .copied()
            .find(|id| tiles.get(*id).is_some_and(|t| t.value() == value))
    }

    /// Put a tile into the first empty slot, growing the row by one if it is full.
    pub fn add_to_first_empty_cell(&mut self, id: TileId, tiles: &mut TileSet) -> EngineResult<usize> {
        if self.tiles.len() >= self.slots {
            self.slots += 1;
            log::debug!("Tray full, growing to {} slots", self.slots);
        }
        self.add_tile(id, None, tiles)
    }

    /// Randomly reorder the tray.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R, tiles: &mut TileSet) {
        self.tiles.shuffle(rng);
        self.reflow(0, tiles);
    }

    /// Empty the tray. Tiles are not touched.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    fn reflow(&self, from: usize, tiles: &mut TileSet) {
        for (i, id) in self.tiles.iter().enumerate().skip(from) {
            if let Some(tile) = tiles.get_mut(*id) {
                tile.place(Zone::Tray, Coord::new(i as i32, 0));
            }
        }
    }
}

impl Default for Tray {
    fn default() -> Self {
        Self::new(12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Tile, TileData};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup(letters: &str, slots: usize) -> (Tray, TileSet, Vec<TileId>) {
        let mut tray = Tray::new(slots);
        let mut tiles = TileSet::new();
        let mut ids = Vec::new();
        for (i, c) in letters.chars().enumerate() {
            let id = tiles.insert(Tile::new(TileData::new(c, 1), i));
            tray.add_tile(id, None, &mut tiles).unwrap();
            ids.push(id);
        }
        (tray, tiles, ids)
    }

    fn assert_dense(tray: &Tray, tiles: &TileSet) {
        for (i, id) in tray.tiles().iter().enumerate() {
            let tile = tiles.get(*id).unwrap();
            assert_eq!(tile.owner(), Zone::Tray);
            assert_eq!(tile.position(), Coord::new(i as i32, 0));
        }
    }

    #[test]
    fn test_remove_reflows() {
        let (mut tray, mut tiles, ids) = setup("ABC", 12);
        assert_eq!(tray.remove_tile(ids[1], &mut tiles), Some(1));
        assert_eq!(tray.tiles(), &[ids[0], ids[2]]);
        assert_eq!(tiles.get(ids[2]).unwrap().position(), Coord::new(1, 0));
        assert_dense(&tray, &tiles);
    }

    #[test]
    fn test_insert_shifts_right() {
        let (mut tray, mut tiles, ids) = setup("ABC", 12);
        let z = tiles.insert(Tile::new(TileData::new('Z', 10), 0));
        assert_eq!(tray.add_tile(z, Some(1), &mut tiles).unwrap(), 1);
        assert_eq!(tray.tiles(), &[ids[0], z, ids[1], ids[2]]);
        assert_dense(&tray, &tiles);
    }

    #[test]
    fn test_insert_index_clamped() {
        let (mut tray, mut tiles, _) = setup("AB", 12);
        let z = tiles.insert(Tile::new(TileData::new('Z', 10), 0));
        assert_eq!(tray.add_tile(z, Some(40), &mut tiles).unwrap(), 2);
        assert_dense(&tray, &tiles);
    }

    #[test]
    fn test_find_nearest() {
        let (tray, _, _) = setup("ABC", 12);
        assert_eq!(tray.find_nearest(Coord::new(2, 0)), Some(2));
        assert_eq!(tray.find_nearest(Coord::new(3, 0)), None);
        assert_eq!(tray.find_nearest(Coord::new(-1, 0)), None);
        assert_eq!(tray.find_nearest(Coord::new(1, 1)), None);
    }

    #[test]
    fn test_full_tray_grows() {
        let (mut tray, mut tiles, _) = setup("ABC", 3);
        assert_eq!(tray.slots(), 3);
        let d = tiles.insert(Tile::new(TileData::new('D', 2), 0));
        assert_eq!(tray.add_to_first_empty_cell(d, &mut tiles).unwrap(), 3);
        assert_eq!(tray.slots(), 4);
        assert_eq!(tiles.get(d).unwrap().position(), Coord::new(3, 0));
    }

    #[test]
    fn test_find_by_value() {
        let (tray, tiles, ids) = setup("ABA", 12);
        assert_eq!(tray.find_by_value('a', &tiles), Some(ids[0]));
        assert_eq!(tray.find_by_value('Q', &tiles), None);
    }

    #[test]
    fn test_shuffle_keeps_density() {
        let (mut tray, mut tiles, ids) = setup("ABCDEFG", 12);
        let mut rng = StdRng::seed_from_u64(7);
        tray.shuffle(&mut rng, &mut tiles);
        assert_eq!(tray.len(), ids.len());
        for id in &ids {
            assert!(tray.contains(*id));
        }
        assert_dense(&tray, &tiles);
    }
}
