//! Board scoring.
//!
//! A board is split into connected components. Within a component every
//! maximal run of two or more tiles, read rightwards and downwards, must be a
//! dictionary word. The best fully valid component counts towards the score;
//! the score is the points left unplayed, so zero means every served tile was
//! used in valid words.

use crate::bag::point_value;
use crate::dictionary::Dictionary;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use wordtiles_core::{BoardSnapshot, Coord, TileData, Verdict};

type CellSet = BTreeSet<Coord>;

const READ_DIRECTIONS: [(i32, i32); 2] = [(1, 0), (0, 1)];

/// Score `board` against the tiles served to the player so far.
///
/// Boards holding more tiles than were served, or letters that were never
/// served, score the full penalty without being read.
pub fn score_board(board: &BoardSnapshot, served: &[TileData], dict: &Dictionary) -> Verdict {
    let max_score: i64 = served.iter().map(|t| i64::from(t.points)).sum();
    let all: CellSet = board.occupied().map(|(pos, _)| pos).collect();

    let rejected = Verdict {
        win: false,
        score: max_score,
        invalid: Vec::new(),
    };
    if all.len() > served.len() {
        warn!("Board has {} tiles but {} were served", all.len(), served.len());
        return rejected;
    }
    if !letters_were_served(board, served) {
        warn!("Board letters were never served, cheating suspected");
        return rejected;
    }

    let scorer = Scorer::new(board, dict);
    let mut invalid = CellSet::new();
    let components = scorer.scorable_components(&all, &mut invalid);
    let best = scorer.best_score(&components);
    debug!("Best component score {} of {}", best, max_score);

    let mut score = max_score - best;
    if score < 0 {
        warn!("Impossible score {}, cheating suspected", score);
        score = max_score;
    }
    Verdict {
        win: score == 0 && all.len() == served.len(),
        score,
        invalid: invalid.into_iter().collect(),
    }
}

/// True when the board's letters form a sub-multiset of the served letters.
fn letters_were_served(board: &BoardSnapshot, served: &[TileData]) -> bool {
    let mut counts = [0i32; 26];
    let index = |c: char| c.is_ascii_uppercase().then(|| (c as u8 - b'A') as usize);
    for tile in served {
        if let Some(i) = index(tile.value) {
            counts[i] += 1;
        }
    }
    for (_, letter) in board.occupied() {
        match index(letter.to_ascii_uppercase()) {
            Some(i) => counts[i] -= 1,
            None => return false,
        }
    }
    counts.iter().all(|&n| n >= 0)
}

/// What one component yields: its scorable parts and the cells found in
/// invalid words along the way.
type Reading = (Vec<CellSet>, CellSet);

struct Scorer<'a> {
    board: &'a BoardSnapshot,
    dict: &'a Dictionary,
    /// Readings by component. Removal attempts revisit the same sub-boards.
    readings: RefCell<BTreeMap<CellSet, Reading>>,
}

impl<'a> Scorer<'a> {
    fn new(board: &'a BoardSnapshot, dict: &'a Dictionary) -> Self {
        Self {
            board,
            dict,
            readings: RefCell::new(BTreeMap::new()),
        }
    }


    fn letter(&self, pos: Coord) -> char {
        self.board.get(pos).map_or(' ', |c| c.to_ascii_uppercase())
    }

    /// Components of `cells` that contain only valid words.
    ///
    /// Cells in invalid words are added to `invalid_all`.
    fn scorable_components(&self, cells: &CellSet, invalid_all: &mut CellSet) -> Vec<CellSet> {
        let mut scorable = Vec::new();
        for component in components(cells) {
            let (parts, invalid) = self.read_component(component);
            scorable.extend(parts);
            invalid_all.extend(invalid);
        }
        scorable
    }

    fn read_component(&self, component: CellSet) -> Reading {
        if let Some(reading) = self.readings.borrow().get(&component) {
            return reading.clone();
        }
        let reading = self.read_uncached(&component);
        self.readings.borrow_mut().insert(component, reading.clone());
        reading
    }

    fn read_uncached(&self, component: &CellSet) -> Reading {
        if component.len() <= 1 {
            return (Vec::new(), component.clone());
        }

        let mut valid = CellSet::new();
        let mut invalid = CellSet::new();
        for &pos in component {
            for (dx, dy) in READ_DIRECTIONS {
                let before = Coord::new(pos.x - dx, pos.y - dy);
                if component.contains(&before) {
                    continue;
                }
                let (is_word, run) = self.follow_word(pos, component, (dx, dy));
                if is_word {
                    valid.extend(run);
                } else {
                    invalid.extend(run);
                }
            }
        }

        if valid.len() == component.len() {
            if invalid.is_empty() {
                (vec![valid], invalid)
            } else {
                (self.best_removal(&valid, &invalid), invalid)
            }
        } else {
            let mut invalid_all = invalid;
            let parts = self.scorable_components(&valid, &mut invalid_all);
            (parts, invalid_all)
        }
    }

    /// Read the run starting at `start`. Runs of a single tile read as valid
    /// and empty.
    fn follow_word(&self, start: Coord, component: &CellSet, (dx, dy): (i32, i32)) -> (bool, CellSet) {
        let mut run = CellSet::new();
        let mut next = Coord::new(start.x + dx, start.y + dy);
        if !component.contains(&next) {
            return (true, run);
        }
        run.insert(start);
        let mut word = String::from(self.letter(start));
        while component.contains(&next) {
            run.insert(next);
            word.push(self.letter(next));
            next = Coord::new(next.x + dx, next.y + dy);
        }
        (self.dict.contains(&word), run)
    }

    /// Try dropping each invalid cell in turn and keep the best-scoring result.
    fn best_removal(&self, valid: &CellSet, invalid: &CellSet) -> Vec<CellSet> {
        let mut best_score = 0;
        let mut best_choice = Vec::new();
        for cell in invalid {
            let mut attempt = valid.clone();
            attempt.remove(cell);
            let mut scratch = CellSet::new();
            let choice = self.scorable_components(&attempt, &mut scratch);
            let score = self.best_score(&choice);
            if score > best_score {
                best_score = score;
                best_choice = choice;
            }
        }
        best_choice
    }

    fn best_score(&self, components: &[CellSet]) -> i64 {
        components
            .iter()
            .map(|c| c.iter().map(|p| i64::from(point_value(self.letter(*p)))).sum())
            .max()
            .unwrap_or(0)
    }
}

/// Split `cells` into orthogonally connected components.
fn components(cells: &CellSet) -> Vec<CellSet> {
    let mut seen = CellSet::new();
    let mut result = Vec::new();
    for &start in cells {
        if seen.contains(&start) {
            continue;
        }
        let mut component = CellSet::new();
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            if !cells.contains(&pos) || !component.insert(pos) {
                continue;
            }
            stack.extend(pos.neighbours());
        }
        seen.extend(component.iter().copied());
        result.push(component);
    }
    result
}
