//! Keyboard entry: type letters onto the board from a highlighted cell.
//!
//! This is a thin layer over [`Game::move_tile_to`]; it never touches the
//! board or tray directly.

use crate::board::Board;
use crate::error::EngineResult;
use crate::game::Game;
use crate::geometry::{Coord, Direction};
use crate::placement::DropTarget;
use crate::tile::Zone;

/// The highlighted cell and the direction typing advances in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub cell: Coord,
    /// Either `Right` or `Down`.
    pub direction: Direction,
}

/// Keys the adapter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Arrow(Direction),
    Space,
    Shift,
    Enter,
    Backspace,
    Delete,
    Escape,
    Letter(char),
}

impl Key {
    /// Parse a `KeyboardEvent.key` name.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "ArrowUp" => Key::Arrow(Direction::Up),
            "ArrowDown" => Key::Arrow(Direction::Down),
            "ArrowLeft" => Key::Arrow(Direction::Left),
            "ArrowRight" => Key::Arrow(Direction::Right),
            " " => Key::Space,
            "Shift" => Key::Shift,
            "Enter" => Key::Enter,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Escape" => Key::Escape,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => Key::Letter(c.to_ascii_uppercase()),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// Modifier state accompanying a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
}

/// Keyboard typing state.
#[derive(Debug, Clone, Default)]
pub struct TypingAdapter {
    highlight: Option<Highlight>,
}

impl TypingAdapter {
    /// Inactive adapter with no cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor cell and direction.
    pub fn highlight(&self) -> Option<Highlight> {
        self.highlight
    }

    /// True while a cursor is shown.
    pub fn is_active(&self) -> bool {
        self.highlight.is_some()
    }

    /// Highlight `cell`, keeping the current typing direction.
    pub fn focus(&mut self, cell: Coord, board: &Board) {
        if !board.contains(cell) {
            return;
        }
        let direction = self.highlight.map_or(Direction::Right, |h| h.direction);
        self.highlight = Some(Highlight { cell, direction });
    }

    /// Hide the cursor.
    pub fn clear(&mut self) {
        self.highlight = None;
    }

    /// Switch between typing across and down.
    pub fn toggle_direction(&mut self) {
        if let Some(h) = &mut self.highlight {
            h.direction = match h.direction {
                Direction::Right => Direction::Down,
                _ => Direction::Right,
            };
        }
    }

    /// Move the highlight one cell, staying on the board.
    pub fn move_cursor(&mut self, direction: Direction, board: &Board) {
        if let Some(h) = &mut self.highlight {
            let next = h.cell.step(direction);
            if board.contains(next) {
                h.cell = next;
            }
        }
    }

    /// Place a tray tile carrying `letter` at the highlight and advance.
    ///
    /// If the cell already shows that letter the highlight just advances.
    /// A different tile in the cell goes back to the tray. Returns false when
    /// nothing happened.
    pub fn type_letter(&mut self, game: &mut Game, letter: char) -> EngineResult<bool> {
        let Some(h) = self.highlight else {
            return Ok(false);
        };
        let letter = letter.to_ascii_uppercase();

        let existing = game.board().cell(h.cell);
        if existing.and_then(|id| game.tile(id)).is_some_and(|t| t.value() == letter) {
            self.move_cursor(h.direction, game.board());
            return Ok(true);
        }

        let Some(id) = game.tray().find_by_value(letter, game.tiles()) else {
            log::debug!("No {} in the tray", letter);
            return Ok(false);
        };
        if let Some(previous) = existing {
            game.send_to_tray(previous)?;
        }
        game.move_tile_to(id, DropTarget::board_only(h.cell))?;

        // the placement may have shifted the board under the cursor
        if let Some(tile) = game.tile(id).filter(|t| t.owner() == Zone::Board) {
            self.focus(tile.position(), game.board());
        }
        self.move_cursor(h.direction, game.board());
        Ok(true)
    }

    /// Send the highlighted tile back to the tray and step backwards.
    pub fn backspace(&mut self, game: &mut Game) -> EngineResult<()> {
        let Some(h) = self.highlight else {
            return Ok(());
        };
        if let Some(id) = game.board().cell(h.cell) {
            game.send_to_tray(id)?;
        }
        self.move_cursor(h.direction.opposite(), game.board());
        Ok(())
    }

    /// Dispatch a key press. Returns true when the key was consumed.
    ///
    /// Keys are ignored while nothing is highlighted.
    pub fn handle_key(&mut self, game: &mut Game, key: Key, modifiers: Modifiers) -> EngineResult<bool> {
        if self.highlight.is_none() {
            return Ok(false);
        }
        match key {
            Key::Arrow(direction) if modifiers.ctrl => {
                if game.nudge(direction)? {
                    self.move_cursor(direction, game.board());
                }
            }
            Key::Arrow(direction) => self.move_cursor(direction, game.board()),
            Key::Space | Key::Shift => self.toggle_direction(),
            Key::Enter => {}
            Key::Backspace | Key::Delete => self.backspace(game)?,
            Key::Escape => self.clear(),
            Key::Letter(c) => {
                self.type_letter(game, c)?;
            }
        }
        Ok(true)
    }
}
