//! Engine configuration.

use crate::error::{EngineError, EngineResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest board side that leaves an interior cell.
pub const MIN_BOARD_SIDE: usize = 3;

/// Board, tray and layout settings for a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board_width: usize,
    pub board_height: usize,
    /// Grow the board on edge placements instead of shifting it.
    pub board_expands: bool,
    /// Cells shown in the tray row before it starts growing.
    pub tray_slots: usize,
    /// Side of one cell in logical pixels.
    pub cell_size: f64,
    pub board_origin: Point,
    pub tray_origin: Point,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_width: 12,
            board_height: 12,
            board_expands: false,
            tray_slots: 12,
            cell_size: 64.0,
            board_origin: Point::new(10.0, 10.0),
            tray_origin: Point::new(10.0, 830.0),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject boards below the minimum size and non-positive cell sizes.
    pub fn validate(&self) -> EngineResult<()> {
        if self.board_width < MIN_BOARD_SIDE || self.board_height < MIN_BOARD_SIDE {
            return Err(EngineError::Config(format!(
                "board must be at least {MIN_BOARD_SIDE}x{MIN_BOARD_SIDE}, got {}x{}",
                self.board_width, self.board_height
            )));
        }
        if self.cell_size.is_nan() || self.cell_size <= 0.0 {
            return Err(EngineError::Config(format!("cell size must be positive, got {}", self.cell_size)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.board_width, 12);
        assert!(!config.board_expands);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json(r#"{"board_width": 20, "board_expands": true}"#).unwrap();
        assert_eq!(config.board_width, 20);
        assert_eq!(config.board_height, 12);
        assert!(config.board_expands);
    }

    #[test]
    fn test_rejects_tiny_board() {
        let err = EngineConfig::from_json(r#"{"board_height": 2}"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        assert!(EngineConfig::from_json(r#"{"cell_size": 0.0}"#).is_err());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tray_slots": 7, "cell_size": 32.0}}"#).unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.tray_slots, 7);
        assert!((config.cell_size - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
