//! Error types for engine operations.

use crate::geometry::Coord;
use crate::tile::TileId;
use thiserror::Error;

/// Errors raised by the placement engine and its adapters.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown tile: {0}")]
    UnknownTile(TileId),
    #[error("Cell out of bounds: {0}")]
    OutOfBounds(Coord),
    #[error("Cell already occupied: {0}")]
    CellOccupied(Coord),
    #[error("Protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
    #[error("No active round")]
    NoActiveRound,
    #[error("Config error: {0}")]
    Config(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
