//! Wordtiles Core Library
//!
//! Placement engine for a word-tile board: the expandable board, the tray,
//! drop resolution, validity markers, keyboard typing and the client side of
//! the game protocol.

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod layout;
pub mod placement;
pub mod protocol;
pub mod session;
pub mod tile;
pub mod transport;
pub mod tray;
pub mod typing;
pub mod validity;

pub use board::{Board, BoardSnapshot};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use game::Game;
pub use geometry::{Coord, Direction};
pub use layout::{GridFrame, Layout};
pub use placement::{DropTarget, Placement, resolve};
pub use protocol::{ClientMessage, ServerMessage, Standing, Verdict};
pub use session::{Session, SessionEvent};
pub use tile::{Tile, TileData, TileId, TileSet, Zone};
pub use transport::{ConnectionState, TransportEvent, parse_server_message};
#[cfg(not(target_arch = "wasm32"))]
pub use transport::NativeWebSocket;
pub use tray::Tray;
pub use typing::{Highlight, Key, Modifiers, TypingAdapter};
pub use validity::ValidityOverlay;
