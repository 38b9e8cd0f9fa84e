//! Server configuration from the environment.

use crate::error::{ServerError, ServerResult};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const ENV_ADDR: &str = "WORDTILES_ADDR";
pub const ENV_DICTIONARY: &str = "WORDTILES_DICTIONARY";
pub const ENV_STARTING_TILES: &str = "WORDTILES_STARTING_TILES";

/// Room joined when a client does not name one.
pub const DEFAULT_ROOM: &str = "lobby";

/// Longest board side accepted from a client.
pub const MAX_BOARD_SIDE: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Newline-separated word list.
    pub dictionary: PathBuf,
    /// Tiles dealt to each player when a round starts.
    pub starting_tiles: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8888)),
            dictionary: PathBuf::from("sowpods.txt"),
            starting_tiles: 12,
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ServerResult<Self> {
        let mut config = Self::default();
        if let Some(addr) = lookup(ENV_ADDR) {
            config.addr = addr
                .parse()
                .map_err(|e| ServerError::Config(format!("{ENV_ADDR}={addr}: {e}")))?;
        }
        if let Some(path) = lookup(ENV_DICTIONARY) {
            config.dictionary = PathBuf::from(path);
        }
        if let Some(count) = lookup(ENV_STARTING_TILES) {
            config.starting_tiles = count
                .parse()
                .map_err(|e| ServerError::Config(format!("{ENV_STARTING_TILES}={count}: {e}")))?;
            if config.starting_tiles == 0 {
                return Err(ServerError::Config(format!("{ENV_STARTING_TILES} must be positive")));
            }
        }
        Ok(config)
    }
}
