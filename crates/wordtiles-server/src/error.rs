//! Server error types.

use thiserror::Error;

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Dictionary error: {0}")]
    Dictionary(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server setup.
pub type ServerResult<T> = Result<T, ServerError>;
