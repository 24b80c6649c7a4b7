//! Error types for blocksync operations.

use std::io;

use thiserror::Error;

use crate::store::BlockKey;

/// Result type for blocksync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating, loading or aligning capture blocks.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading a capture or index file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed capture or invalid analysis window.
    #[error(transparent)]
    Capture(#[from] iqsync::Error),

    /// No capture stored under this key.
    #[error("Block not found: {0}")]
    NotFound(BlockKey),

    /// Session index could not be built.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Computation did not finish before the deadline.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Blocking worker panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Task(String),
}

impl Error {
    /// Create a catalog error with a custom message
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        Error::Catalog(msg.into())
    }
}
