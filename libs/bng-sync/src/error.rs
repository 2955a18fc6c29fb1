//! Error types for bng-sync

use bng_codec::BngError;
use thiserror::Error;

/// Sync function errors
#[derive(Debug, Error)]
pub enum SyncError {
    /// Source value could not be converted; nothing was written
    #[error("Conversion failed: {0}")]
    Conversion(#[from] BngError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tile store error: {0}")]
    Store(String),
}

impl SyncError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
