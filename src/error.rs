//! Error types for smcutil
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias using SmcError
pub type Result<T> = std::result::Result<T, SmcError>;

/// Unified error type for smcutil operations
#[derive(Debug, Error)]
pub enum SmcError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Transport(#[from] TransportError),

    // -------------------------------------------------------------------------
    // Key Errors
    // -------------------------------------------------------------------------
    #[error("specify a key to {0}")]
    MissingKeyArgument(&'static str),

    #[error("invalid key {0:?}: keys are at most 4 bytes")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Write Errors
    // -------------------------------------------------------------------------
    #[error("write size {requested} does not match key size {expected}")]
    SizeMismatch { expected: u32, requested: u32 },
}

impl SmcError {
    /// True when the controller reported that the key does not exist
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, SmcError::Transport(e) if e.is_key_not_found())
    }
}
