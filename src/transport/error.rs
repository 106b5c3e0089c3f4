//! Transport error types

use crate::protocol::RESULT_KEY_NOT_FOUND;

/// Errors reported by the controller transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No service matching the configured name is registered.
    #[error("no {0} service found")]
    ServiceNotFound(String),

    /// A kernel call returned a non-success status.
    #[error("{call}() = {code:08x}")]
    Kernel { call: &'static str, code: u32 },

    /// The controller answered with a non-zero result byte.
    #[error("controller result {0:#04x}")]
    Controller(u8),

    /// This platform has no controller transport.
    #[error("SMC transport is not available on this platform")]
    Unsupported,
}

impl TransportError {
    /// True when the controller reported that the key does not exist
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, TransportError::Controller(RESULT_KEY_NOT_FOUND))
    }
}
