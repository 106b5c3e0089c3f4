//! # smcutil
//!
//! Reader/writer for the Apple System Management Controller (SMC):
//! - Four-character key packing and typed value decoding
//! - Two-phase key read (info, then bytes) and read-then-write key updates
//! - Full key table enumeration by index
//! - Decoded fan report built from well-known fan keys
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     smc-util (CLI)                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Enumeration │          │ Fan Report  │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 SmcClient (transactions)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  80-byte frames
//!                       ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │            SmcTransport (IOKit / simulated)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transport;
pub mod client;
pub mod enumerate;
pub mod fans;
pub mod cli;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SmcError, Result};
pub use config::Config;
pub use client::SmcClient;
pub use protocol::{DataType, Key, TypedValue};
pub use transport::{SmcTransport, TransportError};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of smcutil
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
