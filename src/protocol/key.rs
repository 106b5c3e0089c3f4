//! Key identifiers
//!
//! An SMC key is four bytes packed big-endian into a `u32`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SmcError};

/// Number of bytes in a key
pub const KEY_LEN: usize = 4;

/// Pack four key bytes into their numeric identifier
///
/// Byte `i` lands at bits `(3 - i) * 8`.
pub fn pack_key(bytes: [u8; KEY_LEN]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Unpack a numeric identifier back into its four key bytes
pub fn unpack_key(id: u32) -> [u8; KEY_LEN] {
    id.to_be_bytes()
}

/// A four-byte SMC key such as `FNum` or `#KEY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    /// Key count of the controller's key table
    pub const KEY_COUNT: Key = Key(*b"#KEY");

    /// Number of fans
    pub const FAN_COUNT: Key = Key(*b"FNum");

    /// Per-fan forced-mode bitmask
    pub const FAN_MODE: Key = Key(*b"FS! ");

    /// Build a key from raw bytes
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a key from its packed identifier
    pub fn from_u32(id: u32) -> Self {
        Self(unpack_key(id))
    }

    /// Parse key text
    ///
    /// Text shorter than four bytes is padded with NUL bytes.
    pub fn new(text: &str) -> Result<Self> {
        let raw = text.as_bytes();
        if raw.is_empty() || raw.len() > KEY_LEN {
            return Err(SmcError::InvalidKey(text.to_string()));
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    /// Key made of the first four bytes of `text`
    ///
    /// Shorter text is padded with NUL bytes; longer text is cut.
    pub fn from_prefix(text: &str) -> Self {
        let raw = text.as_bytes();
        let len = raw.len().min(KEY_LEN);

        let mut bytes = [0u8; KEY_LEN];
        bytes[..len].copy_from_slice(&raw[..len]);
        Self(bytes)
    }

    /// The packed identifier sent to the controller
    pub fn to_u32(self) -> u32 {
        pack_key(self.0)
    }

    /// The raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl FromStr for Key {
    type Err = SmcError;

    fn from_str(s: &str) -> Result<Self> {
        Key::new(s)
    }
}

impl From<u32> for Key {
    fn from(id: u32) -> Self {
        Key::from_u32(id)
    }
}

impl fmt::Display for Key {
    /// Bytes are shown as Latin-1 characters up to the first NUL
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: String = self
            .0
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect();
        f.pad(&text)
    }
}
