//! Key enumeration
//!
//! Walks the controller's key table by index and reads every key.

use std::fmt;

use crate::client::SmcClient;
use crate::error::{Result, SmcError};
use crate::protocol::{Key, TypedValue};
use crate::transport::SmcTransport;

/// An index that could not be resolved or read
#[derive(Debug)]
pub struct SkippedIndex {
    pub index: u32,
    /// The key at this index, when the index lookup succeeded
    pub key: Option<Key>,
    pub error: SmcError,
}

/// Result of a full key dump
#[derive(Debug, Default)]
pub struct KeyListing {
    /// Values in ascending index order
    pub values: Vec<TypedValue>,

    /// Indices left out of `values`
    pub skipped: Vec<SkippedIndex>,
}

impl fmt::Display for KeyListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in &self.values {
            writeln!(f, "{}", value.render())?;
        }
        Ok(())
    }
}

impl<T: SmcTransport> SmcClient<T> {
    /// Number of keys in the controller's table
    ///
    /// Only the low 16 bits of `#KEY` are used: byte 2 is the high byte and
    /// byte 3 the low byte; bytes 0 and 1 are ignored.
    pub fn key_count(&mut self) -> Result<u32> {
        let value = self.read_key(Key::KEY_COUNT)?;
        let b = value.bytes;
        tracing::debug!(
            "Key count: b0={:x} b1={:x} b2={:x} b3={:x} size={}",
            b[0],
            b[1],
            b[2],
            b[3],
            value.size
        );
        Ok((u32::from(b[2]) << 8) | u32::from(b[3]))
    }

    /// Read every key in the table
    ///
    /// A failure at one index is recorded in [`KeyListing::skipped`] and the
    /// walk continues with the next index.
    pub fn enumerate_all(&mut self) -> Result<KeyListing> {
        let count = self.key_count()?;
        let mut listing = KeyListing::default();

        for index in 0..count {
            let key = match self.read_by_index(index) {
                Ok(key) => key,
                Err(error) => {
                    tracing::warn!("Skipping key index {}: {}", index, error);
                    listing.skipped.push(SkippedIndex {
                        index,
                        key: None,
                        error,
                    });
                    continue;
                }
            };

            match self.read_key(key) {
                Ok(value) => listing.values.push(value),
                Err(error) => {
                    tracing::warn!("Skipping key {} at index {}: {}", key, index, error);
                    listing.skipped.push(SkippedIndex {
                        index,
                        key: Some(key),
                        error,
                    });
                }
            }
        }

        Ok(listing)
    }
}
