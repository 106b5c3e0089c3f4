//! Client Module
//!
//! Key transactions against the controller.
//!
//! ## Responsibilities
//! - Build zeroed request frames and issue them over the transport
//! - Reject responses the transport or controller flagged as failed
//! - Two-step key read (info, then bytes)
//! - Read-then-write key update using the controller's declared size
//! - Key lookup by table index

use crate::config::Config;
use crate::error::{Result, SmcError};
use crate::protocol::{Command, DataType, Key, KeyFrame, KeyInfo, TypedValue, RESULT_SUCCESS};
use crate::transport::{self, SmcTransport, TransportError};

/// A session with the controller
///
/// Owns the transport handle; it is released by [`SmcClient::close`] or
/// when the client is dropped.
pub struct SmcClient<T: SmcTransport> {
    /// Frame transport (holds the open handle)
    transport: T,

    /// Session configuration
    config: Config,
}

impl SmcClient<Box<dyn SmcTransport>> {
    /// Open the platform transport
    pub fn open(config: Config) -> Result<Self> {
        let transport = transport::open_platform(&config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: SmcTransport> SmcClient<T> {
    /// Wrap an already opened transport
    pub fn new(transport: T, config: Config) -> Self {
        Self { transport, config }
    }

    /// Issue one transaction
    ///
    /// The response is only returned when both the call and the controller
    /// result byte report success.
    fn call(&mut self, request: &KeyFrame) -> Result<KeyFrame> {
        tracing::trace!(
            "SMC call: command={} key={} index={}",
            request.command,
            Key::from_u32(request.key),
            request.index
        );

        let output = self
            .transport
            .call(self.config.kernel_index, &request.encode())?;
        let response = KeyFrame::decode(&output);

        if response.result != RESULT_SUCCESS {
            return Err(TransportError::Controller(response.result).into());
        }

        Ok(response)
    }

    /// Read a key's size and data type
    pub fn read_key_info(&mut self, key: Key) -> Result<KeyInfo> {
        let mut request = KeyFrame::request(Command::ReadKeyInfo);
        request.key = key.to_u32();

        let response = self.call(&request)?;
        Ok(response.key_info)
    }

    /// Read a key's value
    ///
    /// Steps:
    /// 1. Read key info (size + type)
    /// 2. Read bytes using the learned size
    /// 3. Copy the full payload buffer into the value
    ///
    /// A zero size is returned as-is.
    pub fn read_key(&mut self, key: Key) -> Result<TypedValue> {
        let info = self.read_key_info(key)?;

        let mut request = KeyFrame::request(Command::ReadBytes);
        request.key = key.to_u32();
        request.key_info.size = info.size;

        let response = self.call(&request)?;

        Ok(TypedValue {
            key,
            size: info.size,
            data_type: DataType::from_u32(info.data_type),
            bytes: response.payload,
        })
    }

    /// Write a key's value
    ///
    /// The key is read first; its declared size is what gets written. A
    /// different size on `value` is replaced by the declared one unless
    /// `strict_write_size` is set.
    pub fn write_key(&mut self, value: &TypedValue) -> Result<()> {
        let current = self.read_key(value.key)?;

        let size = if value.size != current.size {
            if self.config.strict_write_size {
                return Err(SmcError::SizeMismatch {
                    expected: current.size,
                    requested: value.size,
                });
            }
            tracing::warn!(
                "Key {} declares size {}, overriding requested size {}",
                value.key,
                current.size,
                value.size
            );
            current.size
        } else {
            value.size
        };

        let mut request = KeyFrame::request(Command::WriteBytes);
        request.key = value.key.to_u32();
        request.key_info.size = size;
        request.payload = value.bytes;

        self.call(&request)?;
        Ok(())
    }

    /// Resolve the key stored at a table index
    pub fn read_by_index(&mut self, index: u32) -> Result<Key> {
        let mut request = KeyFrame::request(Command::ReadIndex);
        request.index = index;

        let response = self.call(&request)?;
        Ok(Key::from_u32(response.key))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release the transport handle
    pub fn close(self) {
        tracing::debug!("Closing SMC session");
        drop(self.transport);
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Take back the transport
    pub fn into_transport(self) -> T {
        self.transport
    }
}
