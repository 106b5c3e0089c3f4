//! Transaction frame
//!
//! Encoding and decoding of the fixed-size structure exchanged with the
//! controller. Request and response share the same layout; all multi-byte
//! fields are in host byte order.
//!
//! ## Layout (80 bytes)
//! ```text
//! ┌─────────┬──────────┬───────────┬──────────────────────┬─────┐
//! │ key (4) │ vers (6) │ pad (2)   │ power limits (16)    │     │
//! ├─────────┴──────────┴───────────┴──────────────────────┘     │
//! │ 28: size (4) │ 32: type (4) │ 36: attr (1) │ pad (3)        │
//! │ 40: result (1) │ 41: status (1) │ 42: command (1) │ pad (1) │
//! │ 44: index (4)                                               │
//! │ 48: payload (32)                                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use super::command::Command;
use super::value::PAYLOAD_SIZE;

/// Total frame size
pub const FRAME_SIZE: usize = 80;

// -----------------------------------------------------------------------------
// Field offsets
// -----------------------------------------------------------------------------
pub const OFFSET_KEY: usize = 0;
pub const OFFSET_DATA_SIZE: usize = 28;
pub const OFFSET_DATA_TYPE: usize = 32;
pub const OFFSET_DATA_ATTRIBUTES: usize = 36;
pub const OFFSET_RESULT: usize = 40;
pub const OFFSET_STATUS: usize = 41;
pub const OFFSET_COMMAND: usize = 42;
pub const OFFSET_INDEX: usize = 44;
pub const OFFSET_PAYLOAD: usize = 48;

// -----------------------------------------------------------------------------
// Controller result codes
// -----------------------------------------------------------------------------
pub const RESULT_SUCCESS: u8 = 0x00;
pub const RESULT_KEY_NOT_FOUND: u8 = 0x84;

/// An encoded frame
pub type FrameBytes = [u8; FRAME_SIZE];

/// Size and type of a key as reported by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyInfo {
    pub size: u32,
    /// Packed data type tag
    pub data_type: u32,
    pub attributes: u8,
}

/// A decoded transaction frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFrame {
    pub key: u32,
    pub key_info: KeyInfo,
    pub result: u8,
    pub status: u8,
    pub command: u8,
    pub index: u32,
    pub payload: [u8; PAYLOAD_SIZE],
}

impl Default for KeyFrame {
    fn default() -> Self {
        Self {
            key: 0,
            key_info: KeyInfo::default(),
            result: 0,
            status: 0,
            command: 0,
            index: 0,
            payload: [0; PAYLOAD_SIZE],
        }
    }
}

impl KeyFrame {
    /// A zeroed request for the given command
    pub fn request(command: Command) -> Self {
        Self {
            command: command as u8,
            ..Self::default()
        }
    }

    /// The command byte, if it names a known command
    pub fn command(&self) -> Option<Command> {
        Command::from_u8(self.command)
    }

    /// Encode to the wire layout
    ///
    /// Reserved and padding bytes are always zero.
    pub fn encode(&self) -> FrameBytes {
        let mut buf = [0u8; FRAME_SIZE];
        put_u32(&mut buf, OFFSET_KEY, self.key);
        put_u32(&mut buf, OFFSET_DATA_SIZE, self.key_info.size);
        put_u32(&mut buf, OFFSET_DATA_TYPE, self.key_info.data_type);
        buf[OFFSET_DATA_ATTRIBUTES] = self.key_info.attributes;
        buf[OFFSET_RESULT] = self.result;
        buf[OFFSET_STATUS] = self.status;
        buf[OFFSET_COMMAND] = self.command;
        put_u32(&mut buf, OFFSET_INDEX, self.index);
        buf[OFFSET_PAYLOAD..OFFSET_PAYLOAD + PAYLOAD_SIZE].copy_from_slice(&self.payload);
        buf
    }

    /// Decode from the wire layout
    pub fn decode(buf: &FrameBytes) -> Self {
        let mut payload = [0u8; PAYLOAD_SIZE];
        payload.copy_from_slice(&buf[OFFSET_PAYLOAD..OFFSET_PAYLOAD + PAYLOAD_SIZE]);

        Self {
            key: get_u32(buf, OFFSET_KEY),
            key_info: KeyInfo {
                size: get_u32(buf, OFFSET_DATA_SIZE),
                data_type: get_u32(buf, OFFSET_DATA_TYPE),
                attributes: buf[OFFSET_DATA_ATTRIBUTES],
            },
            result: buf[OFFSET_RESULT],
            status: buf[OFFSET_STATUS],
            command: buf[OFFSET_COMMAND],
            index: get_u32(buf, OFFSET_INDEX),
            payload,
        }
    }
}

fn put_u32(buf: &mut FrameBytes, offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
}

fn get_u32(buf: &FrameBytes, offset: usize) -> u32 {
    u32::from_ne_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}
