//! Command definitions
//!
//! Sub-operation codes carried in the frame's command byte.

/// Controller sub-operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Fetch the payload of a key
    ReadBytes = 5,

    /// Store a payload into a key
    WriteBytes = 6,

    /// Resolve the key at a table index
    ReadIndex = 8,

    /// Fetch size and data type of a key
    ReadKeyInfo = 9,
}

impl Command {
    /// Decode a command byte
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            5 => Some(Command::ReadBytes),
            6 => Some(Command::WriteBytes),
            8 => Some(Command::ReadIndex),
            9 => Some(Command::ReadKeyInfo),
            _ => None,
        }
    }
}
