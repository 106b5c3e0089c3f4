//! Simulated controller
//!
//! An in-memory key table that answers frames the way the SMC does.
//! Used by the test suite and benchmarks.

use std::collections::BTreeSet;

use super::{SmcTransport, TransportError, IO_RETURN_BAD_ARGUMENT, IO_RETURN_ERROR};
use crate::protocol::{
    Command, DataType, FrameBytes, Key, KeyFrame, PAYLOAD_SIZE, RESULT_KEY_NOT_FOUND,
};

/// Result byte for a write whose size differs from the key's size
pub const RESULT_SIZE_MISMATCH: u8 = 0x86;

/// Result byte for an unknown command or out-of-range index
pub const RESULT_BAD_ARGUMENT: u8 = 0x89;

#[derive(Debug, Clone)]
struct Entry {
    key: Key,
    data_type: DataType,
    size: u32,
    bytes: [u8; PAYLOAD_SIZE],
}

/// In-memory SMC
#[derive(Debug, Clone)]
pub struct SimulatedSmc {
    /// Key table in index order
    entries: Vec<Entry>,

    /// Indices whose READ_INDEX call fails at the kernel level
    failing_indices: BTreeSet<u32>,

    /// Command bytes that always fail at the kernel level
    failing_commands: BTreeSet<u8>,

    /// Selector the simulated user client answers on
    selector: u32,

    /// Total calls received
    calls: usize,
}

impl Default for SimulatedSmc {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSmc {
    /// An empty controller answering on the default selector
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            failing_indices: BTreeSet::new(),
            failing_commands: BTreeSet::new(),
            selector: 2,
            calls: 0,
        }
    }

    /// Add a key whose size is the length of `data`
    ///
    /// The key is the first four bytes of `name`, NUL padded.
    pub fn with_key(mut self, name: &str, data_type: DataType, data: &[u8]) -> Self {
        self.insert(Key::from_prefix(name), data_type, data);
        self
    }

    /// Make READ_INDEX at `index` fail
    pub fn with_failing_index(mut self, index: u32) -> Self {
        self.failing_indices.insert(index);
        self
    }

    /// Make every call carrying `command` fail
    pub fn with_failing_command(mut self, command: Command) -> Self {
        self.failing_commands.insert(command as u8);
        self
    }

    /// Answer on a different selector
    pub fn with_selector(mut self, selector: u32) -> Self {
        self.selector = selector;
        self
    }

    /// Insert or replace a key
    pub fn insert(&mut self, key: Key, data_type: DataType, data: &[u8]) {
        let len = data.len().min(PAYLOAD_SIZE);
        let mut bytes = [0u8; PAYLOAD_SIZE];
        bytes[..len].copy_from_slice(&data[..len]);

        let entry = Entry {
            key,
            data_type,
            size: len as u32,
            bytes,
        };

        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove a key; returns whether it existed
    pub fn remove(&mut self, key: Key) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != key);
        self.entries.len() != before
    }

    /// Current meaningful bytes of a key
    pub fn value(&self, key: Key) -> Option<&[u8]> {
        self.find(key).map(|e| &e.bytes[..e.size as usize])
    }

    /// Number of keys in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total calls received
    pub fn call_count(&self) -> usize {
        self.calls
    }

    fn find(&self, key: Key) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// `#KEY` if stored, otherwise a `ui32` holding the table length
    fn lookup(&self, key: Key) -> Option<Entry> {
        if let Some(entry) = self.find(key) {
            return Some(entry.clone());
        }
        if key == Key::KEY_COUNT {
            let mut bytes = [0u8; PAYLOAD_SIZE];
            bytes[..4].copy_from_slice(&(self.entries.len() as u32).to_be_bytes());
            return Some(Entry {
                key,
                data_type: DataType::UInt32,
                size: 4,
                bytes,
            });
        }
        None
    }

    fn handle(&mut self, request: KeyFrame) -> Result<KeyFrame, TransportError> {
        let mut response = KeyFrame {
            key: request.key,
            command: request.command,
            ..KeyFrame::default()
        };

        if self.failing_commands.contains(&request.command) {
            return Err(TransportError::Kernel {
                call: "IOConnectCallStructMethod",
                code: IO_RETURN_ERROR,
            });
        }

        let key = Key::from_u32(request.key);

        match request.command() {
            Some(Command::ReadKeyInfo) => match self.lookup(key) {
                Some(entry) => {
                    response.key_info.size = entry.size;
                    response.key_info.data_type = entry.data_type.to_u32();
                }
                None => response.result = RESULT_KEY_NOT_FOUND,
            },
            Some(Command::ReadBytes) => match self.lookup(key) {
                Some(entry) => {
                    response.key_info.size = entry.size;
                    response.payload = entry.bytes;
                }
                None => response.result = RESULT_KEY_NOT_FOUND,
            },
            Some(Command::WriteBytes) => {
                match self.entries.iter_mut().find(|e| e.key == key) {
                    Some(entry) if entry.size != request.key_info.size => {
                        response.result = RESULT_SIZE_MISMATCH;
                    }
                    Some(entry) => {
                        let size = (entry.size as usize).min(PAYLOAD_SIZE);
                        entry.bytes[..size].copy_from_slice(&request.payload[..size]);
                    }
                    None => response.result = RESULT_KEY_NOT_FOUND,
                }
            }
            Some(Command::ReadIndex) => {
                if self.failing_indices.contains(&request.index) {
                    return Err(TransportError::Kernel {
                        call: "IOConnectCallStructMethod",
                        code: IO_RETURN_ERROR,
                    });
                }
                match self.entries.get(request.index as usize) {
                    Some(entry) => response.key = entry.key.to_u32(),
                    None => response.result = RESULT_BAD_ARGUMENT,
                }
            }
            None => response.result = RESULT_BAD_ARGUMENT,
        }

        Ok(response)
    }
}

impl SmcTransport for SimulatedSmc {
    fn call(&mut self, selector: u32, input: &FrameBytes) -> Result<FrameBytes, TransportError> {
        self.calls += 1;

        if selector != self.selector {
            return Err(TransportError::Kernel {
                call: "IOConnectCallStructMethod",
                code: IO_RETURN_BAD_ARGUMENT,
            });
        }

        let request = KeyFrame::decode(input);
        tracing::trace!("Simulated SMC request: {:?}", request);

        self.handle(request).map(|response| response.encode())
    }
}
