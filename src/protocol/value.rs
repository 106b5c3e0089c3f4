//! Typed values
//!
//! Decoding of the raw key payload according to its data type tag.
//!
//! ## Supported Tags
//! - `ui8 `, `ui16`, `ui32`: big-endian unsigned integers
//! - `fpe2`: unsigned fixed point with 2 fraction bits
//! - `ch8*`: NUL-terminated string
//! - anything else: raw bytes (hex dump only)

use std::fmt;

use super::key::{pack_key, unpack_key, Key};

/// Size of the payload buffer carried by every frame
pub const PAYLOAD_SIZE: usize = 32;

/// Fraction bits of the `fpe2` type
pub const FPE2_FRACTION_BITS: u8 = 2;

// =============================================================================
// Data Types
// =============================================================================

/// Data type tag of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    UInt8,
    UInt16,
    UInt32,
    Fpe2,
    CharStar,
    /// Any tag without a dedicated decoder
    Other([u8; 4]),
}

impl DataType {
    /// The four-character tag
    pub fn tag(&self) -> [u8; 4] {
        match self {
            DataType::UInt8 => *b"ui8 ",
            DataType::UInt16 => *b"ui16",
            DataType::UInt32 => *b"ui32",
            DataType::Fpe2 => *b"fpe2",
            DataType::CharStar => *b"ch8*",
            DataType::Other(tag) => *tag,
        }
    }

    /// Map a four-character tag to its data type
    pub fn from_tag(tag: [u8; 4]) -> Self {
        match &tag {
            b"ui8 " => DataType::UInt8,
            b"ui16" => DataType::UInt16,
            b"ui32" => DataType::UInt32,
            b"fpe2" => DataType::Fpe2,
            b"ch8*" => DataType::CharStar,
            _ => DataType::Other(tag),
        }
    }

    /// Decode the packed form carried in the frame's key info
    pub fn from_u32(packed: u32) -> Self {
        Self::from_tag(unpack_key(packed))
    }

    /// Packed form carried in the frame's key info
    pub fn to_u32(self) -> u32 {
        pack_key(self.tag())
    }
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Other([0; 4])
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&Key::from_bytes(self.tag()).to_string())
    }
}

// =============================================================================
// Typed Value
// =============================================================================

/// A key value as returned by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedValue {
    /// The key this value belongs to
    pub key: Key,

    /// Number of meaningful bytes in `bytes`
    pub size: u32,

    /// Data type tag reported by the controller
    pub data_type: DataType,

    /// Full payload buffer; only the first `size` bytes are meaningful
    pub bytes: [u8; PAYLOAD_SIZE],
}

impl TypedValue {
    /// Build a value from a byte slice
    ///
    /// Bytes past the payload size are dropped.
    pub fn new(key: Key, data_type: DataType, data: &[u8]) -> Self {
        let len = data.len().min(PAYLOAD_SIZE);
        let mut bytes = [0u8; PAYLOAD_SIZE];
        bytes[..len].copy_from_slice(&data[..len]);
        Self {
            key,
            size: len as u32,
            data_type,
            bytes,
        }
    }

    /// The meaningful bytes (size clamped to the buffer)
    pub fn payload(&self) -> &[u8] {
        &self.bytes[..clamp_size(self.size)]
    }

    /// Render for display
    pub fn render(&self) -> Rendered {
        render(self)
    }
}

fn clamp_size(size: u32) -> usize {
    (size as usize).min(PAYLOAD_SIZE)
}

fn meaningful(bytes: &[u8], size: u32) -> &[u8] {
    &bytes[..(size as usize).min(bytes.len())]
}

// =============================================================================
// Decoders
// =============================================================================

/// Big-endian unsigned integer of the first `size` bytes
///
/// Sizes over eight bytes keep the low 64 bits.
pub fn decode_unsigned(bytes: &[u8], size: u32) -> u64 {
    meaningful(bytes, size)
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

/// Integer part of an unsigned fixed-point value
///
/// Every byte but the last contributes `byte << (size - 1 - i) * (8 - fraction_bits)`;
/// the last contributes `byte >> fraction_bits`. The low `fraction_bits` of the
/// last byte are dropped, so the result is the truncated integer value.
pub fn decode_fixed_point(bytes: &[u8], size: u32, fraction_bits: u8) -> u64 {
    let data = meaningful(bytes, size);
    let Some((&last, head)) = data.split_last() else {
        return 0;
    };

    let fraction_bits = u32::from(fraction_bits.min(7));
    let whole_bits = 8 - fraction_bits;

    let high = head.iter().enumerate().fold(0u64, |acc, (i, &b)| {
        let shift = (data.len() - 1 - i) as u32 * whole_bits;
        acc.wrapping_add(u64::from(b).checked_shl(shift).unwrap_or(0))
    });

    high.wrapping_add(u64::from(last >> fraction_bits))
}

/// Exact value of an unsigned fixed-point number, fraction included
pub fn decode_fixed_point_exact(bytes: &[u8], size: u32, fraction_bits: u8) -> f64 {
    let raw = meaningful(bytes, size)
        .iter()
        .fold(0f64, |acc, &b| acc * 256.0 + f64::from(b));
    raw / f64::from(1u32 << fraction_bits.min(31))
}

/// Text up to the first NUL or `size`, whichever comes first
pub fn decode_cstring(bytes: &[u8], size: u32) -> String {
    let data = meaningful(bytes, size);
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}

// =============================================================================
// Rendering
// =============================================================================

/// Decoded form of a value
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The controller reported a zero-length value
    NoData,
    Unsigned(u64),
    /// Truncated integer part of a fixed-point value
    FixedPoint(u64),
    Text(String),
    /// No decoder for this tag; only the hex dump applies
    Raw,
}

/// A value ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub key: Key,
    pub data_type: DataType,
    pub decoded: Decoded,
    /// Meaningful bytes as lowercase hex pairs
    pub hex: Vec<String>,
}

/// Decode a value according to its data type
pub fn render(value: &TypedValue) -> Rendered {
    let decoded = if value.size == 0 {
        Decoded::NoData
    } else {
        match value.data_type {
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 => {
                Decoded::Unsigned(decode_unsigned(&value.bytes, value.size))
            }
            DataType::Fpe2 => Decoded::FixedPoint(decode_fixed_point(
                &value.bytes,
                value.size,
                FPE2_FRACTION_BITS,
            )),
            DataType::CharStar => Decoded::Text(decode_cstring(&value.bytes, value.size)),
            DataType::Other(_) => Decoded::Raw,
        }
    };

    let hex = if value.size == 0 {
        Vec::new()
    } else {
        value.payload().iter().map(|b| format!("{:02x}", b)).collect()
    };

    Rendered {
        key: value.key,
        data_type: value.data_type,
        decoded,
        hex,
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}  [{:<4}]  ", self.key, self.data_type)?;

        match &self.decoded {
            Decoded::NoData => return write!(f, "no data"),
            Decoded::Unsigned(n) | Decoded::FixedPoint(n) => write!(f, "{} ", n)?,
            Decoded::Text(s) => write!(f, "{} ", s)?,
            Decoded::Raw => {}
        }

        write!(f, "(bytes")?;
        for pair in &self.hex {
            write!(f, " {}", pair)?;
        }
        write!(f, ")")
    }
}
