//! Protocol Module
//!
//! Key identifiers, typed values and the transaction frame exchanged with
//! the controller.
//!
//! ## Transaction Shape
//! Every operation is one call at a fixed method selector. The request and
//! response are both an 80-byte frame; the sub-operation is the frame's
//! command byte.
//!
//! ### Commands
//! - 0x05: READ_BYTES    - key + data size in, payload out
//! - 0x06: WRITE_BYTES   - key + data size + payload in
//! - 0x08: READ_INDEX    - index in, key out
//! - 0x09: READ_KEYINFO  - key in, data size + data type out
//!
//! ### Result Codes
//! - 0x00: OK
//! - 0x84: KEY_NOT_FOUND

mod command;
mod frame;
mod key;
mod value;

pub use command::Command;
pub use frame::{
    FrameBytes, KeyFrame, KeyInfo, FRAME_SIZE, OFFSET_COMMAND, OFFSET_DATA_ATTRIBUTES,
    OFFSET_DATA_SIZE, OFFSET_DATA_TYPE, OFFSET_INDEX, OFFSET_KEY, OFFSET_PAYLOAD, OFFSET_RESULT,
    OFFSET_STATUS, RESULT_KEY_NOT_FOUND, RESULT_SUCCESS,
};
pub use key::{pack_key, unpack_key, Key, KEY_LEN};
pub use value::{
    decode_cstring, decode_fixed_point, decode_fixed_point_exact, decode_unsigned, render,
    DataType, Decoded, Rendered, TypedValue, FPE2_FRACTION_BITS, PAYLOAD_SIZE,
};
