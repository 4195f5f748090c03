//! Binary codec
//!
//! Fields are written in schema order with no tags:
//!
//! | type             | encoding                                        |
//! |------------------|-------------------------------------------------|
//! | int32 / float32  | 4 bytes little-endian                           |
//! | int64 / float64  | 8 bytes little-endian                           |
//! | timestamp-millis | 8 bytes little-endian (int64 milliseconds)      |
//! | boolean          | 1 byte, 0 or 1                                  |
//! | string           | zig-zag varint byte length, then UTF-8 bytes    |
//! | array<string>    | zig-zag varint count, then each string as above |
//!
//! Optional fields carry a presence byte (0 = null, 1 = value follows).
//!
//! Because nothing is tagged, the writer's and reader's field order must
//! match exactly.

mod decoder;
mod encoder;
mod errors;
pub mod varint;

pub use decoder::decode;
pub use encoder::{encode, encode_into};
pub use errors::{CodecError, CodecResult};
