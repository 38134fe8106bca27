//! Packs a `pwcode::RecordCoding`'s code sequence into the wire formats a
//! downstream transport actually carries, and unpacks them back.

mod bits;
mod format;

pub use format::{
    decode_bytes, decode_hex, decode_hex_nybble, decode_seven_bit, encode_bytes, encode_hex,
    encode_hex_nybble, encode_seven_bit,
};
