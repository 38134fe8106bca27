//! §4.3: the four wire formats a `RecordCoding`'s code sequence can be
//! packed into. All four share the same underlying bitstring; they differ
//! only in how that bitstring is grouped and padded into bytes or hex
//! digits.

use std::collections::HashMap;

use pwcode::{Error, RecordCoding, Value};
use tracing::debug;

use crate::bits::{bits_to_bytes, bytes_to_bits, pad_to, push_bits, read_bits};

fn codes_to_bits(record: &RecordCoding, codes: &[u64]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(record.total_bits() as usize);
    for (field, &code) in record.fields().iter().zip(codes) {
        push_bits(&mut bits, code, field.bits());
    }
    bits
}

fn bits_to_codes(record: &RecordCoding, bits: &[bool]) -> Vec<u64> {
    let mut pos = 0;
    record
        .fields()
        .iter()
        .map(|field| read_bits(bits, &mut pos, field.bits()))
        .collect()
}

fn drop_unwanted_missing(map: &mut HashMap<String, Value>, allow_nan: bool) {
    if allow_nan {
        return;
    }
    map.retain(|_, v| !matches!(v, Value::F64(f) if f.is_nan()));
}

/// Encode a name->value mapping to a byte-padded bitstring (§4.3 "Bytes"):
/// trailing zero bits pad to a byte boundary, MSB of each byte holds the
/// earliest bit of that byte's group.
pub fn encode_bytes(record: &RecordCoding, values: &HashMap<String, Value>) -> Result<Vec<u8>, Error> {
    let codes = record.encode_codes(values)?;
    let mut bits = codes_to_bits(record, &codes);
    pad_to(&mut bits, 8);
    let out = bits_to_bytes(&bits);
    debug!(bytes = out.len(), "packed record to Bytes format");
    Ok(out)
}

/// Decode bytes produced by `encode_bytes`. `bytes.len()` must be exactly
/// `ceil(record.total_bits() / 8)`.
pub fn decode_bytes(
    record: &RecordCoding,
    bytes: &[u8],
    allow_nan: bool,
) -> Result<HashMap<String, Value>, Error> {
    let expected = record.total_bits().div_ceil(8) as usize;
    if bytes.len() != expected {
        return Err(Error::BufferSize {
            expected,
            got: bytes.len(),
        });
    }
    let bits = bytes_to_bits(bytes);
    let codes = bits_to_codes(record, &bits[..record.total_bits() as usize]);
    let mut decoded = record.decode_codes(&codes)?;
    drop_unwanted_missing(&mut decoded, allow_nan);
    Ok(decoded)
}

/// Encode to 7-bit-payload bytes (§4.3): the bitstring is split into 7-bit
/// groups (last group zero-padded), each prefixed with a `0` bit so every
/// output byte has its MSB clear. Used for FPGA/UART lanes that reserve the
/// top bit.
pub fn encode_seven_bit(
    record: &RecordCoding,
    values: &HashMap<String, Value>,
) -> Result<Vec<u8>, Error> {
    let codes = record.encode_codes(values)?;
    let mut bits = codes_to_bits(record, &codes);
    pad_to(&mut bits, 7);
    let out = bits
        .chunks(7)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | if b { 1 } else { 0 }))
        .collect();
    debug!(groups = bits.len() / 7, "packed record to SevenBit format");
    Ok(out)
}

/// Decode 7-bit-payload bytes. Every input byte must have its MSB clear.
pub fn decode_seven_bit(
    record: &RecordCoding,
    bytes: &[u8],
    allow_nan: bool,
) -> Result<HashMap<String, Value>, Error> {
    for &byte in bytes {
        if byte & 0x80 != 0 {
            return Err(Error::MalformedBits {
                reason: format!("7-bit payload byte {byte:#04x} has MSB set"),
            });
        }
    }
    let mut bits = Vec::with_capacity(bytes.len() * 7);
    for &byte in bytes {
        for i in (0..7).rev() {
            bits.push((byte >> i) & 1 == 1);
        }
    }
    let total = record.total_bits() as usize;
    if bits.len() < total {
        return Err(Error::MalformedBits {
            reason: format!("need {total} payload bits, got {}", bits.len()),
        });
    }
    let codes = bits_to_codes(record, &bits[..total]);
    let mut decoded = record.decode_codes(&codes)?;
    drop_unwanted_missing(&mut decoded, allow_nan);
    Ok(decoded)
}

fn bits_to_hex(mut bits: Vec<bool>, nibble_boundary: bool) -> String {
    pad_to(&mut bits, if nibble_boundary { 4 } else { 8 });
    bits.chunks(4)
        .map(|chunk| {
            let v = chunk.iter().fold(0u8, |acc, &b| (acc << 1) | if b { 1 } else { 0 });
            std::char::from_digit(v as u32, 16)
                .unwrap()
                .to_ascii_uppercase()
        })
        .collect()
}

fn hex_to_bits(s: &str) -> Result<Vec<bool>, Error> {
    let mut bits = Vec::with_capacity(s.len() * 4);
    for c in s.chars() {
        let v = c.to_digit(16).ok_or_else(|| Error::MalformedBits {
            reason: format!("non-hex character {c:?}"),
        })?;
        for i in (0..4).rev() {
            bits.push((v >> i) & 1 == 1);
        }
    }
    Ok(bits)
}

/// Encode to a hex-nibble string: padded to a 4-bit boundary only, so the
/// output may have an odd number of hex characters.
pub fn encode_hex_nybble(
    record: &RecordCoding,
    values: &HashMap<String, Value>,
) -> Result<String, Error> {
    let codes = record.encode_codes(values)?;
    let bits = codes_to_bits(record, &codes);
    Ok(bits_to_hex(bits, true))
}

/// Encode to a hex string padded to a full-byte boundary (always an even
/// number of hex characters).
pub fn encode_hex(record: &RecordCoding, values: &HashMap<String, Value>) -> Result<String, Error> {
    let codes = record.encode_codes(values)?;
    let bits = codes_to_bits(record, &codes);
    Ok(bits_to_hex(bits, false))
}

pub fn decode_hex_nybble(
    record: &RecordCoding,
    hex: &str,
    allow_nan: bool,
) -> Result<HashMap<String, Value>, Error> {
    let bits = hex_to_bits(hex)?;
    let total = record.total_bits() as usize;
    if bits.len() < total {
        return Err(Error::MalformedBits {
            reason: format!("need {total} bits, hex string only carries {}", bits.len()),
        });
    }
    let codes = bits_to_codes(record, &bits[..total]);
    let mut decoded = record.decode_codes(&codes)?;
    drop_unwanted_missing(&mut decoded, allow_nan);
    Ok(decoded)
}

pub fn decode_hex(
    record: &RecordCoding,
    hex: &str,
    allow_nan: bool,
) -> Result<HashMap<String, Value>, Error> {
    decode_hex_nybble(record, hex, allow_nan)
}
