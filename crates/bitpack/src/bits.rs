//! Raw MSB-first bit sequences, the common substrate every wire format in
//! this crate packs from or unpacks to.

/// Appends `width` bits of `value` (MSB first) to `out`.
pub fn push_bits(out: &mut Vec<bool>, value: u64, width: u32) {
    for i in (0..width).rev() {
        out.push((value >> i) & 1 == 1);
    }
}

/// Reads `width` bits (MSB first) starting at `pos`, advancing `pos`.
pub fn read_bits(bits: &[bool], pos: &mut usize, width: u32) -> u64 {
    let mut value = 0u64;
    for _ in 0..width {
        value = (value << 1) | if bits[*pos] { 1 } else { 0 };
        *pos += 1;
    }
    value
}

/// Packs a bit sequence into bytes, MSB-first within each byte. `bits.len()`
/// must already be a multiple of 8 (callers pad first).
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    debug_assert_eq!(bits.len() % 8, 0);
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0u8, |acc, &b| (acc << 1) | if b { 1 } else { 0 })
        })
        .collect()
}

/// Inverse of `bits_to_bytes`.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut out = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for i in (0..8).rev() {
            out.push((byte >> i) & 1 == 1);
        }
    }
    out
}

/// Pads `bits` with trailing `false` bits until its length is a multiple of
/// `boundary`.
pub fn pad_to(bits: &mut Vec<bool>, boundary: usize) {
    let remainder = bits.len() % boundary;
    if remainder != 0 {
        bits.extend(std::iter::repeat(false).take(boundary - remainder));
    }
}
