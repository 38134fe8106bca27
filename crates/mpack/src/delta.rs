//! §4.5: delta differencing plus run-length encoding for integer vectors,
//! grounded on `messagepack/deltacoding.go`. Differencing removes the
//! correlation a slowly-varying signal has between samples; RLE then
//! collapses repeated values (particularly common after differencing a
//! flat signal) into `[value, count]` pairs once a run reaches
//! `rle_threshold`.

use bytes::Buf;
use tracing::debug;

use pwcode::Error;

use crate::primitive::{
    peek_is_arr, read_array_header, read_array_header_peeked, read_int_peeked, write_array_header,
    write_int,
};

/// Reads one RLE-encoded integer array and re-serializes it into its own
/// freshly-written buffer, without resolving runs to literal values. Used
/// when a larger structure embeds one of these arrays as a raw value
/// (`metricarr`'s descriptors do) and needs its exact byte span without
/// decoding it yet.
pub fn reencode_rle_array(buf: &mut impl Buf) -> Result<Vec<u8>, Error> {
    let n = read_array_header(buf)?;
    let mut out = Vec::new();
    write_array_header(&mut out, n);
    for _ in 0..n {
        if peek_is_arr(&*buf)? {
            let pair_len = read_array_header_peeked(buf)?;
            if pair_len != 2 {
                return Err(malformed_rle(format!(
                    "run entry has array length {pair_len}, expected 2"
                )));
            }
            let value = read_int_peeked(buf)?;
            let count = read_int_peeked(buf)?;
            write_array_header(&mut out, 2);
            write_int(&mut out, value);
            write_int(&mut out, count);
        } else {
            let value = read_int_peeked(buf)?;
            write_int(&mut out, value);
        }
    }
    Ok(out)
}

fn malformed_rle(reason: impl Into<String>) -> Error {
    Error::MalformedRle {
        reason: reason.into(),
    }
}

/// First-difference a sequence. `result[0]` is the original first value (an
/// absolute anchor, not a difference); every later slot is `v[i] - v[i-1]`.
pub fn delta_vec(values: &[i64]) -> Vec<i64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut result = Vec::with_capacity(values.len());
    let mut previous = values[0];
    for &v in values {
        result.push(v - previous);
        previous = v;
    }
    result[0] = values[0];
    result
}

/// Inverse of `delta_vec`: running sum starting from the anchor.
pub fn undelta_vec(values: &[i64]) -> Vec<i64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut result = Vec::with_capacity(values.len());
    result.push(values[0]);
    for i in 1..values.len() {
        result.push(result[i - 1] + values[i]);
    }
    result
}

/// Applies 0, 1, or 2 rounds of `delta_vec`. Higher orders are rejected —
/// the format has no header bit to record them and round-tripping accuracy
/// degrades fast past second order.
pub fn apply_delta_passes(values: &[i64], passes: u32) -> Result<Vec<i64>, Error> {
    if passes > 2 {
        return Err(Error::UnsupportedDelta(passes));
    }
    let mut working = values.to_vec();
    for _ in 0..passes {
        working = delta_vec(&working);
    }
    Ok(working)
}

/// Inverse of `apply_delta_passes`.
pub fn undo_delta_passes(values: &[i64], passes: u32) -> Result<Vec<i64>, Error> {
    if passes > 2 {
        return Err(Error::UnsupportedDelta(passes));
    }
    let mut working = values.to_vec();
    for _ in 0..passes {
        working = undelta_vec(&working);
    }
    Ok(working)
}

/// Writes one run: a `[value, count]` pair once `count >= rle_threshold`
/// (and the threshold is enabled, i.e. positive), otherwise `count` literal
/// repeats of `value`. Returns how many top-level array items were written.
fn write_run(out: &mut Vec<u8>, value: i64, count: i64, rle_threshold: i64) -> u32 {
    if rle_threshold > 0 && count >= rle_threshold {
        write_array_header(out, 2);
        write_int(out, value);
        write_int(out, count);
        1
    } else {
        for _ in 0..count {
            write_int(out, value);
        }
        count as u32
    }
}

/// Encodes a (possibly delta-transformed) integer vector as a MessagePack
/// array mixing literal ints and `[value, count]` runs.
pub fn encode_rle(values: &[i64], rle_threshold: i64) -> Vec<u8> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut body = Vec::new();
    let mut item_count = 0u32;
    let mut run_len = 0i64;
    let mut previous = values[0];
    for &v in values {
        if v == previous {
            run_len += 1;
        } else {
            item_count += write_run(&mut body, previous, run_len, rle_threshold);
            run_len = 1;
        }
        previous = v;
    }
    item_count += write_run(&mut body, previous, run_len, rle_threshold);

    let mut out = Vec::with_capacity(body.len() + 5);
    write_array_header(&mut out, item_count);
    out.extend_from_slice(&body);
    debug!(items = item_count, input_len = values.len(), "encoded RLE vector");
    out
}

/// Inverse of `encode_rle`.
pub fn decode_rle(bytes: &[u8]) -> Result<Vec<i64>, Error> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let mut buf: &[u8] = bytes;
    let item_count = read_array_header(&mut buf)?;
    let mut result = Vec::new();
    for _ in 0..item_count {
        if peek_is_arr(&buf)? {
            let n = read_array_header_peeked(&mut buf)?;
            if n != 2 {
                return Err(malformed_rle(format!("run entry has array length {n}, expected 2")));
            }
            let value = read_int_peeked(&mut buf)?;
            let repeats = read_int_peeked(&mut buf)?;
            if repeats < 0 {
                return Err(malformed_rle(format!("negative run length {repeats}")));
            }
            result.extend(std::iter::repeat(value).take(repeats as usize));
        } else {
            result.push(read_int_peeked(&mut buf)?);
        }
    }
    if buf.remaining() != 0 {
        return Err(malformed_rle(format!(
            "{} trailing bytes after declared item count",
            buf.remaining()
        )));
    }
    Ok(result)
}

/// Full round trip: delta-transform then RLE-encode.
pub fn encode_delta_rle(values: &[i64], delta_passes: u32, rle_threshold: i64) -> Result<Vec<u8>, Error> {
    let transformed = apply_delta_passes(values, delta_passes)?;
    Ok(encode_rle(&transformed, rle_threshold))
}

/// Full round trip: RLE-decode then undo the delta transform.
pub fn decode_delta_rle(bytes: &[u8], delta_passes: u32) -> Result<Vec<i64>, Error> {
    let values = decode_rle(bytes)?;
    undo_delta_passes(&values, delta_passes)
}
