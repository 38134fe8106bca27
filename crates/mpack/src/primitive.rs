//! The subset of MessagePack this workspace needs, following
//! `messagepack/read.go` and `messagepack/write.go`'s byte-layout choices
//! but re-expressed over `bytes::{Buf, BufMut}` instead of
//! `io.Reader`/`io.Writer`.

use bytes::{Buf, BufMut};

use pwcode::Error;

fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedMsgpack {
        reason: reason.into(),
    }
}

fn ensure(buf: &impl Buf, need: usize) -> Result<(), Error> {
    if buf.remaining() < need {
        return Err(malformed(format!(
            "need {need} more bytes, have {}",
            buf.remaining()
        )));
    }
    Ok(())
}

pub fn write_nil<B: BufMut>(buf: &mut B) {
    buf.put_u8(0xc0);
}

pub fn write_bool<B: BufMut>(buf: &mut B, value: bool) {
    buf.put_u8(if value { 0xc3 } else { 0xc2 });
}

pub fn read_bool(buf: &mut impl Buf) -> Result<bool, Error> {
    ensure(buf, 1)?;
    match buf.get_u8() {
        0xc3 => Ok(true),
        0xc2 => Ok(false),
        other => Err(malformed(format!("0x{other:02x} is not a boolean"))),
    }
}

/// Smallest unsigned encoding: positive fixint, uint8/16/32/64.
pub fn write_uint<B: BufMut>(buf: &mut B, u: u64) {
    if u <= 0x7f {
        buf.put_u8(u as u8);
    } else if u <= 0xff {
        buf.put_u8(0xcc);
        buf.put_u8(u as u8);
    } else if u <= 0xffff {
        buf.put_u8(0xcd);
        buf.put_u16(u as u16);
    } else if u <= 0xffff_ffff {
        buf.put_u8(0xce);
        buf.put_u32(u as u32);
    } else {
        buf.put_u8(0xcf);
        buf.put_u64(u);
    }
}

/// Smallest signed encoding; non-negative values always go through
/// `write_uint` for tighter compression.
pub fn write_int<B: BufMut>(buf: &mut B, i: i64) {
    if i >= 0 {
        write_uint(buf, i as u64);
        return;
    }
    if i >= -32 {
        buf.put_i8(i as i8);
    } else if i >= i8::MIN as i64 {
        buf.put_u8(0xd0);
        buf.put_i8(i as i8);
    } else if i >= i16::MIN as i64 {
        buf.put_u8(0xd1);
        buf.put_i16(i as i16);
    } else if i >= i32::MIN as i64 {
        buf.put_u8(0xd2);
        buf.put_i32(i as i32);
    } else {
        buf.put_u8(0xd3);
        buf.put_i64(i);
    }
}

pub fn read_int(buf: &mut impl Buf) -> Result<i64, Error> {
    ensure(buf, 1)?;
    let first = buf.get_u8();
    read_int_with_first(buf, first)
}

fn read_int_with_first(buf: &mut impl Buf, first: u8) -> Result<i64, Error> {
    if first & 0x80 == 0 {
        return Ok(first as i64); // positive fixint
    }
    if first & 0xe0 == 0xe0 {
        return Ok(first as i8 as i64); // negative fixint
    }
    match first {
        0xcc => {
            ensure(buf, 1)?;
            Ok(buf.get_u8() as i64)
        }
        0xcd => {
            ensure(buf, 2)?;
            Ok(buf.get_u16() as i64)
        }
        0xce => {
            ensure(buf, 4)?;
            Ok(buf.get_u32() as i64)
        }
        0xcf => {
            ensure(buf, 8)?;
            Ok(buf.get_u64() as i64)
        }
        0xd0 => {
            ensure(buf, 1)?;
            Ok(buf.get_i8() as i64)
        }
        0xd1 => {
            ensure(buf, 2)?;
            Ok(buf.get_i16() as i64)
        }
        0xd2 => {
            ensure(buf, 4)?;
            Ok(buf.get_i32() as i64)
        }
        0xd3 => {
            ensure(buf, 8)?;
            Ok(buf.get_i64())
        }
        other => Err(malformed(format!("0x{other:02x} is not an int"))),
    }
}

fn write_float32<B: BufMut>(buf: &mut B, f: f32) {
    buf.put_u8(0xca);
    buf.put_f32(f);
}

fn write_float64<B: BufMut>(buf: &mut B, f: f64) {
    buf.put_u8(0xcb);
    buf.put_f64(f);
}

/// §4.4 numeric writer policy: exact integers use the smallest int form;
/// otherwise float32 if it round-trips within `max_err`, else float64.
pub fn write_number<B: BufMut>(buf: &mut B, f: f64, max_err: f64) {
    let i = f as i64;
    if i as f64 == f {
        write_int(buf, i);
        return;
    }
    let f32v = f as f32;
    if (f32v as f64 - f).abs() < max_err {
        write_float32(buf, f32v);
    } else {
        write_float64(buf, f);
    }
}

pub fn read_number(buf: &mut impl Buf) -> Result<f64, Error> {
    ensure(buf, 1)?;
    let first = buf.get_u8();
    read_number_with_first(buf, first)
}

fn read_number_with_first(buf: &mut impl Buf, first: u8) -> Result<f64, Error> {
    match first {
        0xcb => {
            ensure(buf, 8)?;
            Ok(buf.get_f64())
        }
        0xca => {
            ensure(buf, 4)?;
            Ok(buf.get_f32() as f64)
        }
        _ => Ok(read_int_with_first(buf, first)? as f64),
    }
}

pub fn write_string<B: BufMut>(buf: &mut B, s: &str) {
    let bytes = s.as_bytes();
    let n = bytes.len();
    if n <= 0x1f {
        buf.put_u8(0xa0 | n as u8);
    } else if n <= 0xff {
        buf.put_u8(0xd9);
        buf.put_u8(n as u8);
    } else if n <= 0xffff {
        buf.put_u8(0xda);
        buf.put_u16(n as u16);
    } else {
        buf.put_u8(0xdb);
        buf.put_u32(n as u32);
    }
    buf.put_slice(bytes);
}

pub fn read_string(buf: &mut impl Buf) -> Result<String, Error> {
    ensure(buf, 1)?;
    let first = buf.get_u8();
    if first == 0xc0 {
        return Ok(String::new());
    }
    let n: usize = if first & 0xe0 == 0xa0 {
        (first & 0x1f) as usize
    } else {
        match first {
            0xd9 => {
                ensure(buf, 1)?;
                buf.get_u8() as usize
            }
            0xda => {
                ensure(buf, 2)?;
                buf.get_u16() as usize
            }
            0xdb => {
                ensure(buf, 4)?;
                buf.get_u32() as usize
            }
            other => return Err(malformed(format!("0x{other:02x} is not a string"))),
        }
    };
    ensure(buf, n)?;
    let mut data = vec![0u8; n];
    buf.copy_to_slice(&mut data);
    String::from_utf8(data).map_err(|e| malformed(e.to_string()))
}

pub fn is_arr(first: u8) -> bool {
    first & 0xf0 == 0x90 || first == 0xdc || first == 0xdd
}

pub fn write_array_header<B: BufMut>(buf: &mut B, n: u32) {
    if n <= 0x0f {
        buf.put_u8(0x90 | n as u8);
    } else if n <= 0xffff {
        buf.put_u8(0xdc);
        buf.put_u16(n as u16);
    } else {
        buf.put_u8(0xdd);
        buf.put_u32(n);
    }
}

pub fn read_array_header(buf: &mut impl Buf) -> Result<u32, Error> {
    ensure(buf, 1)?;
    let first = buf.get_u8();
    read_array_header_with_first(buf, first)
}

fn read_array_header_with_first(buf: &mut impl Buf, first: u8) -> Result<u32, Error> {
    if first == 0xc0 {
        return Ok(0);
    }
    if !is_arr(first) {
        return Err(malformed(format!("0x{first:02x} is not an array")));
    }
    if first & 0xf0 == 0x90 {
        return Ok((first & 0x0f) as u32);
    }
    if first == 0xdc {
        ensure(buf, 2)?;
        return Ok(buf.get_u16() as u32);
    }
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

pub fn is_fixmap(first: u8) -> bool {
    first & 0xf0 == 0x80 || first == 0xde || first == 0xdf
}

pub fn write_map_header<B: BufMut>(buf: &mut B, n: u32) {
    if n <= 0x0f {
        buf.put_u8(0x80 | n as u8);
    } else if n <= 0xffff {
        buf.put_u8(0xde);
        buf.put_u16(n as u16);
    } else {
        buf.put_u8(0xdf);
        buf.put_u32(n);
    }
}

pub fn read_map_header(buf: &mut impl Buf) -> Result<u32, Error> {
    ensure(buf, 1)?;
    let first = buf.get_u8();
    if first == 0xc0 {
        return Ok(0);
    }
    if !is_fixmap(first) {
        return Err(malformed(format!("0x{first:02x} is not a map")));
    }
    if first & 0xf0 == 0x80 {
        return Ok((first & 0x0f) as u32);
    }
    if first == 0xde {
        ensure(buf, 2)?;
        return Ok(buf.get_u16() as u32);
    }
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

pub fn write_bin<B: BufMut>(buf: &mut B, data: &[u8]) {
    let n = data.len();
    if n <= 0xff {
        buf.put_u8(0xc4);
        buf.put_u8(n as u8);
    } else if n <= 0xffff {
        buf.put_u8(0xc5);
        buf.put_u16(n as u16);
    } else {
        buf.put_u8(0xc6);
        buf.put_u32(n as u32);
    }
    buf.put_slice(data);
}

pub fn read_bin(buf: &mut impl Buf) -> Result<Vec<u8>, Error> {
    ensure(buf, 1)?;
    let first = buf.get_u8();
    let n: usize = match first {
        0xc4 => {
            ensure(buf, 1)?;
            buf.get_u8() as usize
        }
        0xc5 => {
            ensure(buf, 2)?;
            buf.get_u16() as usize
        }
        0xc6 => {
            ensure(buf, 4)?;
            buf.get_u32() as usize
        }
        other => return Err(malformed(format!("0x{other:02x} is not bin"))),
    };
    ensure(buf, n)?;
    let mut data = vec![0u8; n];
    buf.copy_to_slice(&mut data);
    Ok(data)
}

pub(crate) fn peek_is_arr(buf: &impl Buf) -> Result<bool, Error> {
    ensure(buf, 1)?;
    Ok(is_arr(buf.chunk()[0]))
}

pub(crate) fn read_array_header_peeked(buf: &mut impl Buf) -> Result<u32, Error> {
    ensure(buf, 1)?;
    let first = buf.get_u8();
    read_array_header_with_first(buf, first)
}

pub(crate) fn read_int_peeked(buf: &mut impl Buf) -> Result<i64, Error> {
    ensure(buf, 1)?;
    let first = buf.get_u8();
    read_int_with_first(buf, first)
}
