//! One record sample at a time: build the `RecordCoding` a `RecordShape`
//! type implies, then pack/unpack it through `bitpack`'s byte format.

use std::collections::HashMap;

use pwcode::{Error, RecordCoding, RecordShape, Value};

/// Builds the `RecordCoding` a `RecordShape` type declares via its field
/// descriptors. Cheap to call once and reuse across every sample of `T` —
/// `RecordCoding` is immutable and `Send + Sync` once built.
pub fn coding_of<T: RecordShape>() -> Result<RecordCoding, Error> {
    let codings = T::fields().into_iter().map(|d| d.coding).collect();
    RecordCoding::new(codings)
}

/// Snapshots every named field `coding` knows about out of `value`.
pub fn values_of<T: RecordShape>(coding: &RecordCoding, value: &T) -> HashMap<String, Value> {
    coding
        .names()
        .into_iter()
        .filter_map(|name| value.get(name).map(|v| (name.to_string(), v)))
        .collect()
}

/// Writes every field `coding` would find on `value`, in declaration
/// order, as byte-aligned bits (§4.3 Bytes format).
pub fn pack_bytes<T: RecordShape>(coding: &RecordCoding, value: &T) -> Result<Vec<u8>, Error> {
    let values = values_of(coding, value);
    bitpack::encode_bytes(coding, &values)
}

/// Inverse of `pack_bytes`: decodes the wire bytes and writes each field
/// back onto a caller-supplied `T` via `RecordShape::set`.
pub fn unpack_bytes<T: RecordShape + Default>(coding: &RecordCoding, bytes: &[u8], allow_nan: bool) -> Result<T, Error> {
    let values = bitpack::decode_bytes(coding, bytes, allow_nan)?;
    let mut out = T::default();
    for (name, value) in values {
        out.set(&name, value)?;
    }
    Ok(out)
}
