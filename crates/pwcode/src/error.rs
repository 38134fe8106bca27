use thiserror::Error;

/// Unified error taxonomy for the whole workspace.
///
/// `bitpack`, `mpack`, and `metricarr` all reuse this type (wrapping their
/// own lower-level situations into one of these variants) so a caller
/// catches one error type regardless of which layer raised it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("config invalid on field {field}: {reason}")]
    ConfigInvalid { field: String, reason: String },

    #[error("unsupported type on field {field}: {type_name}")]
    UnknownType { field: String, type_name: String },

    #[error("unknown enum value {value:?} on field {field}")]
    UnknownEnumValue { field: String, value: String },

    #[error("enum code {code} out of range on field {field}")]
    EnumOutOfRange { field: String, code: u64 },

    #[error("const mismatch on field {field}: got {got}, want {want}")]
    ConstMismatch { field: String, got: f64, want: f64 },

    #[error("buffer size mismatch: expected {expected} bytes, got {got}")]
    BufferSize { expected: usize, got: usize },

    #[error("malformed bits: {reason}")]
    MalformedBits { reason: String },

    #[error("malformed messagepack: {reason}")]
    MalformedMsgpack { reason: String },

    #[error("malformed RLE data: {reason}")]
    MalformedRle { reason: String },

    #[error("code {code} out of range on field {field} (max {max})")]
    OutOfRange { field: String, code: u64, max: u64 },

    #[error("unsupported delta pass count {0} (max 2)")]
    UnsupportedDelta(u32),

    #[error("unknown field name {0:?}")]
    UnknownField(String),
}
