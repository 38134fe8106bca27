//! The small, closed tagged union that crosses the `RecordShape` boundary.
//!
//! Field codecs only ever operate on `f64`; everything else is normalized
//! to that on the way in (`Value::as_f64`) and reconstructed on the way out
//! by the `RecordShape` implementation generated by `pwcode-derive`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    F64(f64),
    I64(i64),
    U64(u64),
    Bool(bool),
    Str(String),
    /// Unix milliseconds.
    Time(i64),
}

impl Value {
    /// Normalize to the real-valued representation the field codec consumes.
    ///
    /// `Str` has no numeric representation (enum strings are resolved
    /// against the field's enum table instead, see `FieldCoding::encode_enum`)
    /// and normalizes to `NaN`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::F64(v) => *v,
            Value::I64(v) => *v as f64,
            Value::U64(v) => *v as f64,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Time(ms) => *ms as f64,
            Value::Str(_) => f64::NAN,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// The record field's declared Rust type, as reported by `RecordShape::fields()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Bool,
    String,
    Time,
}
