//! §6.1: the capability trait a record type implements to expose its fields
//! to `RecordCoding`/`metricarr` without runtime reflection.
//!
//! Implement this by hand, or derive it with `#[derive(RecordShape)]` from
//! `pwcode-derive`, which is the preferred route (spec §9: "static code
//! generation from a schema").

use crate::error::Error;
use crate::field::FieldCoding;
use crate::value::{TypeTag, Value};

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_tag: TypeTag,
    pub coding: FieldCoding,
}

pub trait RecordShape {
    /// The ordered field descriptors for this record type. Order defines
    /// bit-packing order and must be stable across calls.
    fn fields() -> Vec<FieldDescriptor>
    where
        Self: Sized;

    /// Read one field's current value by name.
    fn get(&self, name: &str) -> Option<Value>;

    /// Write one field's value by name, coercing as needed
    /// (bool <-> 0/1, enum string <-> index, time <-> Unix ms). Fails with
    /// `Error::UnknownField` if `name` isn't one of this type's fields.
    fn set(&mut self, name: &str, value: Value) -> Result<(), Error>;
}
