//! Facade tying the codec crates together: declare a record type once with
//! `#[derive(pwcode::RecordShape)]`, then pack single samples through
//! `bitpack`'s wire formats or whole time series through `metricarr`'s
//! MessagePack container.
//!
//! This crate adds no coding logic of its own — it is the integration
//! surface tying the three codec subsystems together, so callers don't
//! have to hand-wire `RecordShape::fields()` into a `RecordCoding`
//! themselves at every call site.

pub mod container;
pub mod record;

pub use pwcode::{Error, RecordShape, Value};

pub use container::build_metric_container;
pub use record::{coding_of, pack_bytes, unpack_bytes, values_of};
