//! Piecewise-linear quantization codec: the arithmetic heart of the
//! telemetry wire format. Maps real values through a user-declared step
//! schedule to minimum-bit-width unsigned codes, and back.

pub mod error;
pub mod field;
pub mod record;
pub mod shape;
pub mod step;
pub mod time;
pub mod value;

pub use error::Error;
pub use field::{Accuracy, FieldCoding, FieldDirective, FieldMeta};
pub use record::RecordCoding;
pub use shape::{FieldDescriptor, RecordShape};
pub use step::Step;
pub use time::default_time_coding;
pub use value::{TypeTag, Value};

// Re-exported so downstream crates can write `#[derive(pwcode::RecordShape)]`
// without a direct `pwcode-derive` dependency.
pub use pwcode_derive::RecordShape;
