//! §6.3: timestamp fields use Unix milliseconds as their real representation.

use crate::field::{FieldCoding, FieldDirective};
use crate::error::Error;

/// Default coding for a `#[time]` field with no explicit `#[step(...)]`
/// override: clamped, `step=1`, `min=0`, `max=4_300_000_000_000` (≈ year 2106).
pub fn default_time_coding(name: &str) -> Result<FieldCoding, Error> {
    FieldCoding::from_directive(
        name,
        FieldDirective {
            min: Some(0.0),
            max: Some(4_300_000_000_000.0),
            step: Some(1.0),
            clamped: true,
            ..Default::default()
        },
    )
}
