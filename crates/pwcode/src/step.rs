use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One segment of a piecewise-linear code-to-value mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Width of one code step, in real units.
    pub size: f64,
    /// How many steps this segment covers.
    pub count: u64,
}

impl Step {
    pub fn new(size: f64, count: u64) -> Self {
        Step { size, count }
    }

    pub(crate) fn validate(&self, field: &str, index: usize) -> Result<(), Error> {
        if !(self.size > 0.0) {
            return Err(Error::ConfigInvalid {
                field: field.to_string(),
                reason: format!("step {index} has non-positive size {}", self.size),
            });
        }
        if self.count == 0 {
            return Err(Error::ConfigInvalid {
                field: field.to_string(),
                reason: format!("step {index} has zero count"),
            });
        }
        Ok(())
    }
}
