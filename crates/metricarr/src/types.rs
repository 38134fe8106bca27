//! §4.6 `MetricArrayDescriptor`: the per-metric coding metadata plus its
//! compressed data blob, and the single-register / whole-array decode paths
//! built on top of it.

use pwcode::Error;

/// Sufficient to reconstruct the real value range; the step schedule itself
/// carries the shape (§3 `MetricArrayDescriptor.coding`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricCoding {
    pub min: f64,
    pub max: f64,
    pub clamped: bool,
}

/// One segment of the reconstructed step schedule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricStep {
    pub count: i64,
    pub size: f64,
}

/// Informational metadata carried alongside the coding; never affects
/// decode. Accuracy is flattened to its string form on this side of the
/// wire (`pwcode::Accuracy::Value` renders as a decimal, `SiblingField`
/// renders as the sibling's name) since the container has no typed
/// cross-reference back to the record's own field list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricMeta {
    pub unit: String,
    pub caption: String,
    pub accuracy: String,
    pub max_interval_ns: i64,
    pub bandwidth: f64,
}

impl From<&pwcode::FieldMeta> for MetricMeta {
    fn from(meta: &pwcode::FieldMeta) -> Self {
        let accuracy = match &meta.accuracy {
            Some(pwcode::Accuracy::Value(v)) => v.to_string(),
            Some(pwcode::Accuracy::SiblingField(name)) => name.clone(),
            None => String::new(),
        };
        MetricMeta {
            unit: meta.unit.clone(),
            caption: meta.caption.clone(),
            accuracy,
            max_interval_ns: meta.max_interval_ns.unwrap_or(0) as i64,
            bandwidth: meta.bandwidth.unwrap_or(0.0),
        }
    }
}

/// Either an enum table or a numeric step schedule, never both — mirrors
/// the wire layout's `("enums" → [string]) XOR ("steps" → [...])`.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricShape {
    Enums(Vec<String>),
    Steps(Vec<MetricStep>),
}

/// One metric's coding metadata and its compressed time series.
///
/// `data` holds an already-encoded `mpack` delta-RLE integer array of
/// register codes. These registers live in their *own* tight code space,
/// not the bit-packed one `bitpack`/`FieldCoding::encode_real` produce:
/// `{min, max, clamped}` plus the step schedule is sufficient to
/// reconstruct the value range, with no declared bit width to pad to. So
/// the valid codes are exactly `0..=sum(step.count)-1` (clamped) or
/// `0..=sum(step.count)+1` (unclamped, with 0 and the top code reserved
/// for ±∞) — no unused high codes, and no separate NaN sentinel. Decoding
/// re-runs the step-schedule walk; `crate::builder` quantizes with the
/// matching tight encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricArrayDescriptor {
    pub meta: MetricMeta,
    pub coding: MetricCoding,
    pub shape: MetricShape,
    pub delta: u32,
    pub data: Vec<u8>,
}

impl MetricArrayDescriptor {
    fn effective_n(&self) -> i64 {
        match &self.shape {
            MetricShape::Enums(values) => values.len() as i64 + 1,
            MetricShape::Steps(steps) => steps.iter().map(|s| s.count).sum(),
        }
    }

    /// Decode one register code to its real value, per §4.1's step-schedule
    /// walk and §4.6's enum table lookup.
    pub fn value_at(&self, reg: i64) -> Result<f64, Error> {
        if let MetricShape::Enums(values) = &self.shape {
            if reg == 0 {
                return Ok(0.0); // empty/missing enum, register index 0
            }
            let idx = (reg - 1) as usize;
            return if values.get(idx).is_some() {
                Ok(reg as f64)
            } else {
                Err(Error::EnumOutOfRange {
                    field: "<metric>".to_string(),
                    code: reg as u64,
                })
            };
        }

        let MetricShape::Steps(steps) = &self.shape else {
            unreachable!("enum case handled above")
        };

        let counter = self.effective_n();

        if !self.coding.clamped && reg == 0 {
            return Ok(f64::NEG_INFINITY);
        }

        let mut idx = reg;
        let mut base = 0i64;
        if !self.coding.clamped {
            idx -= 1;
        }

        let mut total = self.coding.min;
        for step in steps {
            if idx < base + step.count {
                return Ok(total + (idx - base) as f64 * step.size);
            }
            base += step.count;
            total += step.count as f64 * step.size;
        }

        if self.coding.clamped {
            // Extrapolate past the declared range using the last segment's
            // step size, same resolution `FieldCoding::decode_real` uses
            // for clamped overflow rather than treating it as an error.
            let last = steps.last().expect("validated: at least one step");
            return Ok(total + (idx - base) as f64 * last.size);
        }
        if reg == counter + 1 {
            return Ok(f64::INFINITY);
        }
        Ok(f64::NAN)
    }

    /// Decode the enum string for a register code (enum-shaped metrics only).
    pub fn enum_at(&self, reg: i64) -> Result<String, Error> {
        let MetricShape::Enums(values) = &self.shape else {
            return Err(Error::ConfigInvalid {
                field: "<metric>".to_string(),
                reason: "enum_at called on a numeric metric".to_string(),
            });
        };
        if reg == 0 {
            return Ok(String::new());
        }
        values
            .get((reg - 1) as usize)
            .cloned()
            .ok_or(Error::EnumOutOfRange {
                field: "<metric>".to_string(),
                code: reg as u64,
            })
    }

    /// Decode the full time series: undo delta/RLE, then map every register
    /// through the per-code inverse mapping.
    pub fn all_values(&self) -> Result<Vec<f64>, Error> {
        let registers = mpack::decode_delta_rle(&self.data, self.delta)?;
        registers.into_iter().map(|r| self.value_at(r)).collect()
    }

    /// Same decode, but enum-shaped metrics render their member string and
    /// numeric metrics render a decimal with precision matched to the local
    /// step size at that code (§4.6 "stringification for tabular export").
    pub fn all_values_as_string(&self) -> Result<Vec<String>, Error> {
        let registers = mpack::decode_delta_rle(&self.data, self.delta)?;
        registers
            .into_iter()
            .map(|reg| match &self.shape {
                MetricShape::Enums(_) => self.enum_at(reg),
                MetricShape::Steps(_) => {
                    let v = self.value_at(reg)?;
                    Ok(self.format_value(reg, v))
                }
            })
            .collect()
    }

    fn local_step_size(&self, reg: i64) -> f64 {
        let MetricShape::Steps(steps) = &self.shape else {
            return 1.0;
        };
        let mut base: i64 = if self.coding.clamped { 0 } else { 1 };
        for step in steps {
            base += step.count;
            if reg <= base {
                return step.size;
            }
        }
        steps.last().map(|s| s.size).unwrap_or(1.0)
    }

    fn format_value(&self, reg: i64, v: f64) -> String {
        if !v.is_finite() {
            return if v.is_nan() {
                "NaN".to_string()
            } else if v > 0.0 {
                "+Inf".to_string()
            } else {
                "-Inf".to_string()
            };
        }
        let step = self.local_step_size(reg);
        let decimals = if step > 0.0 && step.is_finite() {
            step.abs().log10().abs().ceil().max(0.0) as usize
        } else {
            0
        };
        format!("{v:.decimals$}")
    }
}
