//! Piecewise quantization for a single scalar field.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::step::Step;

/// How a field's "accuracy" metadata is expressed: either a literal real
/// value, or the name of a sibling field that carries it dynamically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Accuracy {
    Value(f64),
    SiblingField(String),
}

/// Informational metadata. Never affects bit-level coding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub unit: String,
    pub caption: String,
    pub accuracy: Option<Accuracy>,
    pub max_interval_ns: Option<u64>,
    pub bandwidth: Option<f64>,
}

/// Declarative construction parameters, as produced by `pwcode-derive` from
/// struct attributes: same expressiveness as a tag-string grammar, no
/// runtime string parsing. See `FieldCoding::from_directive`.
#[derive(Debug, Clone, Default)]
pub struct FieldDirective {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub steps: Option<Vec<Step>>,
    pub bits: Option<u32>,
    pub clamped: bool,
    pub const_value: Option<f64>,
    pub inf_pos: Option<f64>,
    pub inf_neg: Option<f64>,
    pub enums: Vec<String>,
    pub omit: bool,
    pub meta: FieldMeta,
}

/// A piecewise-linear float<->uint mapping for one named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCoding {
    pub name: String,
    pub min: f64,
    pub steps: Vec<Step>,
    pub clamped: bool,
    pub enums: Vec<String>,
    pub inf_pos_override: Option<f64>,
    pub inf_neg_override: Option<f64>,
    pub const_value: Option<f64>,
    pub omit: bool,
    pub meta: FieldMeta,
}

fn round_half_away_from_zero(x: f64) -> f64 {
    if x >= 0.0 {
        (x + 0.5).floor()
    } else {
        (x - 0.5).ceil()
    }
}

impl FieldCoding {
    /// Build a `FieldCoding` from a directive, resolving `bits`/`steps`
    /// shorthands the way `createPiecewiseCodingFromStruct` resolves its
    /// `min`/`max`/`step`/`bits` tag keys.
    pub fn from_directive(name: impl Into<String>, d: FieldDirective) -> Result<Self, Error> {
        let name = name.into();

        if d.omit {
            return Ok(FieldCoding {
                name,
                min: 0.0,
                steps: Vec::new(),
                clamped: d.clamped,
                enums: Vec::new(),
                inf_pos_override: None,
                inf_neg_override: None,
                const_value: None,
                omit: true,
                meta: d.meta,
            });
        }

        if !d.enums.is_empty() {
            let coding = FieldCoding {
                name,
                min: 0.0,
                steps: vec![Step::new(1.0, d.enums.len() as u64)],
                clamped: true,
                enums: d.enums,
                inf_pos_override: None,
                inf_neg_override: None,
                const_value: d.const_value,
                omit: d.omit,
                meta: d.meta,
            };
            coding.validate()?;
            return Ok(coding);
        }

        let min = d.min.unwrap_or(0.0);
        let steps = if let Some(bits) = d.bits {
            let extra: i64 = if d.clamped { 0 } else { 3 };
            let k = (1i64 << bits) - extra;
            if k <= 0 {
                return Err(Error::ConfigInvalid {
                    field: name.clone(),
                    reason: format!("bits={bits} leaves no usable codes"),
                });
            }
            let max = d.max.unwrap_or_else(|| {
                min + d.step.unwrap_or(1.0) * k as f64
            });
            let step = d.step.unwrap_or((max - min) / k as f64);
            vec![Step::new(step, k as u64)]
        } else if let (Some(max), Some(step)) = (d.max, d.step) {
            let count = ((max - min) / step).ceil().max(1.0) as u64;
            vec![Step::new(step, count)]
        } else if let Some(explicit) = d.steps {
            explicit
        } else {
            return Err(Error::ConfigInvalid {
                field: name,
                reason: "numeric field requires min+max+step, min+steps, or bits".to_string(),
            });
        };

        let coding = FieldCoding {
            name,
            min,
            steps,
            clamped: d.clamped,
            enums: Vec::new(),
            inf_pos_override: d.inf_pos,
            inf_neg_override: d.inf_neg,
            const_value: d.const_value,
            omit: d.omit,
            meta: d.meta,
        };
        coding.validate()?;
        Ok(coding)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::ConfigInvalid {
                field: self.name.clone(),
                reason: "name must not be empty".to_string(),
            });
        }
        if !self.enums.is_empty() && !self.clamped {
            return Err(Error::ConfigInvalid {
                field: self.name.clone(),
                reason: "enum fields must be clamped".to_string(),
            });
        }
        if !self.enums.is_empty() && self.const_value.is_some() {
            return Err(Error::ConfigInvalid {
                field: self.name.clone(),
                reason: "enum fields cannot also declare const_value".to_string(),
            });
        }
        if self.omit {
            return Ok(());
        }
        if self.steps.is_empty() {
            return Err(Error::ConfigInvalid {
                field: self.name.clone(),
                reason: "no steps defined".to_string(),
            });
        }
        for (i, step) in self.steps.iter().enumerate() {
            step.validate(&self.name, i)?;
        }
        if self.clamped && (self.inf_pos_override.is_some() || self.inf_neg_override.is_some()) {
            return Err(Error::ConfigInvalid {
                field: self.name.clone(),
                reason: "clamped fields cannot declare ±inf overrides".to_string(),
            });
        }
        Ok(())
    }

    fn effective_n(&self) -> u64 {
        if !self.enums.is_empty() {
            self.enums.len() as u64 + 1
        } else {
            self.steps.iter().map(|s| s.count).sum()
        }
    }

    /// Total bits spent on this field (0 if omitted).
    ///
    /// Computed by integer search rather than `f64::log2().ceil()` so the
    /// minimality invariant `2^(bits-1) < n <= 2^bits` holds exactly at
    /// power-of-two boundaries, where floating-point log2 can be off by one
    /// ULP in either direction.
    pub fn bits(&self) -> u32 {
        if self.omit {
            return 0;
        }
        let n = self.effective_n() + if self.clamped { 0 } else { 3 };
        let mut bits = 0u32;
        while (1u64 << bits) < n {
            bits += 1;
        }
        bits
    }

    pub fn max_code(&self) -> u64 {
        if self.omit {
            return 0;
        }
        (1u64 << self.bits()) - 1
    }

    /// Real value covered by the last code (`min + sum(size*count)`).
    pub fn max(&self) -> f64 {
        self.min + self.steps.iter().map(|s| s.size * s.count as f64).sum::<f64>()
    }

    /// The local step size in effect at a given code — used both to bound
    /// quantization error and as the tolerance for const-field equality.
    pub fn local_step_size(&self, code: u64) -> f64 {
        let mut binvalue: u64 = if self.clamped { 0 } else { 1 };
        for step in &self.steps {
            binvalue += step.count;
            if code <= binvalue {
                return step.size;
            }
        }
        self.steps.last().map(|s| s.size).unwrap_or(1.0)
    }

    /// §4.1 Encode: real value -> code.
    pub fn encode_real(&self, x: f64) -> Result<u64, Error> {
        if self.omit {
            return Ok(0);
        }
        let max_code = self.max_code();
        let x = self.const_value.unwrap_or(x);

        if x.is_nan() {
            return Ok(max_code);
        }

        let is_pos_inf =
            (x.is_infinite() && x > 0.0) || self.inf_pos_override.is_some_and(|v| v == x);
        let is_neg_inf =
            (x.is_infinite() && x < 0.0) || self.inf_neg_override.is_some_and(|v| v == x);

        if !self.clamped {
            if is_neg_inf {
                return Ok(0);
            }
            if is_pos_inf {
                return Ok(max_code - 1);
            }
        } else if is_pos_inf {
            return Ok(max_code);
        } else if is_neg_inf {
            return Ok(0);
        }

        if x < self.min {
            return Ok(0);
        }

        let mut total = self.min;
        let mut code_offset: u64 = 0;
        for step in &self.steps {
            let seg_start = total;
            total += step.size * step.count as f64;
            if x <= total {
                let raw = code_offset + round_half_away_from_zero((x - seg_start) / step.size) as u64;
                let result = if self.clamped { raw } else { raw + 1 };
                return Ok(result.min(max_code));
            }
            code_offset += step.count;
        }

        Ok(if self.clamped { max_code } else { max_code - 1 })
    }

    /// §4.1 Decode: code -> real value.
    pub fn decode_real(&self, code: u64) -> Result<f64, Error> {
        let max_code = self.max_code();
        if !self.omit && code > max_code {
            return Err(Error::OutOfRange {
                field: self.name.clone(),
                code,
                max: max_code,
            });
        }

        let v = if !self.clamped && code == max_code {
            f64::NAN
        } else if !self.clamped && code == 0 {
            self.inf_neg_override.unwrap_or(f64::NEG_INFINITY)
        } else if !self.clamped && code == max_code - 1 {
            self.inf_pos_override.unwrap_or(f64::INFINITY)
        } else {
            let mut binvalue: u64 = if self.clamped { 0 } else { 1 };
            let mut total = self.min;
            let mut found = None;
            for step in &self.steps {
                let a = binvalue;
                binvalue += step.count;
                if code <= binvalue {
                    found = Some(total + (code - a) as f64 * step.size);
                    break;
                }
                total += step.count as f64 * step.size;
            }
            match found {
                Some(v) => v,
                None if self.clamped => {
                    let last = self.steps.last().expect("validated: at least one step");
                    total + (code - self.effective_n()) as f64 * last.size
                }
                None => f64::INFINITY,
            }
        };

        if let Some(c) = self.const_value {
            let tol = self.local_step_size(code).max(f64::EPSILON) / 2.0;
            if v.is_nan() || (v - c).abs() > tol {
                return Err(Error::ConstMismatch {
                    field: self.name.clone(),
                    got: v,
                    want: c,
                });
            }
            return Ok(c);
        }
        Ok(v)
    }

    /// Encode already-resolved enum input: `""` -> code 0, a known member ->
    /// `index + 1`. Unknown strings are rejected.
    pub fn encode_enum(&self, s: &str) -> Result<u64, Error> {
        if s.is_empty() {
            return Ok(0);
        }
        match self.enums.iter().position(|e| e == s) {
            Some(i) => Ok(i as u64 + 1),
            None => Err(Error::UnknownEnumValue {
                field: self.name.clone(),
                value: s.to_string(),
            }),
        }
    }

    /// Decode a code into an enum string: code 0 -> `""`, `i+1` -> `enums[i]`.
    pub fn decode_enum(&self, code: u64) -> Result<String, Error> {
        if code == 0 {
            return Ok(String::new());
        }
        let idx = (code - 1) as usize;
        self.enums
            .get(idx)
            .cloned()
            .ok_or(Error::EnumOutOfRange {
                field: self.name.clone(),
                code,
            })
    }

    pub fn is_enum(&self) -> bool {
        !self.enums.is_empty()
    }
}
