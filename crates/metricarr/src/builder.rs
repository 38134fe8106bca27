//! §4.6 "Building from a record array": turns a `RecordCoding` plus a
//! parallel name->value-series map into a `MetricArrMap`, one
//! `MetricArrayDescriptor` per surviving field.

use std::collections::HashMap;

use pwcode::{Error, FieldCoding, RecordCoding, Value};
use tracing::debug;

use crate::types::{MetricArrayDescriptor, MetricCoding, MetricShape, MetricStep};
use crate::MetricArrMap;

/// Per-field overrides a record's MessagePack-container collaborator
/// string would carry (§4.6 "name remapping": `"name=X,delta=D,rle=R"`).
/// `delta` defaults to 0, `rle_threshold` defaults to 3, `rename` defaults
/// to the field's own name.
#[derive(Debug, Clone)]
pub struct MpFieldOptions {
    pub rename: Option<String>,
    pub delta: u32,
    pub rle_threshold: i64,
}

impl Default for MpFieldOptions {
    fn default() -> Self {
        MpFieldOptions {
            rename: None,
            delta: 0,
            rle_threshold: 3,
        }
    }
}

fn field_shape(field: &FieldCoding) -> MetricShape {
    if field.is_enum() {
        MetricShape::Enums(field.enums.clone())
    } else {
        MetricShape::Steps(
            field
                .steps
                .iter()
                .map(|s| MetricStep {
                    count: s.count as i64,
                    size: s.size,
                })
                .collect(),
        )
    }
}

fn round_half_away_from_zero(x: f64) -> f64 {
    if x >= 0.0 {
        (x + 0.5).floor()
    } else {
        (x - 0.5).ceil()
    }
}

/// Quantizes a numeric field's real value to its tight metricarr register.
///
/// Deliberately not `FieldCoding::encode_real`: that method's codes are
/// padded up to the field's declared bit width (`bits()`), which can leave
/// unused codes above the real value range when `effective_n` isn't a
/// power of two. Metricarr's own registers have no such padding (see
/// `MetricArrayDescriptor`'s doc comment), so this mirrors the same
/// per-segment walk without the padding step.
fn quantize_numeric(field: &FieldCoding, x: f64) -> i64 {
    let counter: i64 = field.steps.iter().map(|s| s.count as i64).sum();
    let x = field.const_value.unwrap_or(x);

    if x.is_nan() {
        // No reserved NaN register in the tight code space; collapse onto
        // the same register as the nearest boundary.
        return if field.clamped { counter - 1 } else { counter + 1 };
    }

    let is_pos_inf = x.is_infinite() && x > 0.0;
    let is_neg_inf = x.is_infinite() && x < 0.0;

    if !field.clamped {
        if is_neg_inf {
            return 0;
        }
        if is_pos_inf {
            return counter + 1;
        }
    } else if is_pos_inf {
        return counter - 1;
    } else if is_neg_inf {
        return 0;
    }

    if x < field.min {
        return 0;
    }

    let mut total = field.min;
    let mut code_offset: i64 = 0;
    for step in &field.steps {
        let seg_start = total;
        total += step.size * step.count as f64;
        if x <= total {
            let raw = code_offset + round_half_away_from_zero((x - seg_start) / step.size) as i64;
            return if field.clamped { raw } else { raw + 1 };
        }
        code_offset += step.count as i64;
    }

    if field.clamped {
        counter - 1
    } else {
        counter + 1
    }
}

fn encode_register(field: &FieldCoding, value: &Value) -> Result<i64, Error> {
    if field.is_enum() {
        Ok(field.encode_enum(value.as_str().unwrap_or_default())? as i64)
    } else {
        Ok(quantize_numeric(field, value.as_f64()))
    }
}

/// Builds a `MetricArrMap` from `record` and a parallel `name -> samples`
/// series (one `Vec<Value>` per field, all the same length). Fields with
/// `omit=true` or a `const_value` are skipped — they carry no per-sample
/// information worth shipping (§4.6: "surviving filtering (omit=false,
/// const=false)").
pub fn build_metric_arr_map(
    record: &RecordCoding,
    series: &HashMap<String, Vec<Value>>,
    overrides: &HashMap<String, MpFieldOptions>,
) -> Result<MetricArrMap, Error> {
    let mut result = HashMap::new();

    for field in record.fields() {
        if field.omit || field.const_value.is_some() {
            continue;
        }

        let samples = series.get(&field.name).ok_or_else(|| Error::UnknownField(field.name.clone()))?;
        let registers: Vec<i64> = samples
            .iter()
            .map(|v| encode_register(field, v))
            .collect::<Result<_, _>>()?;

        let default_opts = MpFieldOptions::default();
        let opts = overrides.get(&field.name).unwrap_or(&default_opts);
        let name = opts.rename.clone().unwrap_or_else(|| field.name.clone());

        let data = mpack::encode_delta_rle(&registers, opts.delta, opts.rle_threshold)?;

        debug!(
            field = field.name.as_str(),
            output_name = name.as_str(),
            delta = opts.delta,
            rle_threshold = opts.rle_threshold,
            samples = registers.len(),
            "built metric array descriptor"
        );

        result.insert(
            name,
            MetricArrayDescriptor {
                meta: (&field.meta).into(),
                coding: MetricCoding {
                    min: field.min,
                    max: field.max(),
                    clamped: field.clamped,
                },
                shape: field_shape(field),
                delta: opts.delta,
                data,
            },
        );
    }

    Ok(result)
}
