//! A whole time series at once: transpose `&[T]` into the per-field value
//! series `metricarr::build_metric_arr_map` expects.

use std::collections::HashMap;

use metricarr::{build_metric_arr_map, MetricArrMap, MpFieldOptions};
use pwcode::{Error, RecordCoding, RecordShape, Value};

/// Builds a `metricarr::MetricArrMap` out of every sample in `records`,
/// using `coding`'s field order to know which names to collect and which
/// fields are omitted/const (those never reach the container, per §4.6).
pub fn build_metric_container<T: RecordShape>(
    coding: &RecordCoding,
    records: &[T],
    overrides: &HashMap<String, MpFieldOptions>,
) -> Result<MetricArrMap, Error> {
    let mut series: HashMap<String, Vec<Value>> = HashMap::new();
    for field in coding.fields() {
        if field.omit || field.const_value.is_some() {
            continue;
        }
        let column = records
            .iter()
            .map(|record| {
                record.get(&field.name).unwrap_or_else(|| {
                    if field.is_enum() {
                        Value::Str(String::new())
                    } else {
                        Value::F64(f64::NAN)
                    }
                })
            })
            .collect();
        series.insert(field.name.clone(), column);
    }
    build_metric_arr_map(coding, &series, overrides)
}
