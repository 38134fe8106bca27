//! §4.6 "Stringification for tabular export": joins several metrics'
//! decoded value series into a delimiter-separated table, one row per
//! sample index.

use pwcode::Error;

use crate::MetricArrMap;

pub fn metric_names(map: &MetricArrMap) -> Vec<String> {
    let mut names: Vec<String> = map.keys().cloned().collect();
    names.sort();
    names
}

/// Renders `map` as a table with one column per name in `col_names` (all
/// names by sort order if empty) and one row per sample index, joined with
/// `separator`. Errors if any two columns have a different sample count.
pub fn tabulate_values(map: &MetricArrMap, col_names: &[String], separator: &str) -> Result<String, Error> {
    let names: Vec<String> = if col_names.is_empty() {
        metric_names(map)
    } else {
        col_names.to_vec()
    };
    if names.is_empty() {
        return Ok(String::new());
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in &names {
        let descriptor = map.get(name).ok_or_else(|| Error::UnknownField(name.clone()))?;
        columns.push(descriptor.all_values_as_string()?);
    }

    let row_count = columns[0].len();
    for (name, column) in names.iter().zip(&columns) {
        if column.len() != row_count {
            return Err(Error::ConfigInvalid {
                field: name.clone(),
                reason: format!("expected {row_count} samples, got {}", column.len()),
            });
        }
    }

    let mut out = String::new();
    for row in 0..row_count {
        if row > 0 {
            out.push('\n');
        }
        for (col, column) in columns.iter().enumerate() {
            if col > 0 {
                out.push_str(separator);
            }
            out.push_str(&column[row]);
        }
    }
    Ok(out)
}
