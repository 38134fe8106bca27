//! §4.6: the Metric Array Container. Builds a compressed, named time-series
//! map out of a `RecordCoding` plus per-field value series, and reads one
//! back — the container `telemetry` readers and writers actually exchange.

mod builder;
mod table;
mod types;
mod wire;

use std::collections::HashMap;

pub use builder::{build_metric_arr_map, MpFieldOptions};
pub use table::{metric_names, tabulate_values};
pub use types::{MetricArrayDescriptor, MetricCoding, MetricMeta, MetricShape, MetricStep};
pub use wire::{read_descriptor, read_map, write_descriptor, write_map};

/// `metric_name -> descriptor`, the whole-container shape of §4.6.
pub type MetricArrMap = HashMap<String, MetricArrayDescriptor>;
