//! §4.6 wire layout: one `fixmap{4}` per metric (`meta`, `coding`, an
//! `enums` XOR `steps` array, and the delta-keyed data array), wrapped in
//! an outer `fixmap{K}` keyed by metric name.

use std::collections::HashMap;

use bytes::{Buf, BufMut};
use tracing::warn;

use pwcode::Error;

use crate::types::{MetricArrayDescriptor, MetricCoding, MetricMeta, MetricShape, MetricStep};
use crate::MetricArrMap;

const KEY_META: &str = "meta";
const KEY_META_UNIT: &str = "unit";
const KEY_META_CAPTION: &str = "caption";
const KEY_META_ACCURACY: &str = "accuracy";
const KEY_META_MAXINTERVAL: &str = "maxinterval";
const KEY_META_BANDWIDTH: &str = "bandwidth";
const KEY_CODING: &str = "coding";
const KEY_CODING_MIN: &str = "min";
const KEY_CODING_MAX: &str = "max";
const KEY_CODING_CLAMPED: &str = "cla";
const KEY_ENUMS: &str = "enums";
const KEY_STEPS: &str = "steps";
const KEY_STEP_COUNT: &str = "n";
const KEY_STEP_SIZE: &str = "s";
const CODING_KEY_ARR: &str = "arr";
const CODING_KEY_DELTA1: &str = "delta1";
const CODING_KEY_DELTA2: &str = "delta2";

fn coding_key(delta: u32) -> Result<&'static str, Error> {
    match delta {
        0 => Ok(CODING_KEY_ARR),
        1 => Ok(CODING_KEY_DELTA1),
        2 => Ok(CODING_KEY_DELTA2),
        other => Err(Error::UnsupportedDelta(other)),
    }
}

fn delta_from_coding_key(key: &str) -> Option<u32> {
    match key {
        CODING_KEY_ARR => Some(0),
        CODING_KEY_DELTA1 => Some(1),
        CODING_KEY_DELTA2 => Some(2),
        _ => None,
    }
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedMsgpack {
        reason: reason.into(),
    }
}

fn write_meta<B: BufMut>(buf: &mut B, meta: &MetricMeta) {
    mpack::write_map_header(buf, 5);
    mpack::write_string(buf, KEY_META_UNIT);
    mpack::write_string(buf, &meta.unit);
    mpack::write_string(buf, KEY_META_CAPTION);
    mpack::write_string(buf, &meta.caption);
    mpack::write_string(buf, KEY_META_ACCURACY);
    mpack::write_string(buf, &meta.accuracy);
    mpack::write_string(buf, KEY_META_MAXINTERVAL);
    mpack::write_int(buf, meta.max_interval_ns);
    mpack::write_string(buf, KEY_META_BANDWIDTH);
    mpack::write_number(buf, meta.bandwidth, 0.0);
}

fn read_meta(buf: &mut impl Buf) -> Result<MetricMeta, Error> {
    let n = mpack::read_map_header(buf)?;
    let mut meta = MetricMeta::default();
    for _ in 0..n {
        let key = mpack::read_string(buf)?;
        match key.as_str() {
            KEY_META_UNIT => meta.unit = mpack::read_string(buf)?,
            KEY_META_CAPTION => meta.caption = mpack::read_string(buf)?,
            KEY_META_ACCURACY => meta.accuracy = mpack::read_string(buf)?,
            KEY_META_MAXINTERVAL => meta.max_interval_ns = mpack::read_int(buf)?,
            KEY_META_BANDWIDTH => meta.bandwidth = mpack::read_number(buf)?,
            other => return Err(malformed(format!("unknown meta key {other:?}"))),
        }
    }
    Ok(meta)
}

fn write_coding<B: BufMut>(buf: &mut B, coding: &MetricCoding) {
    mpack::write_map_header(buf, 3);
    mpack::write_string(buf, KEY_CODING_MIN);
    mpack::write_number(buf, coding.min, 0.0);
    mpack::write_string(buf, KEY_CODING_MAX);
    mpack::write_number(buf, coding.max, 0.0);
    mpack::write_string(buf, KEY_CODING_CLAMPED);
    mpack::write_bool(buf, coding.clamped);
}

fn read_coding(buf: &mut impl Buf) -> Result<MetricCoding, Error> {
    let n = mpack::read_map_header(buf)?;
    let mut coding = MetricCoding::default();
    for _ in 0..n {
        let key = mpack::read_string(buf)?;
        match key.as_str() {
            KEY_CODING_MIN => coding.min = mpack::read_number(buf)?,
            KEY_CODING_MAX => coding.max = mpack::read_number(buf)?,
            KEY_CODING_CLAMPED => coding.clamped = mpack::read_bool(buf)?,
            other => return Err(malformed(format!("unknown coding key {other:?}"))),
        }
    }
    Ok(coding)
}

fn write_step<B: BufMut>(buf: &mut B, step: &MetricStep) {
    mpack::write_map_header(buf, 2);
    mpack::write_string(buf, KEY_STEP_COUNT);
    mpack::write_int(buf, step.count);
    mpack::write_string(buf, KEY_STEP_SIZE);
    mpack::write_number(buf, step.size, 0.0);
}

fn read_step(buf: &mut impl Buf) -> Result<MetricStep, Error> {
    let n = mpack::read_map_header(buf)?;
    let mut step = MetricStep::default();
    for _ in 0..n {
        let key = mpack::read_string(buf)?;
        match key.as_str() {
            KEY_STEP_COUNT => step.count = mpack::read_int(buf)?,
            KEY_STEP_SIZE => step.size = mpack::read_number(buf)?,
            other => return Err(malformed(format!("unknown step key {other:?}"))),
        }
    }
    Ok(step)
}

/// Writes one `MetricArrayDescriptor` as the §4.6 `fixmap{4}`.
pub fn write_descriptor<B: BufMut>(buf: &mut B, descriptor: &MetricArrayDescriptor) -> Result<(), Error> {
    mpack::write_map_header(buf, 4);
    mpack::write_string(buf, KEY_META);
    write_meta(buf, &descriptor.meta);
    mpack::write_string(buf, KEY_CODING);
    write_coding(buf, &descriptor.coding);

    match &descriptor.shape {
        MetricShape::Enums(values) => {
            mpack::write_string(buf, KEY_ENUMS);
            mpack::write_array_header(buf, values.len() as u32);
            for v in values {
                mpack::write_string(buf, v);
            }
        }
        MetricShape::Steps(steps) => {
            mpack::write_string(buf, KEY_STEPS);
            mpack::write_array_header(buf, steps.len() as u32);
            for step in steps {
                write_step(buf, step);
            }
        }
    }

    mpack::write_string(buf, coding_key(descriptor.delta)?);
    buf.put_slice(&descriptor.data);
    Ok(())
}

/// Reads one `MetricArrayDescriptor` back from its `fixmap{4}`.
pub fn read_descriptor(buf: &mut impl Buf) -> Result<MetricArrayDescriptor, Error> {
    let n = mpack::read_map_header(buf)?;
    let mut meta = None;
    let mut coding = None;
    let mut shape = None;
    let mut delta = None;
    let mut data = None;

    for _ in 0..n {
        let key = mpack::read_string(buf)?;
        if let Some(d) = delta_from_coding_key(&key) {
            delta = Some(d);
            data = Some(mpack::reencode_rle_array(buf)?);
            continue;
        }
        match key.as_str() {
            KEY_META => meta = Some(read_meta(buf)?),
            KEY_CODING => coding = Some(read_coding(buf)?),
            KEY_STEPS => {
                let count = mpack::read_array_header(buf)?;
                let steps = (0..count).map(|_| read_step(buf)).collect::<Result<_, _>>()?;
                shape = Some(MetricShape::Steps(steps));
            }
            KEY_ENUMS => {
                let count = mpack::read_array_header(buf)?;
                let values = (0..count).map(|_| mpack::read_string(buf)).collect::<Result<_, _>>()?;
                shape = Some(MetricShape::Enums(values));
            }
            other => return Err(malformed(format!("unknown metric descriptor key {other:?}"))),
        }
    }

    let meta = meta.ok_or_else(|| malformed("descriptor missing \"meta\""))?;
    let coding = coding.ok_or_else(|| malformed("descriptor missing \"coding\""))?;
    let shape = shape.ok_or_else(|| malformed("descriptor missing \"enums\"/\"steps\""))?;
    let delta = delta.ok_or_else(|| malformed("descriptor missing a delta-coded data array"))?;
    let data = data.expect("data set alongside delta");

    Ok(MetricArrayDescriptor {
        meta,
        coding,
        shape,
        delta,
        data,
    })
}

/// Writes the whole-container `fixmap{K}` of `metric_name -> descriptor`.
pub fn write_map<B: BufMut>(buf: &mut B, map: &MetricArrMap) -> Result<(), Error> {
    mpack::write_map_header(buf, map.len() as u32);
    for (name, descriptor) in map {
        mpack::write_string(buf, name);
        write_descriptor(buf, descriptor)?;
    }
    Ok(())
}

/// Reads the whole-container `fixmap{K}`. A malformed individual entry is
/// logged with its metric name before the error propagates, so batch
/// readers can grep logs without instrumenting every call site.
pub fn read_map(buf: &mut impl Buf) -> Result<MetricArrMap, Error> {
    let n = mpack::read_map_header(buf)?;
    let mut result = HashMap::with_capacity(n as usize);
    for _ in 0..n {
        let name = mpack::read_string(buf)?;
        match read_descriptor(buf) {
            Ok(descriptor) => {
                result.insert(name, descriptor);
            }
            Err(err) => {
                warn!(metric = name.as_str(), error = %err, "failed to decode metric descriptor");
                return Err(err);
            }
        }
    }
    Ok(result)
}
