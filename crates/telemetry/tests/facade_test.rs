use std::collections::HashMap;

use pwcode::RecordShape;

#[derive(Debug, Clone, Default, pwcode::RecordShape)]
struct SensorSample {
    #[step(min = -40.0, max = 60.0, step = 0.5)]
    #[meta(unit = "C", caption = "cabin temperature", accuracy = 0.5, max_interval_ns = 1_000_000_000, bandwidth = 2.0)]
    temperature: f64,
    #[enum_values("off", "eco", "boost")]
    mode: String,
    #[time]
    timestamp: i64,
    #[const_value(1.0)]
    firmware_version: f64,
    #[omit]
    debug_marker: f64,
}

fn sample(temperature: f64, mode: &str, timestamp: i64) -> SensorSample {
    SensorSample {
        temperature,
        mode: mode.to_string(),
        timestamp,
        firmware_version: 1.0,
        debug_marker: 999.0,
    }
}

#[test]
fn single_sample_round_trips_through_bytes() {
    let coding = telemetry::coding_of::<SensorSample>().unwrap();
    let original = sample(21.5, "eco", 1_700_000_000_000);

    let bytes = telemetry::pack_bytes(&coding, &original).unwrap();
    let decoded: SensorSample = telemetry::unpack_bytes(&coding, &bytes, true).unwrap();

    assert!((decoded.temperature - 21.5).abs() < 1e-9);
    assert_eq!(decoded.mode, "eco");
    assert_eq!(decoded.timestamp, 1_700_000_000_000);
    assert_eq!(decoded.firmware_version, 1.0);
    assert_eq!(decoded.debug_marker, 0.0); // omitted field never round-trips
}

#[test]
fn const_field_rejects_tampering() {
    let coding = telemetry::coding_of::<SensorSample>().unwrap();
    let mut original = sample(0.0, "off", 0);
    original.firmware_version = 2.0; // ignored on encode — const always wins
    let bytes = telemetry::pack_bytes(&coding, &original).unwrap();
    let decoded: SensorSample = telemetry::unpack_bytes(&coding, &bytes, true).unwrap();
    assert_eq!(decoded.firmware_version, 1.0);
}

#[test]
fn whole_series_builds_a_metric_container() {
    let coding = telemetry::coding_of::<SensorSample>().unwrap();
    let samples = vec![
        sample(-10.0, "off", 0),
        sample(-5.0, "eco", 1_000),
        sample(0.0, "eco", 2_000),
        sample(5.0, "boost", 3_000),
    ];

    let map = telemetry::build_metric_container(&coding, &samples, &HashMap::new()).unwrap();

    // firmware_version is const-defined and debug_marker is omitted: neither
    // should survive into the container.
    assert_eq!(metricarr::metric_names(&map), vec!["mode", "temperature", "timestamp"]);

    let temps = map["temperature"].all_values().unwrap();
    for (got, want) in temps.iter().zip([-10.0, -5.0, 0.0, 5.0]) {
        assert!((got - want).abs() < 1e-9);
    }

    let modes = map["mode"].all_values_as_string().unwrap();
    assert_eq!(modes, vec!["off", "eco", "eco", "boost"]);

    let temp_meta = &map["temperature"].meta;
    assert_eq!(temp_meta.unit, "C");
    assert_eq!(temp_meta.caption, "cabin temperature");
    assert_eq!(temp_meta.accuracy, "0.5");
    assert_eq!(temp_meta.max_interval_ns, 1_000_000_000);
    assert_eq!(temp_meta.bandwidth, 2.0);
}

#[test]
fn meta_attributes_reach_the_field_descriptor() {
    let descriptor = SensorSample::fields()
        .into_iter()
        .find(|d| d.name == "temperature")
        .unwrap();
    assert_eq!(descriptor.coding.meta.unit, "C");
    assert_eq!(descriptor.coding.meta.caption, "cabin temperature");
    assert_eq!(
        descriptor.coding.meta.accuracy,
        Some(pwcode::Accuracy::Value(0.5))
    );
    assert_eq!(descriptor.coding.meta.max_interval_ns, Some(1_000_000_000));
    assert_eq!(descriptor.coding.meta.bandwidth, Some(2.0));
}
