use std::collections::HashMap;

use pwcode::{FieldCoding, FieldDirective, RecordCoding, Value};

fn numeric_field(name: &str, min: f64, max: f64, step: f64) -> FieldCoding {
    FieldCoding::from_directive(
        name,
        FieldDirective {
            min: Some(min),
            max: Some(max),
            step: Some(step),
            clamped: false,
            ..Default::default()
        },
    )
    .unwrap()
}

fn enum_field(name: &str, enums: &[&str]) -> FieldCoding {
    FieldCoding::from_directive(
        name,
        FieldDirective {
            enums: enums.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        },
    )
    .unwrap()
}

fn demo_record() -> RecordCoding {
    RecordCoding::new(vec![
        numeric_field("temp", -40.0, 60.0, 0.5), // 200 steps, unclamped
        enum_field("mode", &["off", "eco", "boost"]),
    ])
    .unwrap()
}

fn demo_series() -> HashMap<String, Vec<Value>> {
    let mut series = HashMap::new();
    series.insert(
        "temp".to_string(),
        vec![
            Value::F64(-40.0),
            Value::F64(-10.0),
            Value::F64(0.0),
            Value::F64(25.0),
            Value::F64(59.5),
        ],
    );
    series.insert(
        "mode".to_string(),
        vec![
            Value::Str("eco".to_string()),
            Value::Str(String::new()),
            Value::Str("boost".to_string()),
            Value::Str("off".to_string()),
            Value::Str("eco".to_string()),
        ],
    );
    series
}

#[test]
fn builder_quantizes_and_decodes_numeric_field() {
    let record = demo_record();
    let map = metricarr::build_metric_arr_map(&record, &demo_series(), &HashMap::new()).unwrap();
    let temp = &map["temp"];

    let decoded = temp.all_values().unwrap();
    assert_eq!(decoded.len(), 5);
    for (got, want) in decoded.iter().zip([-40.0, -10.0, 0.0, 25.0, 59.5]) {
        assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
    }
}

#[test]
fn builder_skips_omitted_and_const_fields() {
    let omitted = FieldCoding::from_directive(
        "debug",
        FieldDirective {
            omit: true,
            ..Default::default()
        },
    )
    .unwrap();
    let konst = FieldCoding::from_directive(
        "firmware",
        FieldDirective {
            min: Some(0.0),
            max: Some(10.0),
            step: Some(1.0),
            const_value: Some(3.0),
            ..Default::default()
        },
    )
    .unwrap();
    let record = RecordCoding::new(vec![omitted, konst, numeric_field("temp", 0.0, 10.0, 1.0)]).unwrap();

    let mut series = HashMap::new();
    series.insert("temp".to_string(), vec![Value::F64(5.0)]);

    let map = metricarr::build_metric_arr_map(&record, &series, &HashMap::new()).unwrap();
    assert_eq!(map.len(), 1);
    assert!(map.contains_key("temp"));
}

#[test]
fn builder_reports_missing_series() {
    let record = demo_record();
    let mut series = demo_series();
    series.remove("mode");
    let err = metricarr::build_metric_arr_map(&record, &series, &HashMap::new()).unwrap_err();
    assert!(matches!(err, pwcode::Error::UnknownField(name) if name == "mode"));
}

#[test]
fn enum_field_round_trips_through_descriptor() {
    let record = demo_record();
    let map = metricarr::build_metric_arr_map(&record, &demo_series(), &HashMap::new()).unwrap();
    let mode = &map["mode"];
    let decoded = mode.all_values_as_string().unwrap();
    assert_eq!(decoded, vec!["eco", "", "boost", "off", "eco"]);
}

#[test]
fn wire_round_trip_preserves_every_metric() {
    let record = demo_record();
    let map = metricarr::build_metric_arr_map(&record, &demo_series(), &HashMap::new()).unwrap();

    let mut buf = Vec::new();
    metricarr::write_map(&mut buf, &map).unwrap();
    let mut reader: &[u8] = &buf;
    let decoded_map = metricarr::read_map(&mut reader).unwrap();

    assert_eq!(decoded_map.len(), map.len());
    let temp = &decoded_map["temp"];
    let values = temp.all_values().unwrap();
    for (got, want) in values.iter().zip([-40.0, -10.0, 0.0, 25.0, 59.5]) {
        assert!((got - want).abs() < 1e-9);
    }
    assert_eq!(
        decoded_map["mode"].all_values_as_string().unwrap(),
        vec!["eco", "", "boost", "off", "eco"]
    );
}

#[test]
fn name_remapping_and_delta_pass_are_honored() {
    let record = demo_record();
    let mut overrides = HashMap::new();
    overrides.insert(
        "temp".to_string(),
        metricarr::MpFieldOptions {
            rename: Some("cabin_temperature".to_string()),
            delta: 1,
            rle_threshold: 3,
        },
    );

    let map = metricarr::build_metric_arr_map(&record, &demo_series(), &overrides).unwrap();
    assert!(map.contains_key("cabin_temperature"));
    assert!(!map.contains_key("temp"));
    assert_eq!(map["cabin_temperature"].delta, 1);

    let decoded = map["cabin_temperature"].all_values().unwrap();
    for (got, want) in decoded.iter().zip([-40.0, -10.0, 0.0, 25.0, 59.5]) {
        assert!((got - want).abs() < 1e-9);
    }
}

#[test]
fn tabulate_values_joins_columns_by_sample_index() {
    let record = demo_record();
    let map = metricarr::build_metric_arr_map(&record, &demo_series(), &HashMap::new()).unwrap();

    let table = metricarr::tabulate_values(&map, &["temp".to_string(), "mode".to_string()], ",").unwrap();
    let rows: Vec<&str> = table.lines().collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0], "-40.0,eco");
    assert_eq!(rows[2], "0.0,boost");
}

#[test]
fn tabulate_values_rejects_mismatched_column_lengths() {
    let record = demo_record();
    let mut series = demo_series();
    series.get_mut("mode").unwrap().pop();
    let map = metricarr::build_metric_arr_map(&record, &series, &HashMap::new()).unwrap();

    let err = metricarr::tabulate_values(&map, &["temp".to_string(), "mode".to_string()], ",").unwrap_err();
    assert!(matches!(err, pwcode::Error::ConfigInvalid { .. }));
}

#[test]
fn metric_names_are_sorted() {
    let record = demo_record();
    let map = metricarr::build_metric_arr_map(&record, &demo_series(), &HashMap::new()).unwrap();
    assert_eq!(metricarr::metric_names(&map), vec!["mode", "temp"]);
}
