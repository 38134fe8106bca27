use std::collections::HashMap;

use pwcode::{FieldCoding, FieldDirective, RecordCoding, Step, Value};

fn demo_record() -> RecordCoding {
    RecordCoding::new(vec![
        FieldCoding::from_directive(
            "temperature",
            FieldDirective {
                min: Some(-40.0),
                steps: Some(vec![Step::new(1.0, 20), Step::new(0.1, 400), Step::new(1.0, 20)]),
                clamped: false,
                ..Default::default()
            },
        )
        .unwrap(),
        FieldCoding::from_directive(
            "RH",
            FieldDirective {
                min: Some(0.0),
                steps: Some(vec![Step::new(0.1, 1000)]),
                clamped: false,
                ..Default::default()
            },
        )
        .unwrap(),
        FieldCoding::from_directive(
            "pressure",
            FieldDirective {
                min: Some(80000.0),
                steps: Some(vec![Step::new(100.0, 300)]),
                clamped: false,
                ..Default::default()
            },
        )
        .unwrap(),
        FieldCoding::from_directive(
            "heater",
            FieldDirective {
                min: Some(0.0),
                steps: Some(vec![Step::new(1.0, 2)]),
                clamped: true,
                ..Default::default()
            },
        )
        .unwrap(),
        FieldCoding::from_directive(
            "mode",
            FieldDirective {
                min: Some(0.0),
                steps: Some(vec![Step::new(1.0, 4)]),
                clamped: true,
                ..Default::default()
            },
        )
        .unwrap(),
    ])
    .unwrap()
}

fn demo_values() -> HashMap<String, Value> {
    let mut v = HashMap::new();
    v.insert("temperature".to_string(), Value::F64(21.3));
    v.insert("RH".to_string(), Value::F64(35.3));
    v.insert("pressure".to_string(), Value::F64(102401.0));
    v.insert("heater".to_string(), Value::F64(0.0));
    v.insert("mode".to_string(), Value::F64(2.0));
    v
}

#[test]
fn bytes_round_trip_matches_expected_length() {
    let record = demo_record();
    let values = demo_values();
    let data = bitpack::encode_bytes(&record, &values).unwrap();
    assert_eq!(data.len(), 4); // 31 bits -> 4 bytes

    let decoded = bitpack::decode_bytes(&record, &data, true).unwrap();
    assert_eq!(decoded.get("temperature"), Some(&Value::F64(21.0))); // rounds to whole degree
    assert_eq!(decoded.get("RH"), Some(&Value::F64(35.3)));
    assert_eq!(decoded.get("pressure"), Some(&Value::F64(102400.0))); // rounds to 100s
    assert_eq!(decoded.get("heater"), Some(&Value::F64(0.0)));
    assert_eq!(decoded.get("mode"), Some(&Value::F64(2.0)));
}

#[test]
fn missing_value_is_omitted_or_nan_by_request() {
    let record = demo_record();
    let mut values = demo_values();
    values.remove("pressure");

    let data = bitpack::encode_bytes(&record, &values).unwrap();

    let without_nan = bitpack::decode_bytes(&record, &data, false).unwrap();
    assert!(!without_nan.contains_key("pressure"));

    let with_nan = bitpack::decode_bytes(&record, &data, true).unwrap();
    match with_nan.get("pressure") {
        Some(Value::F64(v)) => assert!(v.is_nan()),
        other => panic!("expected NaN pressure, got {other:?}"),
    }
}

#[test]
fn decode_bytes_rejects_wrong_length() {
    let record = demo_record();
    let err = bitpack::decode_bytes(&record, &[0u8; 3], true).unwrap_err();
    assert!(matches!(err, pwcode::Error::BufferSize { .. }));
}

#[test]
fn hex_and_nybble_round_trip() {
    let record = demo_record();
    let values = demo_values();

    let hex = bitpack::encode_hex(&record, &values).unwrap();
    assert_eq!(hex.len() % 2, 0);
    let decoded = bitpack::decode_hex(&record, &hex, true).unwrap();
    assert_eq!(decoded.get("mode"), Some(&Value::F64(2.0)));

    let nybble = bitpack::encode_hex_nybble(&record, &values).unwrap();
    let decoded_nybble = bitpack::decode_hex_nybble(&record, &nybble, true).unwrap();
    assert_eq!(decoded_nybble.get("heater"), Some(&Value::F64(0.0)));
}

#[test]
fn seven_bit_round_trip_exact() {
    // Two fields totalling 18 bits (spec scenario 5): 3 seven-bit-payload bytes.
    let record = RecordCoding::new(vec![
        FieldCoding::from_directive(
            "a",
            FieldDirective {
                bits: Some(10),
                min: Some(0.0),
                max: Some(1000.0),
                clamped: true,
                ..Default::default()
            },
        )
        .unwrap(),
        FieldCoding::from_directive(
            "b",
            FieldDirective {
                bits: Some(8),
                min: Some(0.0),
                max: Some(100.0),
                clamped: true,
                ..Default::default()
            },
        )
        .unwrap(),
    ])
    .unwrap();
    assert_eq!(record.total_bits(), 18);

    let mut values = HashMap::new();
    values.insert("a".to_string(), Value::F64(500.0));
    values.insert("b".to_string(), Value::F64(42.0));

    let packed = bitpack::encode_seven_bit(&record, &values).unwrap();
    assert_eq!(packed.len(), 3); // ceil(18/7) = 3 groups
    for byte in &packed {
        assert_eq!(byte & 0x80, 0);
    }

    let decoded = bitpack::decode_seven_bit(&record, &packed, true).unwrap();
    match decoded.get("a").unwrap() {
        Value::F64(v) => assert!((v - 500.0).abs() < 1.0),
        other => panic!("expected F64, got {other:?}"),
    }
}

#[test]
fn seven_bit_rejects_msb_set() {
    let record = demo_record();
    let err = bitpack::decode_seven_bit(&record, &[0xFF, 0x00, 0x00, 0x00, 0x00], true).unwrap_err();
    assert!(matches!(err, pwcode::Error::MalformedBits { .. }));
}
