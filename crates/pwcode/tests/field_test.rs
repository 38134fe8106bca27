use pwcode::{FieldCoding, FieldDirective, Step};

fn numeric(min: f64, max: f64, step: f64, clamped: bool) -> FieldCoding {
    FieldCoding::from_directive(
        "x",
        FieldDirective {
            min: Some(min),
            max: Some(max),
            step: Some(step),
            clamped,
            ..Default::default()
        },
    )
    .unwrap()
}

#[test]
fn nominal_float_round_trip() {
    // Scenario 1: {min=-40, max=40, step=0.1, clamped=false}, bits=10.
    let field = numeric(-40.0, 40.0, 0.1, false);
    assert_eq!(field.bits(), 10);
    let code = field.encode_real(18.3).unwrap();
    let back = field.decode_real(code).unwrap();
    assert!((back - 18.3).abs() <= 0.05 + 1e-9);
}

#[test]
fn round_trip_in_range_unclamped() {
    let field = numeric(-40.0, 40.0, 0.1, false);
    let mut x = -39.95;
    while x < 39.95 {
        let code = field.encode_real(x).unwrap();
        let back = field.decode_real(code).unwrap();
        assert!((back - x).abs() <= 0.1 / 2.0 + 1e-9, "x={x} back={back}");
        x += 0.37;
    }
}

#[test]
fn round_trip_in_range_clamped() {
    let field = numeric(0.0, 10.0, 0.5, true);
    let mut x = 0.0;
    while x <= 10.0 {
        let code = field.encode_real(x).unwrap();
        let back = field.decode_real(code).unwrap();
        assert!((back - x).abs() <= 0.5 / 2.0 + 1e-9, "x={x} back={back}");
        x += 0.13;
    }
}

#[test]
fn boundary_sentinels_unclamped() {
    let field = numeric(-40.0, 40.0, 0.1, false);
    assert_eq!(
        field.decode_real(field.encode_real(f64::NEG_INFINITY).unwrap()).unwrap(),
        f64::NEG_INFINITY
    );
    assert_eq!(
        field.decode_real(field.encode_real(f64::INFINITY).unwrap()).unwrap(),
        f64::INFINITY
    );
    assert!(field
        .decode_real(field.encode_real(f64::NAN).unwrap())
        .unwrap()
        .is_nan());
}

#[test]
fn saturation() {
    let field = numeric(0.0, 10.0, 1.0, false);
    assert_eq!(field.encode_real(-5.0).unwrap(), 0);
    let max_code = field.max_code();
    assert_eq!(field.encode_real(1000.0).unwrap(), max_code - 1);

    let clamped = numeric(0.0, 10.0, 1.0, true);
    assert_eq!(clamped.encode_real(-5.0).unwrap(), 0);
    assert_eq!(clamped.encode_real(1000.0).unwrap(), clamped.max_code());
}

#[test]
fn bit_width_minimality() {
    let field = numeric(-40.0, 40.0, 0.1, false);
    let bits = field.bits();
    // N = 800 steps, extra = 3 -> need ceil(log2(803)) = 10.
    assert_eq!(bits, 10);
    let n_plus_extra = 803u64;
    assert!(1u64 << (bits - 1) < n_plus_extra);
    assert!(n_plus_extra <= 1u64 << bits);
}

#[test]
fn const_field_mismatch_on_all_zero_blob() {
    // Scenario 2: bits=7, const=42.
    let field = FieldCoding::from_directive(
        "magic",
        FieldDirective {
            bits: Some(7),
            const_value: Some(42.0),
            min: Some(0.0),
            max: Some(100.0),
            clamped: false,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(field.bits(), 7);
    assert_eq!(field.max_code(), 127);

    // Missing value on encode -> MaxCode sentinel is irrelevant here because
    // const always substitutes; decode of code 0 (all-zero blob) must
    // mismatch because code 0 means -inf on an unclamped field.
    let err = field.decode_real(0).unwrap_err();
    match err {
        pwcode::Error::ConstMismatch { got, want, .. } => {
            assert!(got.is_infinite() && got.is_sign_negative());
            assert_eq!(want, 42.0);
        }
        other => panic!("expected ConstMismatch, got {other:?}"),
    }
}

#[test]
fn const_field_round_trips_when_bits_match() {
    // step = (max-min)/k = 100/125 = 0.8; pick a const that lands close to
    // an exact multiple of the step so the round-trip isn't fighting
    // floating-point rounding at the half-step boundary.
    let field = FieldCoding::from_directive(
        "magic",
        FieldDirective {
            bits: Some(7),
            const_value: Some(40.0),
            min: Some(0.0),
            max: Some(100.0),
            clamped: false,
            ..Default::default()
        },
    )
    .unwrap();
    let code = field.encode_real(0.0).unwrap(); // input is ignored, const substitutes
    assert_eq!(field.decode_real(code).unwrap(), 40.0);
}

#[test]
fn inf_overrides() {
    // Scenario 3.
    let field = FieldCoding::from_directive(
        "dist",
        FieldDirective {
            min: Some(0.0),
            max: Some(300.0),
            step: Some(0.1),
            clamped: false,
            inf_pos: Some(99999.0),
            inf_neg: Some(-99999.0),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(field.encode_real(-0.001).unwrap(), 0);
    assert_eq!(field.decode_real(0).unwrap(), -99999.0);

    let code = field.encode_real(f64::INFINITY).unwrap();
    assert_eq!(code, field.max_code() - 1);
    assert_eq!(field.decode_real(code).unwrap(), 99999.0);
}

#[test]
fn clamped_with_inf_override_is_config_invalid() {
    let err = FieldCoding::from_directive(
        "bad",
        FieldDirective {
            min: Some(0.0),
            max: Some(10.0),
            step: Some(1.0),
            clamped: true,
            inf_pos: Some(1.0),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, pwcode::Error::ConfigInvalid { .. }));
}

#[test]
fn enum_round_trip() {
    // Scenario 4.
    let field = FieldCoding::from_directive(
        "state",
        FieldDirective {
            enums: vec![
                "UNDEFINED".into(),
                "INITIALIZE".into(),
                "IDLE".into(),
                "MEASURE".into(),
                "STOP".into(),
                "ERROR".into(),
            ],
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(field.bits(), 3); // 7 slots incl. empty.
    assert_eq!(field.encode_enum("MEASURE").unwrap(), 4);
    assert_eq!(field.decode_enum(4).unwrap(), "MEASURE");
    assert_eq!(field.encode_enum("").unwrap(), 0);
    assert_eq!(field.decode_enum(0).unwrap(), "");
    assert!(matches!(
        field.encode_enum("XYZ"),
        Err(pwcode::Error::UnknownEnumValue { .. })
    ));
}

#[test]
fn omitted_field_has_zero_bits() {
    let field = FieldCoding::from_directive(
        "scratch",
        FieldDirective {
            omit: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(field.bits(), 0);
}

#[test]
fn explicit_multi_segment_steps() {
    let field = FieldCoding::from_directive(
        "multi",
        FieldDirective {
            min: Some(0.0),
            steps: Some(vec![Step::new(0.1, 50), Step::new(1.0, 100)]),
            clamped: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(field.max(), 0.1 * 50.0 + 1.0 * 100.0);
    let code = field.encode_real(5.0).unwrap();
    let back = field.decode_real(code).unwrap();
    assert!((back - 5.0).abs() <= 0.05 + 1e-9);
}

#[test]
fn clamped_extrapolates_beyond_declared_codes() {
    // Open question in DESIGN.md: clamped codes beyond N-1 extrapolate with
    // the last step's size on decode rather than saturating. Declaring
    // steps explicitly (instead of via bits/min/max, which always fills
    // the whole code space) leaves unused code space above N-1 whenever
    // sum(counts) isn't a power of two.
    let field = FieldCoding::from_directive(
        "small",
        FieldDirective {
            min: Some(0.0),
            steps: Some(vec![Step::new(1.0, 10)]), // N=10
            clamped: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(field.bits(), 4); // ceil(log2(10)) = 4
    assert_eq!(field.max_code(), 15);
    assert_eq!(field.decode_real(9).unwrap(), 9.0); // last declared code
    assert_eq!(field.decode_real(12).unwrap(), 12.0); // extrapolated
    assert_eq!(field.decode_real(15).unwrap(), 15.0); // extrapolated, at MaxCode
}
