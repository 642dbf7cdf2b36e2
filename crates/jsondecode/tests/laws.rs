use jsondecode::{decoders, Decoder, FromJson};
use proptest::prelude::*;
use serde_json::{json, Value};

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("Finite", |n| n.is_finite())
            .prop_map(Value::from),
        "[a-z0-9]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::from),
            prop::collection::btree_map("[a-e]", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn subjects() -> Vec<Decoder<Value>> {
    vec![
        Value::decoder(),
        i32::decoder().map(Value::from),
        decoders::vec(String::decoder()).map(Value::from),
        Option::<bool>::decoder().at("a").map(|flag| json!(flag)),
        decoders::map::<String, u8, std::collections::BTreeMap<_, _>>(u8::decoder())
            .map(|entries| json!(entries)),
    ]
}

fn assert_same<T: PartialEq + std::fmt::Debug + 'static>(
    left: &Decoder<T>,
    right: &Decoder<T>,
    value: &Value,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(left.decode_json(value), right.decode_json(value));
    prop_assert_eq!(
        left.decode_json_accumulating(value),
        right.decode_json_accumulating(value)
    );
    Ok(())
}

proptest! {
    #[test]
    fn map_identity(value in json_value()) {
        for decoder in subjects() {
            assert_same(&decoder.clone().map(|v| v), &decoder, &value)?;
        }
    }

    #[test]
    fn prepare_identity(value in json_value()) {
        for decoder in subjects() {
            assert_same(&decoder.clone().prepare(|cursor| cursor.clone()), &decoder, &value)?;
        }
    }

    #[test]
    fn integral_decoding_matches_casts(n in any::<i64>()) {
        let value = json!(n);
        prop_assert_eq!(i8::decoder().decode_json(&value).ok(), i8::try_from(n).ok());
        prop_assert_eq!(u8::decoder().decode_json(&value).ok(), u8::try_from(n).ok());
        prop_assert_eq!(i16::decoder().decode_json(&value).ok(), i16::try_from(n).ok());
        prop_assert_eq!(u16::decoder().decode_json(&value).ok(), u16::try_from(n).ok());
        prop_assert_eq!(i32::decoder().decode_json(&value).ok(), i32::try_from(n).ok());
        prop_assert_eq!(u32::decoder().decode_json(&value).ok(), u32::try_from(n).ok());
        prop_assert_eq!(u64::decoder().decode_json(&value).ok(), u64::try_from(n).ok());
        prop_assert_eq!(i64::decoder().decode_json(&value).ok(), Some(n));
        prop_assert_eq!(i128::decoder().decode_json(&value).ok(), Some(i128::from(n)));
    }

    #[test]
    fn unsigned_decoding_matches_casts(n in any::<u64>()) {
        let value = json!(n);
        prop_assert_eq!(i64::decoder().decode_json(&value).ok(), i64::try_from(n).ok());
        prop_assert_eq!(u64::decoder().decode_json(&value).ok(), Some(n));
        prop_assert_eq!(usize::decoder().decode_json(&value).ok(), usize::try_from(n).ok());
    }

    #[test]
    fn fractional_numbers_are_not_integral(n in -1.0e6_f64..1.0e6, offset in 0.01_f64..0.99) {
        let value = json!(n.trunc() + offset.copysign(n));
        prop_assert!(i32::decoder().decode_json(&value).is_err());
        prop_assert!(i64::decoder().decode_json(&value).is_err());
    }

    #[test]
    fn f64_from_string(x in any::<f64>().prop_filter("Finite", |x| x.is_finite())) {
        let decoded = f64::decoder().decode_json(&json!(x.to_string()));
        prop_assert_eq!(decoded.map(f64::to_bits), Ok(x.to_bits()));
    }

    #[test]
    fn f64_from_number(x in any::<f64>().prop_filter("Finite", |x| x.is_finite())) {
        prop_assert_eq!(f64::decoder().decode_json(&json!(x)), Ok(x));
    }
}
