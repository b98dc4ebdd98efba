//! Encoding properties checked over generated inputs.

use mock_storagearea::codec::{deserialize, serialize};
use mock_storagearea::{Snapshot, Value};
use proptest::prelude::*;
use serde_json::{json, Value as JsonValue};

fn decode(value: Value) -> JsonValue {
    let text = serialize(&value)
        .unwrap()
        .expect("representable values are never omitted");
    deserialize(&text).unwrap()
}

fn finite_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        any::<u64>().prop_map(f64::from_bits).prop_filter("finite", |n| n.is_finite()),
        any::<i64>().prop_map(|n| n as f64),
        -1e6..1e6f64,
    ]
}

fn unrepresentable() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Number(f64::NAN)),
        Just(Value::Number(f64::INFINITY)),
        Just(Value::Number(f64::NEG_INFINITY)),
        Just(Value::Undefined),
        proptest::option::of(".*").prop_map(Value::Symbol),
    ]
}

proptest! {
    #[test]
    fn strings_round_trip(s in any::<String>()) {
        prop_assert_eq!(decode(Value::from(s.clone())), JsonValue::String(s));
    }

    #[test]
    fn booleans_round_trip(b in any::<bool>()) {
        prop_assert_eq!(decode(Value::from(b)), JsonValue::Bool(b));
    }

    #[test]
    fn finite_numbers_round_trip(n in finite_f64()) {
        prop_assert_eq!(decode(Value::Number(n)).as_f64(), Some(n));
    }

    #[test]
    fn unrepresentable_values_become_null_in_arrays(v in unrepresentable()) {
        prop_assert_eq!(serialize(&v).unwrap(), None);
        prop_assert_eq!(decode(Value::array([v])), json!([null]));
    }

    #[test]
    fn unrepresentable_properties_are_dropped(
        v in prop_oneof![Just(Value::Undefined), Just(Value::Function(None))],
        key in ".*",
    ) {
        prop_assert_eq!(decode(Value::object([(key, v)])), json!({}));
    }

    #[test]
    fn zero_is_stored_without_sign(negative in any::<bool>()) {
        let zero = if negative { -0.0 } else { 0.0 };
        let stored = serialize(&Value::Number(zero)).unwrap();
        prop_assert_eq!(stored.as_deref(), Some("0"));
    }

    #[test]
    fn reencoding_a_snapshot_records_no_changes(
        entries in proptest::collection::vec(("[a-z]{1,8}", finite_f64()), 0..8),
    ) {
        let snapshot = Snapshot::from_values(entries.clone()).unwrap();
        let mutation = snapshot.set(entries).unwrap();
        prop_assert!(mutation.changes.is_empty());
    }
}
