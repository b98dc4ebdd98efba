//! Integration tests for value encoding as seen through snapshots and areas.

mod properties;

use std::sync::Arc;

use mock_storagearea::codec::{serialize, Codec, CodecError, FnCodec};
use mock_storagearea::{
    ChromeCodec, InMemoryStorageArea, SharedValue, Snapshot, StorageArea, StorageError, Value,
};
use serde_json::{json, Value as JsonValue};

#[test]
fn primitives_round_trip_through_an_area() {
    let area = InMemoryStorageArea::new();
    area.set([
        ("s", Value::from("line\nbreak \"quoted\" ✓")),
        ("t", Value::from(true)),
        ("n", Value::from(-12.5)),
        ("big", Value::from(1e21)),
    ])
    .unwrap();

    let items = area.get(["s", "t", "n", "big"]).unwrap();
    assert_eq!(items["s"], json!("line\nbreak \"quoted\" ✓"));
    assert_eq!(items["t"], json!(true));
    assert_eq!(items["n"], json!(-12.5));
    assert_eq!(items["big"].as_f64(), Some(1e21));
}

#[test]
fn dropped_values_become_null_in_arrays() {
    for dropped in [
        Value::from(f64::NAN),
        Value::from(f64::INFINITY),
        Value::from(f64::NEG_INFINITY),
        Value::Undefined,
        Value::Symbol(Some("tag".into())),
    ] {
        let text = serialize(&Value::array([dropped])).unwrap().unwrap();
        assert_eq!(ChromeCodec.deserialize(&text).unwrap(), json!([null]));
    }
}

#[test]
fn dropped_properties_leave_empty_objects() {
    for dropped in [Value::Undefined, Value::Function(Some("f".into()))] {
        let text = serialize(&Value::object([("a", dropped)])).unwrap().unwrap();
        assert_eq!(text, "{}");
    }
}

#[test]
fn negative_zero_is_stored_as_zero() {
    let snapshot = Snapshot::from_values([("pos", 0.0), ("neg", -0.0)]).unwrap();
    assert_eq!(snapshot.raw("pos"), Some("0"));
    assert_eq!(snapshot.raw("neg"), Some("0"));
}

#[test]
fn cyclic_values_are_rejected_by_set() {
    let shared = SharedValue::new(Value::object([("name", "loop")]));
    shared.replace(Value::object([
        ("name", Value::from("loop")),
        ("self", Value::Shared(shared.clone())),
    ]));

    let area = InMemoryStorageArea::new();
    let err = area.set([("loop", Value::Shared(shared))]).unwrap_err();
    assert_eq!(err, StorageError::Codec(CodecError::Cyclic));
    assert!(area.get_keys().unwrap().is_empty());
}

#[test]
fn custom_codec_is_used_for_reads_and_writes() {
    let codec: Arc<dyn Codec> = Arc::new(FnCodec::new(
        |value: &Value| Ok(value.as_str().map(|s| s.chars().rev().collect())),
        |text: &str| Ok(JsonValue::String(text.chars().rev().collect())),
    ));
    let area = InMemoryStorageArea::builder().codec(codec).build();

    area.set([("word", "stressed")]).unwrap();
    assert_eq!(area.snapshot().unwrap().raw("word"), Some("desserts"));
    assert_eq!(area.get("word").unwrap()["word"], json!("stressed"));

    // Non-strings have no encoding under this codec and are skipped.
    area.set([("n", 1)]).unwrap();
    assert_eq!(area.get_keys().unwrap(), vec!["word"]);
}
