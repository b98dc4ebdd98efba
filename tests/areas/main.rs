//! Integration tests for storage areas: quotas, defaults, notifications and
//! the read-only area.

mod recorder;

use mock_storagearea::{
    ByteKeys, Ceiling, GetKeys, InMemoryStorageArea, ManagedStorageArea, ManualClock, Quota,
    Snapshot, StorageArea, StorageChange, StorageError, Value,
};
use recorder::Recorder;
use serde_json::json;
use std::time::Duration;

fn area_with(overrides: Quota) -> (InMemoryStorageArea, ManualClock) {
    let clock = ManualClock::new(1_700_000_000_000);
    let area = InMemoryStorageArea::builder()
        .name("local")
        .overrides(overrides)
        .clock(clock.clone())
        .build();
    (area, clock)
}

#[test]
fn quota_failure_leaves_area_untouched() {
    let (area, _) = area_with(Quota {
        quota_bytes_per_item: Some(32),
        ..Quota::UNLIMITED
    });
    area.set([("a", "original")]).unwrap();

    let recorder = Recorder::new();
    area.on_changed().add_listener(&recorder.listener()).unwrap();

    let err = area
        .set([
            ("b", "fits"),
            ("a", "a string that is far too long to fit in thirty-two bytes"),
        ])
        .unwrap_err();

    assert_eq!(err.ceiling(), Some(Ceiling::QuotaBytesPerItem));
    assert!(err.to_string().contains("by property \"a\""));
    assert_eq!(area.get("a").unwrap()["a"], json!("original"));
    assert_eq!(area.get_keys().unwrap(), vec!["a"]);
    assert!(recorder.calls().is_empty());
}

#[test]
fn max_items_is_reported_with_sizes() {
    let (area, _) = area_with(Quota {
        max_items: Some(2),
        ..Quota::UNLIMITED
    });
    area.set([("a", 1), ("b", 2)]).unwrap();

    let err = area.set([("c", 3)]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Quota exceeded: MAX_ITEMS (2) was exceeded. Previous size: 2, new size: 3."
    );

    // Overwriting keeps the count.
    area.set([("a", 10)]).unwrap();
}

#[test]
fn quota_bytes_counts_the_whole_area() {
    let (area, _) = area_with(Quota {
        quota_bytes: Some(10),
        ..Quota::UNLIMITED
    });
    area.set([("a", 1234)]).unwrap();

    let err = area.set([("b", 123456)]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Quota exceeded: QUOTA_BYTES (10) was exceeded. Previous size: 5, new size: 12."
    );
    assert_eq!(area.get_bytes_in_use(ByteKeys::All).unwrap(), 5);
}

#[test]
fn hourly_ceiling_is_reported_before_minute_ceiling() {
    let (area, _) = area_with(Quota {
        max_write_operations_per_hour: Some(2),
        max_write_operations_per_minute: Some(2),
        ..Quota::UNLIMITED
    });

    area.set([("a", 1)]).unwrap();
    area.remove("a").unwrap();
    let err = area.clear().unwrap_err();

    assert_eq!(
        err.to_string(),
        "Quota exceeded: MAX_WRITE_OPERATIONS_PER_HOUR (2) was exceeded."
    );
}

#[test]
fn minute_ceiling_recovers_in_the_next_minute() {
    let (area, clock) = area_with(Quota {
        max_write_operations_per_minute: Some(1),
        ..Quota::UNLIMITED
    });

    area.set([("a", 1)]).unwrap();
    let err = area.set([("a", 2)]).unwrap_err();
    assert_eq!(err.ceiling(), Some(Ceiling::MaxWriteOperationsPerMinute));
    assert_eq!(area.get("a").unwrap()["a"], json!(1));

    clock.advance(Duration::from_secs(60));
    area.set([("a", 2)]).unwrap();
    assert_eq!(area.get("a").unwrap()["a"], json!(2));
}

#[test]
fn removing_missing_keys_still_counts_as_a_write() {
    let (area, _) = area_with(Quota {
        max_write_operations_per_hour: Some(1),
        ..Quota::UNLIMITED
    });
    area.remove(["nothing", "here"]).unwrap();
    assert!(area.set([("a", 1)]).is_err());
}

#[test]
fn defaults_are_filled_from_storage() {
    let area = InMemoryStorageArea::new();
    area.set([(
        "a",
        Value::from(json!({"b": 123, "c": {"d": 123}})),
    )])
    .unwrap();

    let items = area
        .get(json!({"a": {"z": 999, "c": {"e": 4567}}}))
        .unwrap();

    assert_eq!(
        items["a"],
        json!({"b": 123, "z": 999, "c": {"d": 123, "e": 4567}})
    );
}

#[test]
fn defaults_for_absent_keys_are_returned_unchanged() {
    let area = InMemoryStorageArea::new();
    area.set([("present", "yes")]).unwrap();

    let keys = Value::object([
        ("present", Value::from("default")),
        ("absent", Value::object([("nested", Value::from(true))])),
        ("callback", Value::Function(Some("noop".into()))),
    ]);
    let items = area.get(keys).unwrap();

    assert_eq!(items["present"], json!("yes"));
    assert_eq!(items["absent"], json!({"nested": true}));
    assert!(!items.contains_key("callback"));
}

#[test]
fn get_rejects_non_string_array_elements() {
    let area = InMemoryStorageArea::new();
    let err = area
        .get(Value::array([Value::from("a"), Value::Null]))
        .unwrap_err();
    assert!(err.is_type_error());
    assert!(err.to_string().ends_with("at index 1: object"));
}

#[test]
fn bytes_in_use_distinguishes_null_from_missing_argument() {
    let area = InMemoryStorageArea::new();

    assert_eq!(area.get_bytes_in_use(Value::Null).unwrap(), 0);
    assert_eq!(area.get_bytes_in_use(["missing"]).unwrap(), 0);

    let err = area.get_bytes_in_use(Value::Undefined).unwrap_err();
    assert!(matches!(err, StorageError::Type(_)));

    let err = area.get_bytes_in_use(Value::from(42)).unwrap_err();
    assert!(err.to_string().ends_with("Received: number"));
}

#[test]
fn change_notification_carries_old_and_new_values() {
    let area = InMemoryStorageArea::local(Snapshot::from_entries([("apple", "1234")]));
    let recorder = Recorder::new();
    area.on_changed().add_listener(&recorder.listener()).unwrap();

    area.set([("apple", 4567)]).unwrap();

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    let (changes, name) = &calls[0];
    assert_eq!(name, "local");
    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes["apple"],
        StorageChange {
            old_value: Some(json!(1234)),
            new_value: Some(json!(4567)),
        }
    );
}

#[test]
fn removal_and_clear_notify_without_new_values() {
    let area = InMemoryStorageArea::local(Snapshot::from_entries([("a", "1"), ("b", "2")]));
    let recorder = Recorder::new();
    area.on_changed().add_listener(&recorder.listener()).unwrap();

    area.remove("a").unwrap();
    area.clear().unwrap();
    area.clear().unwrap();

    let calls = recorder.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].0["a"].new_value, None);
    assert_eq!(calls[1].0["b"].old_value, Some(json!(2)));
    assert!(calls[2].0.is_empty());
}

#[test]
fn numerically_equal_rewrite_reports_no_change() {
    let area = InMemoryStorageArea::local(Snapshot::from_entries([
        ("n", "1.0"),
        ("m", "{\"big\":1e2}"),
    ]));
    let recorder = Recorder::new();
    area.on_changed().add_listener(&recorder.listener()).unwrap();

    area.set([("n", Value::from(1)), ("m", Value::from(json!({"big": 100})))])
        .unwrap();

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.is_empty());
    assert_eq!(area.snapshot().unwrap().raw("n"), Some("1"));
}

#[test]
fn unserializable_values_are_skipped() {
    let area = InMemoryStorageArea::new();
    area.set([("keep", "me")]).unwrap();
    let recorder = Recorder::new();
    area.on_changed().add_listener(&recorder.listener()).unwrap();

    area.set([("keep", Value::Undefined), ("fn", Value::Function(None))])
        .unwrap();

    assert_eq!(area.get(GetKeys::All).unwrap()["keep"], json!("me"));
    assert_eq!(area.get_keys().unwrap(), vec!["keep"]);
    assert!(recorder.calls()[0].0.is_empty());
}

#[test]
fn unsupported_values_fail_the_whole_set() {
    let area = InMemoryStorageArea::new();
    let err = area
        .set([("a", Value::from(1)), ("b", Value::BigInt(10))])
        .unwrap_err();
    assert!(err.is_type_error());
    assert!(area.get_keys().unwrap().is_empty());
}

#[test]
fn listener_can_read_the_committed_state() {
    let area = InMemoryStorageArea::new();
    let reader = area.clone();
    let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
    let sink = seen.clone();
    area.on_changed()
        .add_listener(&mock_storagearea::Listener::new(move |_, _| {
            *sink.lock().unwrap() = Some(reader.get("a").unwrap());
        }))
        .unwrap();

    area.set([("a", true)]).unwrap();
    let items = seen.lock().unwrap().clone().unwrap();
    assert_eq!(items["a"], json!(true));
}

#[test]
fn managed_area_is_read_only() {
    let area = ManagedStorageArea::managed(Snapshot::from_entries([("policy", "\"strict\"")]));

    for err in [
        area.set([("policy", "lax")]).unwrap_err(),
        area.remove("policy").unwrap_err(),
        area.clear().unwrap_err(),
    ] {
        assert!(err.to_string().contains("Cannot mutate a managed storage area."));
    }

    assert_eq!(area.get("policy").unwrap()["policy"], json!("strict"));
    assert_eq!(area.get_bytes_in_use("policy").unwrap(), 6 + 8);
}

#[test]
fn finite_ceilings_are_surfaced() {
    let sync = InMemoryStorageArea::sync(Snapshot::new());
    let limits = sync.quota_limits();
    assert!(limits.contains(&(Ceiling::QuotaBytesPerItem, 8192)));
    assert!(limits.contains(&(Ceiling::MaxSustainedWriteOperationsPerMinute, 1_000_000)));

    let overridden = InMemoryStorageArea::builder()
        .quota(Quota::local())
        .overrides(Quota::from_json(r#"{"MAX_ITEMS": 3}"#).unwrap())
        .build();
    assert_eq!(
        overridden.quota_limits(),
        vec![(Ceiling::MaxItems, 3), (Ceiling::QuotaBytes, 10_485_760)]
    );
}
