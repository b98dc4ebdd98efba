use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::Snapshot;

/// One side of a change: whether the key existed and its decoded value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryState {
    pub exists: bool,
    /// `Null` when the key did not exist.
    pub value: JsonValue,
}

impl EntryState {
    pub fn absent() -> Self {
        EntryState {
            exists: false,
            value: JsonValue::Null,
        }
    }

    pub fn present(value: JsonValue) -> Self {
        EntryState {
            exists: true,
            value,
        }
    }

    /// The value if the key existed.
    pub fn into_option(self) -> Option<JsonValue> {
        self.exists.then_some(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub before: EntryState,
    pub after: EntryState,
}

/// Equality of decoded values, with numbers compared by value at any depth.
///
/// `serde_json` keeps `1` and `1.0` apart; the host does not.
pub fn values_equal(left: &JsonValue, right: &JsonValue) -> bool {
    match (left, right) {
        (JsonValue::Number(l), JsonValue::Number(r)) => match (l.as_f64(), r.as_f64()) {
            (Some(l), Some(r)) => l == r,
            _ => l == r,
        },
        (JsonValue::Array(l), JsonValue::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| values_equal(l, r))
        }
        (JsonValue::Object(l), JsonValue::Object(r)) => {
            l.len() == r.len()
                && l
                    .iter()
                    .all(|(key, l)| r.get(key).is_some_and(|r| values_equal(l, r)))
        }
        _ => left == right,
    }
}

/// Modified keys only, in the order they were first seen.
pub type ChangeSet = IndexMap<String, Change>;

/// The outcome of a snapshot mutation. `before` is untouched; `after` is the
/// proposed replacement.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub before: Snapshot,
    pub after: Snapshot,
    pub changes: ChangeSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_compare_by_value() {
        let one: JsonValue = serde_json::from_str("1.0").unwrap();
        assert_ne!(one, json!(1));
        assert!(values_equal(&one, &json!(1)));
        assert!(values_equal(&json!(100), &serde_json::from_str("1e2").unwrap()));
        assert!(!values_equal(&json!(1), &json!(2)));
    }

    #[test]
    fn containers_compare_members() {
        let nested: JsonValue = serde_json::from_str(r#"{"a":[1.0,{"b":2.0}]}"#).unwrap();
        assert!(values_equal(&nested, &json!({"a": [1, {"b": 2}]})));
        assert!(!values_equal(&nested, &json!({"a": [1]})));
        assert!(!values_equal(&json!({"a": 1}), &json!({"b": 1})));
        assert!(values_equal(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})));
        assert!(!values_equal(&json!("1"), &json!(1)));
    }
}
