use serde_json::{Map, Value as JsonValue};

/// Merges `over` on top of `under`, recursing where both sides hold objects.
///
/// `get` calls this with the caller's default as `under` and the stored value
/// as `over`, so a default object describes a shape that storage fills in.
/// Keys of `under` come first, then keys only `over` has.
pub fn deep_merge(under: &Map<String, JsonValue>, over: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    let mut merged = Map::new();

    for (key, under_value) in under {
        let value = match (under_value, over.get(key)) {
            (JsonValue::Object(under_inner), Some(JsonValue::Object(over_inner))) => {
                JsonValue::Object(deep_merge(under_inner, over_inner))
            }
            (_, Some(over_value)) => over_value.clone(),
            (under_value, None) => under_value.clone(),
        };
        merged.insert(key.clone(), value);
    }

    for (key, over_value) in over {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), over_value.clone());
        }
    }

    merged
}
