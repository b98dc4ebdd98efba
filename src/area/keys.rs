//! Argument shapes for `get`, `getBytesInUse` and `remove`.
//!
//! Typed Rust arguments convert infallibly. Dynamic [`Value`] and JSON
//! arguments go through `TryFrom` and fail with the host's type errors.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::codec::{deserialize, serialize_at, Position, Value};
use crate::error::StorageError;

/// The keys requested by `get`.
#[derive(Debug, Clone, PartialEq)]
pub enum GetKeys {
    /// Every stored key.
    All,
    Keys(Vec<String>),
    /// Keys with per-key defaults. `None` requests the key without a default.
    Defaults(IndexMap<String, Option<JsonValue>>),
}

impl GetKeys {
    /// Resolves to `(key, default)` pairs against the stored keys.
    pub(crate) fn resolve<'a>(
        self,
        stored: impl Iterator<Item = &'a str>,
    ) -> Vec<(String, Option<JsonValue>)> {
        match self {
            GetKeys::All => stored.map(|key| (key.to_string(), None)).collect(),
            GetKeys::Keys(keys) => keys.into_iter().map(|key| (key, None)).collect(),
            GetKeys::Defaults(defaults) => defaults.into_iter().collect(),
        }
    }
}

/// The keys measured by `getBytesInUse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteKeys {
    All,
    Keys(Vec<String>),
}

/// The keys removed by `remove`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyList(pub Vec<String>);

macro_rules! key_conversions {
    ($target:ty, $wrap:expr) => {
        impl From<&str> for $target {
            fn from(key: &str) -> Self {
                $wrap(vec![key.to_string()])
            }
        }

        impl From<String> for $target {
            fn from(key: String) -> Self {
                $wrap(vec![key])
            }
        }

        impl From<Vec<String>> for $target {
            fn from(keys: Vec<String>) -> Self {
                $wrap(keys)
            }
        }

        impl From<Vec<&str>> for $target {
            fn from(keys: Vec<&str>) -> Self {
                $wrap(keys.into_iter().map(str::to_string).collect())
            }
        }

        impl From<&[&str]> for $target {
            fn from(keys: &[&str]) -> Self {
                $wrap(keys.iter().map(|k| k.to_string()).collect())
            }
        }

        impl<const N: usize> From<[&str; N]> for $target {
            fn from(keys: [&str; N]) -> Self {
                $wrap(keys.iter().map(|k| k.to_string()).collect())
            }
        }
    };
}

key_conversions!(GetKeys, GetKeys::Keys);
key_conversions!(ByteKeys, ByteKeys::Keys);
key_conversions!(KeyList, KeyList);

impl From<IndexMap<String, JsonValue>> for GetKeys {
    fn from(defaults: IndexMap<String, JsonValue>) -> Self {
        GetKeys::Defaults(defaults.into_iter().map(|(k, v)| (k, Some(v))).collect())
    }
}

impl From<serde_json::Map<String, JsonValue>> for GetKeys {
    fn from(defaults: serde_json::Map<String, JsonValue>) -> Self {
        GetKeys::Defaults(defaults.into_iter().map(|(k, v)| (k, Some(v))).collect())
    }
}

const GET_NO_MATCH: &str = "Error in invocation of storage.get(optional [string|array|object] keys, function callback): Error at parameter \"keys\": Value did not match any choice.";
const GET_SHAPE: &str = "get() Argument 1 must be a string, string[] or an object of key/value pairs.";
const BYTES_SHAPE: &str = "getBytesInUse() Argument 1 must be null, string, or string[].";
const REMOVE_SHAPE: &str = "remove() Argument 1 must be a string or string[].";

fn non_string_element(shape: &str, index: usize, type_name: &str) -> StorageError {
    StorageError::Type(format!(
        "{} Received an array with a non-string element at index {}: {}",
        shape, index, type_name
    ))
}

fn wrong_type(shape: &str, type_name: &str) -> StorageError {
    StorageError::Type(format!("{} Received: {}", shape, type_name))
}

/// Every element must be a string; the first that is not is reported.
fn string_elements(shape: &str, elements: &[Value]) -> Result<Vec<String>, StorageError> {
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| match element {
            Value::String(key) => Ok(key.clone()),
            Value::Shared(shared) => match &*shared.borrow() {
                Value::String(key) => Ok(key.clone()),
                other => Err(non_string_element(shape, index, other.type_name())),
            },
            other => Err(non_string_element(shape, index, other.type_name())),
        })
        .collect()
}

/// A default as `get` would hand it back: the stored form of the value when
/// it has one.
fn default_value(value: &Value) -> Result<Option<JsonValue>, StorageError> {
    match serialize_at(value, Position::ObjectProperty)? {
        Some(text) => Ok(Some(deserialize(&text)?)),
        None => Ok(None),
    }
}

impl TryFrom<Value> for GetKeys {
    type Error = StorageError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Undefined | Value::Null => Ok(GetKeys::All),
            Value::String(key) => Ok(GetKeys::Keys(vec![key])),
            Value::Array(elements) => Ok(GetKeys::Keys(string_elements(GET_SHAPE, &elements)?)),
            Value::Object(properties) => {
                let mut defaults = IndexMap::with_capacity(properties.len());
                for (key, default) in &properties {
                    defaults.insert(key.clone(), default_value(default)?);
                }
                Ok(GetKeys::Defaults(defaults))
            }
            Value::Shared(shared) => GetKeys::try_from(shared.borrow().clone()),
            _ => Err(StorageError::Type(GET_NO_MATCH.to_string())),
        }
    }
}

impl TryFrom<Value> for ByteKeys {
    type Error = StorageError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(ByteKeys::All),
            Value::String(key) => Ok(ByteKeys::Keys(vec![key])),
            Value::Array(elements) => {
                Ok(ByteKeys::Keys(string_elements(BYTES_SHAPE, &elements)?))
            }
            Value::Shared(shared) => ByteKeys::try_from(shared.borrow().clone()),
            other => Err(wrong_type(BYTES_SHAPE, other.type_name())),
        }
    }
}

impl TryFrom<Value> for KeyList {
    type Error = StorageError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(key) => Ok(KeyList(vec![key])),
            Value::Array(elements) => Ok(KeyList(string_elements(REMOVE_SHAPE, &elements)?)),
            Value::Shared(shared) => KeyList::try_from(shared.borrow().clone()),
            other => Err(wrong_type(REMOVE_SHAPE, other.type_name())),
        }
    }
}

impl TryFrom<JsonValue> for GetKeys {
    type Error = StorageError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Object(defaults) => Ok(GetKeys::from(defaults)),
            other => GetKeys::try_from(Value::from(other)),
        }
    }
}

impl TryFrom<JsonValue> for ByteKeys {
    type Error = StorageError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        ByteKeys::try_from(Value::from(value))
    }
}

impl TryFrom<JsonValue> for KeyList {
    type Error = StorageError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        KeyList::try_from(Value::from(value))
    }
}
