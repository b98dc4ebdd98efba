//! Serialization that reproduces the host's observed storage encoding.
//!
//! The host does not use plain `JSON.stringify`: what happens to a value depends
//! on its type *and* on where it sits. A value that cannot be represented is
//! omitted at the top level and inside objects, but becomes `null` inside
//! arrays (functions), or `null` anywhere nested (`undefined`, symbols,
//! non-finite numbers). Containers are assembled from already-encoded
//! children so nothing is escaped twice.

use serde_json::Value as JsonValue;

use super::{CodecError, Value};

const NULL: &str = "null";
const EMPTY_OBJECT: &str = "{}";

/// Where a value sits relative to its parent container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    TopLevel,
    ArrayElement,
    ObjectProperty,
}

impl Position {
    fn is_nested(self) -> bool {
        self != Position::TopLevel
    }
}

/// Serializes a top-level value. `Ok(None)` means the value must be omitted.
pub fn serialize(value: &Value) -> Result<Option<String>, CodecError> {
    serialize_at(value, Position::TopLevel)
}

/// Serializes a value as if it sat at `position` inside a parent container.
pub fn serialize_at(value: &Value, position: Position) -> Result<Option<String>, CodecError> {
    Serializer::default().serialize(value, position)
}

/// Decodes text produced by [`serialize`].
pub fn deserialize(text: &str) -> Result<JsonValue, CodecError> {
    serde_json::from_str(text).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Formats a finite number the way the host's Number-to-string conversion does.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", n);
    }

    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

fn encode_string(s: &str) -> Result<String, CodecError> {
    serde_json::to_string(s).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Tracks the shared containers on the current path so cycles are caught.
#[derive(Default)]
struct Serializer {
    path: Vec<*const std::cell::RefCell<Value>>,
}

impl Serializer {
    fn serialize(&mut self, value: &Value, position: Position) -> Result<Option<String>, CodecError> {
        match value {
            Value::String(s) => encode_string(s).map(Some),
            Value::Bool(b) => Ok(Some(b.to_string())),
            Value::Number(n) if n.is_finite() => Ok(Some(format_number(*n))),
            Value::Number(_) | Value::Undefined | Value::Symbol(_) => {
                Ok(position.is_nested().then(|| NULL.to_string()))
            }
            Value::Function(_) => {
                Ok((position == Position::ArrayElement).then(|| NULL.to_string()))
            }
            Value::Null => Ok(Some(NULL.to_string())),
            Value::Array(elements) => self.serialize_array(elements).map(Some),
            Value::Object(properties) => self
                .serialize_object(properties.iter().map(|(k, v)| (k.as_str(), v)))
                .map(Some),
            // No own enumerable data properties survive.
            Value::RegExp { .. } | Value::Date(_) | Value::Map(_) | Value::Set(_) => {
                Ok(Some(EMPTY_OBJECT.to_string()))
            }
            Value::ArrayBuffer(_) | Value::TypedArray(_) => Err(CodecError::Unsupported("object")),
            Value::BigInt(_) => Err(CodecError::Unsupported("bigint")),
            Value::Shared(shared) => {
                let ptr = shared.as_ptr();
                if self.path.contains(&ptr) {
                    return Err(CodecError::Cyclic);
                }
                self.path.push(ptr);
                let result = self.serialize(&shared.borrow(), position);
                self.path.pop();
                result
            }
        }
    }

    fn serialize_array(&mut self, elements: &[Value]) -> Result<String, CodecError> {
        let mut encoded = Vec::with_capacity(elements.len());
        for element in elements {
            let item = self.serialize(element, Position::ArrayElement)?;
            encoded.push(item.unwrap_or_else(|| NULL.to_string()));
        }
        Ok(format!("[{}]", encoded.join(",")))
    }

    fn serialize_object<'v>(
        &mut self,
        properties: impl Iterator<Item = (&'v str, &'v Value)>,
    ) -> Result<String, CodecError> {
        let mut encoded = Vec::new();
        for (key, value) in properties {
            if let Some(item) = self.serialize(value, Position::ObjectProperty)? {
                encoded.push(format!("{}:{}", encode_string(key)?, item));
            }
        }
        Ok(format!("{{{}}}", encoded.join(",")))
    }
}
