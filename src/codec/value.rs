//! Value - the host-side values the storage API accepts before serialization.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

/// Own enumerable properties of a plain object, in definition order.
pub type Object = IndexMap<String, Value>;

/// A value as extension code would hand it to the storage API.
///
/// Covers every type the serializer treats differently, including the ones it
/// drops (`Undefined`, `Symbol`, `Function`) and the ones it rejects
/// (`BigInt`, `ArrayBuffer`, `TypedArray`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    BigInt(i128),
    /// A symbol with its optional description.
    Symbol(Option<String>),
    /// A function with its optional name.
    Function(Option<String>),
    Array(Vec<Value>),
    Object(Object),
    RegExp { source: String, flags: String },
    /// Milliseconds since the epoch.
    Date(f64),
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    ArrayBuffer(Vec<u8>),
    TypedArray(Vec<u8>),
    /// A container reachable through more than one reference.
    Shared(SharedValue),
}

impl Value {
    /// Builds a plain object from key/value pairs.
    pub fn object<K, V, I>(properties: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Object(
            properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds an array from its elements.
    pub fn array<V, I>(elements: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::Array(elements.into_iter().map(Into::into).collect())
    }

    /// The host's `typeof` name for this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::BigInt(_) => "bigint",
            Value::Symbol(_) => "symbol",
            Value::Function(_) => "function",
            Value::Shared(shared) => shared.borrow().type_name(),
            Value::Null
            | Value::Array(_)
            | Value::Object(_)
            | Value::RegExp { .. }
            | Value::Date(_)
            | Value::Map(_)
            | Value::Set(_)
            | Value::ArrayBuffer(_)
            | Value::TypedArray(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A reference-counted, interior-mutable container.
///
/// Clones point at the same container, which makes aliasing (and cycles)
/// expressible. Equality is reference identity.
#[derive(Clone)]
pub struct SharedValue(Rc<RefCell<Value>>);

impl SharedValue {
    pub fn new(value: Value) -> Self {
        SharedValue(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, Value> {
        self.0.borrow()
    }

    /// Replaces the contents, returning the previous value.
    pub fn replace(&self, value: Value) -> Value {
        self.0.replace(value)
    }

    pub(crate) fn as_ptr(&self) -> *const RefCell<Value> {
        Rc::as_ptr(&self.0)
    }

    pub fn ptr_eq(&self, other: &SharedValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedValue({:p})", self.as_ptr())
    }
}

impl PartialEq for SharedValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<SharedValue> for Value {
    fn from(value: SharedValue) -> Self {
        Value::Shared(value)
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
