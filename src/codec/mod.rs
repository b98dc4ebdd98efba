//! Codec - converts host values to and from their stored string form.
//!
//! Every [`Snapshot`](crate::Snapshot) carries one codec pair and hands it to
//! every snapshot derived from it. The default pair, [`ChromeCodec`], mimics
//! the encoding the browser applies (see [`serializer`]); a custom pair can be
//! supplied through [`FnCodec`] or by implementing [`Codec`].

mod error;
pub mod serializer;
mod value;

use std::fmt;

use serde_json::Value as JsonValue;

pub use error::CodecError;
pub use serializer::{deserialize, format_number, serialize, serialize_at, Position};
pub use value::{Object, SharedValue, Value};

/// A serialize/deserialize pair used consistently by a snapshot lineage.
pub trait Codec: Send + Sync {
    /// Encodes a value. `Ok(None)` is the omit marker: the value has no
    /// stored representation and the key should be left alone.
    fn serialize(&self, value: &Value) -> Result<Option<String>, CodecError>;

    /// Decodes a stored string.
    fn deserialize(&self, text: &str) -> Result<JsonValue, CodecError>;
}

/// The host's storage encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeCodec;

impl Codec for ChromeCodec {
    fn serialize(&self, value: &Value) -> Result<Option<String>, CodecError> {
        serialize(value)
    }

    fn deserialize(&self, text: &str) -> Result<JsonValue, CodecError> {
        deserialize(text)
    }
}

/// A codec assembled from two functions.
pub struct FnCodec<S, D> {
    serialize: S,
    deserialize: D,
}

impl<S, D> FnCodec<S, D>
where
    S: Fn(&Value) -> Result<Option<String>, CodecError> + Send + Sync,
    D: Fn(&str) -> Result<JsonValue, CodecError> + Send + Sync,
{
    pub fn new(serialize: S, deserialize: D) -> Self {
        FnCodec {
            serialize,
            deserialize,
        }
    }
}

impl<S, D> Codec for FnCodec<S, D>
where
    S: Fn(&Value) -> Result<Option<String>, CodecError> + Send + Sync,
    D: Fn(&str) -> Result<JsonValue, CodecError> + Send + Sync,
{
    fn serialize(&self, value: &Value) -> Result<Option<String>, CodecError> {
        (self.serialize)(value)
    }

    fn deserialize(&self, text: &str) -> Result<JsonValue, CodecError> {
        (self.deserialize)(text)
    }
}

impl<S, D> fmt::Debug for FnCodec<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCodec")
    }
}
