use std::fmt;

/// Error type for codec operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value has a type the host refuses to store (binary data, big integers).
    Unsupported(&'static str),
    /// A shared container was re-entered while it was still being serialized.
    Cyclic,
    /// A string could not be encoded as JSON text.
    Encode(String),
    /// The serialized text could not be decoded.
    Decode(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Unsupported(type_name) => {
                write!(f, "Unsupported type passed to serialise: {}", type_name)
            }
            CodecError::Cyclic => write!(f, "Converting circular structure to JSON"),
            CodecError::Encode(message) => write!(f, "serialise error: {}", message),
            CodecError::Decode(message) => write!(f, "deserialise error: {}", message),
        }
    }
}

impl std::error::Error for CodecError {}
