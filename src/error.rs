use std::convert::Infallible;
use std::fmt;

use crate::codec::CodecError;
use crate::quota::Ceiling;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Malformed call arguments.
    Type(String),
    /// Direct lookup of a key that is not in the snapshot.
    Range(String),
    QuotaExceeded {
        ceiling: Ceiling,
        message: String,
    },
    /// A mutating call on a read-only area.
    CannotMutate {
        operation: &'static str,
    },
    Codec(CodecError),
    /// Quota configuration could not be parsed.
    Config(String),
    LockPoisoned(&'static str),
}

impl StorageError {
    /// Whether the host would surface this failure as a `TypeError`.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            StorageError::Type(_) | StorageError::Codec(CodecError::Unsupported(_))
        )
    }

    /// The ceiling named by a quota failure.
    pub fn ceiling(&self) -> Option<Ceiling> {
        match self {
            StorageError::QuotaExceeded { ceiling, .. } => Some(*ceiling),
            _ => None,
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Type(message) | StorageError::Range(message) => f.write_str(message),
            StorageError::QuotaExceeded { message, .. } => f.write_str(message),
            StorageError::CannotMutate { operation } => {
                write!(f, "{}() Cannot mutate a managed storage area.", operation)
            }
            StorageError::Codec(err) => write!(f, "{}", err),
            StorageError::Config(message) => write!(f, "invalid quota configuration: {}", message),
            StorageError::LockPoisoned(operation) => {
                write!(f, "storage area lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CodecError> for StorageError {
    fn from(err: CodecError) -> Self {
        StorageError::Codec(err)
    }
}

impl From<Infallible> for StorageError {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}
