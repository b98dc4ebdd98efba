//! Storage areas - the host-facing operations over a snapshot, a quota and a
//! change hub.
//!
//! [`InMemoryStorageArea`] is the engine. Every mutating call follows the same
//! path: check the write-rate quota, build the proposed snapshot, check the
//! content ceilings, then swap the snapshot in and notify. A failure at any
//! step leaves the area exactly as it was.
//!
//! [`ManagedStorageArea`] wraps any area and refuses every mutation.

mod in_memory;
mod keys;
mod managed;
mod merge;
mod namespace;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::codec::Value;
use crate::error::StorageError;
use crate::events::OnChanged;
use crate::quota::{Ceiling, Quota};

pub use in_memory::{InMemoryStorageArea, InMemoryStorageAreaBuilder, Inspection};
pub use keys::{ByteKeys, GetKeys, KeyList};
pub use managed::ManagedStorageArea;
pub use merge::deep_merge;
pub use namespace::StorageNamespace;

/// Values returned by `get`, keyed in request order.
pub type Items = IndexMap<String, JsonValue>;

/// Which contexts may use an area. Accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    #[default]
    TrustedContexts,
    TrustedAndUntrustedContexts,
}

/// The operations of one storage area.
///
/// Key arguments accept typed Rust values (`&str`, `Vec<String>`, ...) or a
/// dynamic [`Value`]; malformed dynamic arguments fail with
/// [`StorageError::Type`].
pub trait StorageArea {
    /// The name passed to change listeners.
    fn name(&self) -> &str;

    /// The merged quota table.
    fn quota(&self) -> Quota;

    fn on_changed(&self) -> &OnChanged;

    /// Reads the requested keys. Keys that are absent and have no default are
    /// left out of the result.
    fn get<K>(&self, keys: K) -> Result<Items, StorageError>
    where
        K: TryInto<GetKeys>,
        StorageError: From<K::Error>;

    fn get_keys(&self) -> Result<Vec<String>, StorageError>;

    /// Bytes used by the requested keys. Missing keys count as zero.
    fn get_bytes_in_use<K>(&self, keys: K) -> Result<usize, StorageError>
    where
        K: TryInto<ByteKeys>,
        StorageError: From<K::Error>;

    fn set<I, K, V>(&self, items: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>;

    fn remove<K>(&self, keys: K) -> Result<(), StorageError>
    where
        K: TryInto<KeyList>,
        StorageError: From<K::Error>;

    fn clear(&self) -> Result<(), StorageError>;

    fn set_access_level(&self, _level: AccessLevel) -> Result<(), StorageError> {
        Ok(())
    }

    /// The finite ceilings, surfaced the way the host exposes them as fields.
    fn quota_limits(&self) -> Vec<(Ceiling, u64)> {
        self.quota().finite_limits()
    }
}
