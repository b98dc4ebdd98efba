//! ManagedStorageArea - a read-only view over another area.
//!
//! Reads delegate to the inner area; `set`, `remove` and `clear` always fail
//! with [`StorageError::CannotMutate`] and never reach it.

use crate::codec::Value;
use crate::error::StorageError;
use crate::events::OnChanged;
use crate::quota::Quota;
use crate::snapshot::Snapshot;

use super::{ByteKeys, GetKeys, InMemoryStorageArea, Items, KeyList, StorageArea};

#[derive(Debug, Clone)]
pub struct ManagedStorageArea<A = InMemoryStorageArea> {
    inner: A,
}

impl<A: StorageArea> ManagedStorageArea<A> {
    pub fn new(inner: A) -> Self {
        ManagedStorageArea { inner }
    }

    /// Access the inner area, which is still writable.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl ManagedStorageArea {
    /// The `managed` area, holding `initial` and nothing else, ever.
    pub fn managed(initial: Snapshot) -> Self {
        Self::new(
            InMemoryStorageArea::builder()
                .name("managed")
                .snapshot(initial)
                .build(),
        )
    }
}

impl<A: StorageArea> StorageArea for ManagedStorageArea<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn quota(&self) -> Quota {
        self.inner.quota()
    }

    fn on_changed(&self) -> &OnChanged {
        self.inner.on_changed()
    }

    fn get<K>(&self, keys: K) -> Result<Items, StorageError>
    where
        K: TryInto<GetKeys>,
        StorageError: From<K::Error>,
    {
        self.inner.get(keys)
    }

    fn get_keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.get_keys()
    }

    fn get_bytes_in_use<K>(&self, keys: K) -> Result<usize, StorageError>
    where
        K: TryInto<ByteKeys>,
        StorageError: From<K::Error>,
    {
        self.inner.get_bytes_in_use(keys)
    }

    fn set<I, K, V>(&self, _items: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Err(StorageError::CannotMutate { operation: "set" })
    }

    fn remove<K>(&self, _keys: K) -> Result<(), StorageError>
    where
        K: TryInto<KeyList>,
        StorageError: From<K::Error>,
    {
        Err(StorageError::CannotMutate { operation: "remove" })
    }

    fn clear(&self) -> Result<(), StorageError> {
        Err(StorageError::CannotMutate { operation: "clear" })
    }

    fn set_access_level(&self, level: super::AccessLevel) -> Result<(), StorageError> {
        self.inner.set_access_level(level)
    }
}
