use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::codec::{ChromeCodec, Codec, Value};
use crate::error::StorageError;

use super::change::{values_equal, Change, ChangeSet, EntryState, Mutation};

/// Length of a string in UTF-16 code units, the host's notion of `length`.
pub fn string_length(s: &str) -> usize {
    s.encode_utf16().count()
}

/// An immutable view of an area's contents.
///
/// Values are kept only in serialized form and decoded on read. Mutators never
/// touch `self`; they return a [`Mutation`] holding a new snapshot and the
/// changes between the two. Cloning is cheap: the entries and the codec are
/// both shared.
#[derive(Clone)]
pub struct Snapshot {
    data: Arc<IndexMap<String, String>>,
    codec: Arc<dyn Codec>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// An empty snapshot using the host encoding.
    pub fn new() -> Self {
        Self::with_codec(Arc::new(ChromeCodec))
    }

    /// An empty snapshot using a custom codec pair.
    pub fn with_codec(codec: Arc<dyn Codec>) -> Self {
        Snapshot {
            data: Arc::new(IndexMap::new()),
            codec,
        }
    }

    /// A snapshot over already-serialized entries.
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::new().with_entries(entries)
    }

    /// A snapshot holding the serialized form of `items`. Omitted values are skipped.
    pub fn from_values<K, V, I>(items: I) -> Result<Self, StorageError>
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Ok(Self::new().set(items)?.after)
    }

    /// Replaces the entries, keeping the codec. Entries must already be serialized.
    pub fn with_entries<K, V, I>(mut self, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.data = Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    /// Whether both snapshots use the same codec instance.
    pub fn shares_codec(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.codec, &other.codec)
    }

    fn derive(&self, data: IndexMap<String, String>) -> Snapshot {
        Snapshot {
            data: Arc::new(data),
            codec: Arc::clone(&self.codec),
        }
    }

    fn mutation(&self, after: Snapshot) -> Result<Mutation, StorageError> {
        let changes = self.compare(&after)?;
        Ok(Mutation {
            before: self.clone(),
            after,
            changes,
        })
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Decodes the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<JsonValue, StorageError> {
        match self.data.get(key) {
            Some(serialized) => Ok(self.codec.deserialize(serialized)?),
            None => Err(StorageError::Range(format!(
                "key does not exist in store: {}",
                key
            ))),
        }
    }

    /// The serialized form stored under `key`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Serializes and stores each item. An item whose value serializes to the
    /// omit marker is skipped, leaving any existing entry as it was.
    pub fn set<K, V, I>(&self, items: I) -> Result<Mutation, StorageError>
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut data = (*self.data).clone();
        for (key, value) in items {
            if let Some(serialized) = self.codec.serialize(&value.into())? {
                data.insert(key.into(), serialized);
            }
        }
        self.mutation(self.derive(data))
    }

    /// Removes the listed keys. Keys that are not present are ignored.
    pub fn delete<K, I>(&self, keys: I) -> Result<Mutation, StorageError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        let mut data = (*self.data).clone();
        for key in keys {
            data.shift_remove(key.as_ref());
        }
        self.mutation(self.derive(data))
    }

    pub fn clear(&self) -> Result<Mutation, StorageError> {
        self.mutation(self.derive(IndexMap::new()))
    }

    /// Changes that turn `self` into `other`.
    ///
    /// A key is changed when its presence differs or when both sides hold
    /// values that decode unequal. Numbers are equal when numerically equal,
    /// so `1.0` and `1` are the same value. Each side is decoded with its own
    /// codec.
    pub fn compare(&self, other: &Snapshot) -> Result<ChangeSet, StorageError> {
        let mut changes = ChangeSet::new();
        let keys = self
            .data
            .keys()
            .chain(other.data.keys().filter(|k| !self.data.contains_key(*k)));

        for key in keys {
            let before = self.entry_state(key)?;
            let after = other.entry_state(key)?;

            let changed =
                before.exists != after.exists || !values_equal(&before.value, &after.value);
            if changed {
                changes.insert(key.clone(), Change { before, after });
            }
        }

        Ok(changes)
    }

    fn entry_state(&self, key: &str) -> Result<EntryState, StorageError> {
        if self.has(key) {
            Ok(EntryState::present(self.get(key)?))
        } else {
            Ok(EntryState::absent())
        }
    }

    /// Size of every entry: key length plus serialized value length.
    pub fn size_in_bytes(&self) -> IndexMap<String, usize> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), string_length(k) + string_length(v)))
            .collect()
    }

    /// Size of one entry, if present.
    pub fn item_size(&self, key: &str) -> Option<usize> {
        self.data
            .get(key)
            .map(|v| string_length(key) + string_length(v))
    }

    pub fn total_bytes(&self) -> usize {
        self.data
            .iter()
            .map(|(k, v)| string_length(k) + string_length(v))
            .sum()
    }

    pub fn count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Serialized values, in key order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.data.values().map(String::as_str)
    }

    /// `(key, serialized value)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (*self.data).serialize(serializer)
    }
}
