use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::codec::{Codec, Value};
use crate::error::StorageError;
use crate::events::{storage_changes, OnChanged};
use crate::quota::{Clock, Quota, SystemClock, WriteQuota};
use crate::snapshot::{ChangeSet, Mutation, Snapshot};

use super::{deep_merge, ByteKeys, GetKeys, Items, KeyList, StorageArea};

struct AreaState {
    snapshot: Snapshot,
    writes: WriteQuota,
}

/// An in-memory storage area.
///
/// Clone-friendly via Arc: clones share contents, write tallies and listeners.
#[derive(Clone)]
pub struct InMemoryStorageArea {
    name: Arc<str>,
    state: Arc<RwLock<AreaState>>,
    quota: Quota,
    clock: Arc<dyn Clock>,
    on_changed: OnChanged,
}

/// A point-in-time copy of an area's internals, for debugging and assertions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub snapshot: Snapshot,
    pub write_operations_per_hour: BTreeMap<u64, u64>,
    pub write_operations_per_minute: BTreeMap<u64, u64>,
    pub quota: Quota,
}

impl Default for InMemoryStorageArea {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorageArea {
    /// An empty, unnamed area with no quota.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> InMemoryStorageAreaBuilder {
        InMemoryStorageAreaBuilder::default()
    }

    /// The `local` area with its default quota.
    pub fn local(initial: Snapshot) -> Self {
        Self::builder()
            .name("local")
            .quota(Quota::local())
            .snapshot(initial)
            .build()
    }

    /// The `sync` area with its default quota.
    pub fn sync(initial: Snapshot) -> Self {
        Self::builder()
            .name("sync")
            .quota(Quota::sync())
            .snapshot(initial)
            .build()
    }

    /// The `session` area with its default quota.
    pub fn session(initial: Snapshot) -> Self {
        Self::builder()
            .name("session")
            .quota(Quota::session())
            .snapshot(initial)
            .build()
    }

    /// The live snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::LockPoisoned("snapshot"))?;
        Ok(state.snapshot.clone())
    }

    pub fn inspect(&self) -> Result<Inspection, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::LockPoisoned("inspect"))?;
        Ok(Inspection {
            snapshot: state.snapshot.clone(),
            write_operations_per_hour: state.writes.per_hour().clone(),
            write_operations_per_minute: state.writes.per_minute().clone(),
            quota: self.quota,
        })
    }

    /// Runs one mutating operation and notifies listeners if it commits.
    fn mutate<F>(&self, operation: &'static str, apply: F) -> Result<(), StorageError>
    where
        F: FnOnce(&Snapshot) -> Result<Mutation, StorageError>,
    {
        match self.commit(operation, apply) {
            Ok(changes) => {
                debug!(
                    area = %self.name,
                    operation,
                    keys = changes.len(),
                    "mutation committed"
                );
                self.on_changed
                    .dispatch(&storage_changes(&changes), &self.name)
            }
            Err(err) => {
                match err.ceiling() {
                    Some(ceiling) => warn!(
                        area = %self.name,
                        operation,
                        %ceiling,
                        "mutation rejected: {}",
                        err
                    ),
                    None => debug!(area = %self.name, operation, "mutation rejected: {}", err),
                }
                Err(err)
            }
        }
    }

    /// The write lock is held from the quota check to the swap, and released
    /// before listeners run.
    fn commit<F>(&self, operation: &'static str, apply: F) -> Result<ChangeSet, StorageError>
    where
        F: FnOnce(&Snapshot) -> Result<Mutation, StorageError>,
    {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::LockPoisoned(operation))?;

        let reservation = state.writes.check(
            self.quota.max_write_operations_per_hour,
            self.quota.max_write_operations_per_minute,
            self.clock.now_millis(),
        )?;
        let mutation = apply(&state.snapshot)?;

        reservation.commit(&mut state.writes);
        state.snapshot = mutation.after;
        Ok(mutation.changes)
    }
}

impl StorageArea for InMemoryStorageArea {
    fn name(&self) -> &str {
        &self.name
    }

    fn quota(&self) -> Quota {
        self.quota
    }

    fn on_changed(&self) -> &OnChanged {
        &self.on_changed
    }

    fn get<K>(&self, keys: K) -> Result<Items, StorageError>
    where
        K: TryInto<GetKeys>,
        StorageError: From<K::Error>,
    {
        let keys: GetKeys = keys.try_into()?;
        let snapshot = self.snapshot()?;
        let mut items = Items::new();

        for (key, default) in keys.resolve(snapshot.keys()) {
            if snapshot.has(&key) {
                let value = match (default, snapshot.get(&key)?) {
                    (Some(JsonValue::Object(default)), JsonValue::Object(stored)) => {
                        JsonValue::Object(deep_merge(&default, &stored))
                    }
                    (_, stored) => stored,
                };
                items.insert(key, value);
            } else if let Some(default) = default {
                items.insert(key, default);
            }
        }

        Ok(items)
    }

    fn get_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.snapshot()?.keys().map(str::to_string).collect())
    }

    fn get_bytes_in_use<K>(&self, keys: K) -> Result<usize, StorageError>
    where
        K: TryInto<ByteKeys>,
        StorageError: From<K::Error>,
    {
        let keys: ByteKeys = keys.try_into()?;
        let snapshot = self.snapshot()?;
        Ok(match keys {
            ByteKeys::All => snapshot.total_bytes(),
            ByteKeys::Keys(keys) => keys
                .iter()
                .filter_map(|key| snapshot.item_size(key))
                .sum(),
        })
    }

    fn set<I, K, V>(&self, items: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.mutate("set", |snapshot| {
            let mutation = snapshot.set(items)?;
            self.quota.check_mutation(&mutation)?;
            Ok(mutation)
        })
    }

    fn remove<K>(&self, keys: K) -> Result<(), StorageError>
    where
        K: TryInto<KeyList>,
        StorageError: From<K::Error>,
    {
        let KeyList(keys): KeyList = keys.try_into()?;
        self.mutate("remove", |snapshot| snapshot.delete(&keys))
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.mutate("clear", Snapshot::clear)
    }
}

impl fmt::Debug for InMemoryStorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStorageArea")
            .field("name", &self.name)
            .field("quota", &self.quota)
            .finish_non_exhaustive()
    }
}

/// Builds an [`InMemoryStorageArea`].
///
/// The quota is the base table (unlimited unless set) with `overrides`
/// layered on top.
pub struct InMemoryStorageAreaBuilder {
    name: String,
    snapshot: Option<Snapshot>,
    codec: Option<Arc<dyn Codec>>,
    quota: Quota,
    overrides: Quota,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryStorageAreaBuilder {
    fn default() -> Self {
        InMemoryStorageAreaBuilder {
            name: String::new(),
            snapshot: None,
            codec: None,
            quota: Quota::UNLIMITED,
            overrides: Quota::UNLIMITED,
            clock: Arc::new(SystemClock),
        }
    }
}

impl InMemoryStorageAreaBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Initial contents as already-serialized pairs.
    pub fn entries<K, V, I>(mut self, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.snapshot = Some(Snapshot::from_entries(entries));
        self
    }

    /// Replaces the codec of the initial snapshot.
    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn quota(mut self, quota: Quota) -> Self {
        self.quota = quota;
        self
    }

    pub fn overrides(mut self, overrides: Quota) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn build(self) -> InMemoryStorageArea {
        let snapshot = match (self.snapshot, self.codec) {
            (Some(snapshot), None) => snapshot,
            (Some(snapshot), Some(codec)) => Snapshot::with_codec(codec).with_entries(snapshot.entries()),
            (None, Some(codec)) => Snapshot::with_codec(codec),
            (None, None) => Snapshot::new(),
        };

        InMemoryStorageArea {
            name: Arc::from(self.name),
            state: Arc::new(RwLock::new(AreaState {
                snapshot,
                writes: WriteQuota::new(),
            })),
            quota: self.quota.merge(&self.overrides),
            clock: self.clock,
            on_changed: OnChanged::new(),
        }
    }
}
