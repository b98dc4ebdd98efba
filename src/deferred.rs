//! Future-returning variants of the area operations.
//!
//! Each operation runs to completion before its future is returned, so the
//! future is always ready. Awaiting it yields the operation's result.

use std::future::{ready, Ready};

use crate::area::{AccessLevel, ByteKeys, GetKeys, Items, KeyList, StorageArea};
use crate::codec::Value;
use crate::error::StorageError;

pub type Deferred<T> = Ready<Result<T, StorageError>>;

/// Runs `op` now and wraps its outcome in a ready future.
pub fn defer<T, F>(op: F) -> Deferred<T>
where
    F: FnOnce() -> Result<T, StorageError>,
{
    ready(op())
}

/// Extension trait adding `*_deferred` methods to every [`StorageArea`].
pub trait DeferredStorageArea: StorageArea + Sized {
    fn get_deferred<K>(&self, keys: K) -> Deferred<Items>
    where
        K: TryInto<GetKeys>,
        StorageError: From<K::Error>,
    {
        defer(|| self.get(keys))
    }

    fn get_keys_deferred(&self) -> Deferred<Vec<String>> {
        defer(|| self.get_keys())
    }

    fn get_bytes_in_use_deferred<K>(&self, keys: K) -> Deferred<usize>
    where
        K: TryInto<ByteKeys>,
        StorageError: From<K::Error>,
    {
        defer(|| self.get_bytes_in_use(keys))
    }

    fn set_deferred<I, K, V>(&self, items: I) -> Deferred<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        defer(|| self.set(items))
    }

    fn remove_deferred<K>(&self, keys: K) -> Deferred<()>
    where
        K: TryInto<KeyList>,
        StorageError: From<K::Error>,
    {
        defer(|| self.remove(keys))
    }

    fn clear_deferred(&self) -> Deferred<()> {
        defer(|| self.clear())
    }

    fn set_access_level_deferred(&self, level: AccessLevel) -> Deferred<()> {
        defer(|| self.set_access_level(level))
    }
}

impl<A: StorageArea> DeferredStorageArea for A {}
