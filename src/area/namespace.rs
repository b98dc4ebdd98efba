use crate::error::StorageError;
use crate::events::OnChanged;
use crate::snapshot::Snapshot;

use super::{InMemoryStorageArea, ManagedStorageArea, StorageArea};

/// The four host areas behind one change hub.
#[derive(Debug, Clone)]
pub struct StorageNamespace {
    pub local: InMemoryStorageArea,
    pub sync: InMemoryStorageArea,
    pub session: InMemoryStorageArea,
    pub managed: ManagedStorageArea,
    /// Changes from every area, tagged with the area's name.
    pub on_changed: OnChanged,
}

impl StorageNamespace {
    /// Empty areas with their default quotas.
    pub fn new() -> Result<Self, StorageError> {
        Self::from_areas(
            InMemoryStorageArea::local(Snapshot::new()),
            InMemoryStorageArea::sync(Snapshot::new()),
            InMemoryStorageArea::session(Snapshot::new()),
            ManagedStorageArea::managed(Snapshot::new()),
        )
    }

    pub fn from_areas(
        local: InMemoryStorageArea,
        sync: InMemoryStorageArea,
        session: InMemoryStorageArea,
        managed: ManagedStorageArea,
    ) -> Result<Self, StorageError> {
        let on_changed = OnChanged::aggregate([
            ("local", local.on_changed()),
            ("sync", sync.on_changed()),
            ("session", session.on_changed()),
            ("managed", managed.on_changed()),
        ])?;

        Ok(StorageNamespace {
            local,
            sync,
            session,
            managed,
            on_changed,
        })
    }
}
