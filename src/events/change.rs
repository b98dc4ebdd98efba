use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::snapshot::{Change, ChangeSet};

/// What listeners receive for one key. A side is `None` when the key was
/// absent before (or after) the change.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<JsonValue>,
}

impl From<Change> for StorageChange {
    fn from(change: Change) -> Self {
        StorageChange {
            old_value: change.before.into_option(),
            new_value: change.after.into_option(),
        }
    }
}

pub type StorageChanges = IndexMap<String, StorageChange>;

pub fn storage_changes(changes: &ChangeSet) -> StorageChanges {
    changes
        .iter()
        .map(|(key, change)| (key.clone(), StorageChange::from(change.clone())))
        .collect()
}
