//! Change notifications.
//!
//! Every area owns an [`OnChanged`] hub. A successful mutation dispatches the
//! modified keys as [`StorageChanges`] together with the area's name, after the
//! new snapshot is in place. Hubs are plain registries with no dependency on
//! any host event system; [`OnChanged::aggregate`] joins several into one.

mod change;
mod hub;

pub use change::{storage_changes, StorageChange, StorageChanges};
pub use hub::{Listener, OnChanged};
