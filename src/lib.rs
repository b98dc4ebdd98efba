pub mod area;
pub mod codec;
mod deferred;
mod error;
pub mod events;
pub mod quota;
pub mod snapshot;

pub use area::{
    AccessLevel, ByteKeys, GetKeys, InMemoryStorageArea, InMemoryStorageAreaBuilder, Inspection,
    Items, KeyList, ManagedStorageArea, StorageArea, StorageNamespace,
};
pub use codec::{ChromeCodec, Codec, CodecError, FnCodec, SharedValue, Value};
pub use deferred::{defer, Deferred, DeferredStorageArea};
pub use error::StorageError;
pub use events::{Listener, OnChanged, StorageChange, StorageChanges};
pub use quota::{Ceiling, Clock, ManualClock, Quota, SystemClock, WriteQuota, WriteReservation};
pub use snapshot::{Change, ChangeSet, EntryState, Mutation, Snapshot};
