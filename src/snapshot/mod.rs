//! Snapshots - immutable, copy-on-write views of a storage area.
//!
//! An area never edits its contents in place. Every mutation builds a new
//! [`Snapshot`] and describes the difference as a [`ChangeSet`]; the area then
//! either swaps the new snapshot in or throws it away, so a failed write always
//! leaves the previous snapshot authoritative.

mod change;
mod store;

pub use change::{values_equal, Change, ChangeSet, EntryState, Mutation};
pub use store::{string_length, Snapshot};
