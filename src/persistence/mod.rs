//! Snapshot persistence
//!
//! The engine produces and consumes `GameSnapshot`s; where they are kept is
//! up to a `SnapshotStore` supplied by the caller.

pub mod snapshot;
pub mod store;

pub use snapshot::{GameSnapshot, SNAPSHOT_VERSION};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
