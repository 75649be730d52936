//! Checkpoint file: atomic tmp+rename snapshot of the visible state,
//! the thing that lets recovery truncate the WAL.

pub mod errors;
pub mod store;

pub use errors::{SnapshotError, SnapshotResult};
pub use store::SnapshotStore;
