//! MVCC vocabulary: timestamps, versions, per-key records, the live
//! transaction registry, and version garbage collection.

pub mod gc;
pub mod live_set;
pub mod record;
pub mod timestamp;
pub mod version;

pub use live_set::LiveTxSet;
pub use record::{OwnedChainGuard, Record};
pub use timestamp::TimestampGenerator;
pub use version::{Version, VersionChain};
