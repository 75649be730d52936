//! Per-key record: the chain head and the lock that guards it.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RawMutex};

use super::version::{Version, VersionChain};

/// An owned chain guard. Commit acquires one per written key, in
/// lexicographic key order, and holds the whole set across WAL append,
/// install, and GC; owning guards sidestep the borrow problem of keeping
/// a guard next to the record it locks.
pub type OwnedChainGuard = parking_lot::lock_api::ArcMutexGuard<RawMutex, VersionChain>;

/// The per-key container. The mutex guards the chain structure and the
/// `r_ts` fields of its versions.
#[derive(Debug)]
pub struct Record {
    key: String,
    chain: Arc<Mutex<VersionChain>>,
}

impl Record {
    pub fn new(key: impl Into<String>, head: Version) -> Self {
        Self {
            key: key.into(),
            chain: Arc::new(Mutex::new(VersionChain::with_head(head))),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrowed lock for short sections (the read path's chain walk).
    pub fn lock(&self) -> MutexGuard<'_, VersionChain> {
        self.chain.lock()
    }

    /// Owned lock for commit's multi-record critical section.
    pub fn lock_owned(&self) -> OwnedChainGuard {
        Mutex::lock_arc(&self.chain)
    }
}
