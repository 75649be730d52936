//! Registry of live transaction timestamps.
//!
//! GC reads the minimum at every commit; begin/end mutate it. Reads far
//! outnumber writes, hence the read/write lock.

use std::collections::BTreeSet;

use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct LiveTxSet {
    timestamps: RwLock<BTreeSet<u64>>,
}

impl LiveTxSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, ts: u64) {
        self.timestamps.write().insert(ts);
    }

    pub fn deregister(&self, ts: u64) {
        self.timestamps.write().remove(&ts);
    }

    /// Minimum live timestamp, `None` when no transaction is active.
    pub fn min_ts(&self) -> Option<u64> {
        self.timestamps.read().iter().next().copied()
    }

    pub fn len(&self) -> usize {
        self.timestamps.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_tracks_registrations() {
        let live = LiveTxSet::new();
        assert_eq!(live.min_ts(), None);

        live.register(5);
        live.register(3);
        live.register(9);
        assert_eq!(live.min_ts(), Some(3));

        live.deregister(3);
        assert_eq!(live.min_ts(), Some(5));

        live.deregister(5);
        live.deregister(9);
        assert_eq!(live.min_ts(), None);
    }
}
