//! Monotonic transaction timestamps.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out unique, strictly increasing timestamps. Recovered versions
/// carry timestamp 0, so live transactions start at 1.
#[derive(Debug, Default)]
pub struct TimestampGenerator {
    counter: AtomicU64,
}

impl TimestampGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}
