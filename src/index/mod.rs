//! Concurrent key → record index.
//!
//! The map must offer load-or-store semantics: the read path installs
//! phantom-preventing sentinels and the commit path installs insert
//! placeholders, and in both cases a racing writer's record must win
//! exactly once. DashMap's entry API provides that compare-and-insert.

use std::sync::Arc;

use dashmap::DashMap;

use crate::mvcc::{Record, Version};

#[derive(Debug, Default)]
pub struct Index {
    map: DashMap<String, Arc<Record>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<Record>> {
        self.map.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Return the record for `key`, creating it with `make` if absent.
    /// If two callers race, exactly one `make` result is kept and both
    /// see the same record.
    pub fn load_or_store(&self, key: &str, make: impl FnOnce() -> Record) -> Arc<Record> {
        let entry = self
            .map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(make()));
        Arc::clone(entry.value())
    }

    /// Recovery only: overwrite the record for `key` with a single
    /// recovered version.
    pub fn put_recovered(&self, key: &str, value: String) {
        self.map.insert(
            key.to_string(),
            Arc::new(Record::new(key, Version::recovered(value))),
        );
    }

    /// Recovery only: a replayed DELETE removes the key outright.
    pub fn remove(&self, key: &str) {
        self.map.remove(key);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The currently visible `(key, value)` pairs, sorted by key. Records
    /// whose head is a tombstone are absent by definition.
    ///
    /// Record locks are taken one at a time, after the shard references
    /// have been dropped, so this cannot entangle with a commit holding
    /// record locks.
    pub fn visible_entries(&self) -> Vec<(String, String)> {
        let records: Vec<Arc<Record>> = self
            .map
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let chain = record.lock();
            let head = chain.head();
            if !head.deleted {
                entries.push((record.key().to_string(), head.value.clone()));
            }
        }
        entries.sort();
        entries
    }
}
