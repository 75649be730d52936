//! The store: index, WAL sink, timestamp generator, live-transaction
//! registry, and the snapshot store, wired together behind the
//! transactional API.

use parking_lot::Mutex;
use tracing::info;

use crate::config::Config;
use crate::index::Index;
use crate::mvcc::{LiveTxSet, TimestampGenerator};
use crate::recovery::{self, RecoveryError, RecoveryResult};
use crate::snapshot::SnapshotStore;
use crate::wal::WalWriter;

use super::transaction::Transaction;

pub struct Database {
    pub(crate) index: Index,
    /// The process-wide WAL mutex: record locks do not serialize
    /// committers with disjoint keys, this does.
    pub(crate) wal: Mutex<WalWriter>,
    pub(crate) live_txs: LiveTxSet,
    ts_gen: TimestampGenerator,
    snapshot: SnapshotStore,
}

impl Database {
    /// Open the store: run startup recovery, leaving the snapshot
    /// authoritative and the WAL empty.
    pub fn open(config: &Config) -> RecoveryResult<Self> {
        let snapshot = SnapshotStore::new(config.db_path(), config.tmp_path());
        let mut wal = WalWriter::open(&config.wal_path()).map_err(RecoveryError::Wal)?;
        let index = Index::new();

        recovery::recover(&snapshot, &mut wal, &index)?;

        Ok(Self {
            index,
            wal: Mutex::new(wal),
            live_txs: LiveTxSet::new(),
            ts_gen: TimestampGenerator::new(),
            snapshot,
        })
    }

    /// Begin a transaction: a fresh timestamp, registered live.
    pub fn begin(&self) -> Transaction<'_> {
        let ts = self.ts_gen.next();
        self.live_txs.register(ts);
        Transaction::new(self, ts)
    }

    /// Checkpoint and empty the WAL. The next start will find an
    /// authoritative snapshot.
    ///
    /// The caller must have quiesced sessions: a commit racing this call
    /// could land between the snapshot write and the WAL truncation and
    /// lose durability. The visible entries are collected before the WAL
    /// mutex is taken because committers hold record locks while they
    /// wait for the WAL.
    pub fn shutdown(&self) -> RecoveryResult<()> {
        info!("shutting down");
        let entries = self.index.visible_entries();
        self.snapshot
            .write(entries)
            .map_err(RecoveryError::Snapshot)?;
        let mut wal = self.wal.lock();
        wal.truncate().map_err(RecoveryError::Wal)?;
        Ok(())
    }

    /// The currently visible `(key, value)` pairs, sorted.
    pub fn dump(&self) -> Vec<(String, String)> {
        self.index.visible_entries()
    }

    /// Number of currently live transactions.
    pub fn live_transactions(&self) -> usize {
        self.live_txs.len()
    }
}
