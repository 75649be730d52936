//! Startup recovery orchestration.
//!
//! In order: load the snapshot, replay the WAL over it, rewrite the
//! snapshot atomically, truncate the WAL. After the last step the
//! snapshot alone is authoritative, which is exactly the state shutdown
//! re-establishes by running the final two steps again. The whole
//! procedure is idempotent: a crash between any two steps just means the
//! next startup repeats work.

use tracing::info;

use crate::index::Index;
use crate::snapshot::SnapshotStore;
use crate::wal::WalWriter;

use super::errors::RecoveryResult;
use super::replay::{self, ReplayStats};

/// Rebuild `index` from disk and leave the on-disk state checkpointed
/// with an empty WAL.
pub fn recover(
    snapshot: &SnapshotStore,
    wal: &mut WalWriter,
    index: &Index,
) -> RecoveryResult<ReplayStats> {
    // 1. Snapshot → memory.
    let entries = snapshot.load()?;
    let from_snapshot = entries.len();
    for (key, value) in entries {
        index.put_recovered(&key, value);
    }

    // 2. WAL → memory.
    let stats = replay::replay(wal.path(), index)?;

    // 3 + 4. Memory → snapshot, then empty the WAL.
    checkpoint(snapshot, wal, index)?;

    info!(
        snapshot_entries = from_snapshot,
        wal_records = stats.applied,
        wal_skipped = stats.skipped,
        keys = index.len(),
        "recovery complete"
    );
    Ok(stats)
}

/// Steps 3 and 4 alone: rewrite the snapshot atomically and truncate the
/// WAL. Shutdown's whole job.
pub fn checkpoint(
    snapshot: &SnapshotStore,
    wal: &mut WalWriter,
    index: &Index,
) -> RecoveryResult<()> {
    snapshot.write(index.visible_entries())?;
    wal.truncate()?;
    Ok(())
}
