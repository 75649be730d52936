//! Recovery error types.

use thiserror::Error;

use crate::snapshot::SnapshotError;
use crate::wal::WalError;

/// A failure that aborts startup (or shutdown checkpointing).
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("snapshot failure during recovery")]
    Snapshot(#[from] SnapshotError),

    #[error("WAL failure during recovery")]
    Wal(#[from] WalError),
}

pub type RecoveryResult<T> = Result<T, RecoveryError>;
