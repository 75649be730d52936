//! Engine API error surface.

use thiserror::Error;

use crate::wal::{WalError, MAX_RECORD_SIZE};

/// Errors returned by the transactional API.
#[derive(Debug, Error)]
pub enum TxError {
    /// Read, update, or delete of an absent or tombstoned key.
    #[error("key doesn't exist")]
    NotFound,

    /// Insert of a live key.
    #[error("key already exists")]
    AlreadyExists,

    /// Commit-time validation failed against a concurrently committed
    /// transaction; staged effects were discarded.
    #[error("commit conflict: aborted by a newer committed transaction")]
    CommitConflict,

    /// The operation would not fit a single log record.
    #[error("record too large: key {key_len} bytes + value {value_len} bytes exceeds the {max}-byte record limit")]
    RecordTooLarge {
        key_len: usize,
        value_len: usize,
        max: usize,
    },

    /// Keys must be non-empty and, like values, free of whitespace, or
    /// the snapshot text format could not represent them.
    #[error("invalid {what}: {reason}")]
    InvalidArgument {
        what: &'static str,
        reason: &'static str,
    },

    /// The WAL append or fsync failed; the commit did not happen.
    #[error("write-ahead log failure")]
    Wal(#[source] WalError),
}

impl From<WalError> for TxError {
    fn from(err: WalError) -> Self {
        match err {
            WalError::RecordTooLarge {
                key_len,
                value_len,
                max,
            } => TxError::RecordTooLarge {
                key_len,
                value_len,
                max,
            },
            other => TxError::Wal(other),
        }
    }
}

impl TxError {
    pub(crate) fn record_too_large(key: &str, value: &str) -> Self {
        TxError::RecordTooLarge {
            key_len: key.len(),
            value_len: value.len(),
            max: MAX_RECORD_SIZE,
        }
    }
}

pub type TxResult<T> = Result<T, TxError>;
