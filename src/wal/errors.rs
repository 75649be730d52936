//! WAL error types.

use std::io;

use thiserror::Error;

/// Errors produced by the record codec and the WAL sink.
#[derive(Debug, Error)]
pub enum WalError {
    /// The encoded record would not fit the one-byte size prefix.
    #[error("record too large: key {key_len} bytes + value {value_len} bytes exceeds the {max}-byte record limit")]
    RecordTooLarge {
        key_len: usize,
        value_len: usize,
        max: usize,
    },

    /// The stored key CRC does not match the key bytes.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// The command byte is not one of the logged commands.
    #[error("unknown command byte {0}")]
    UnknownCommand(u8),

    /// Key or value bytes are not valid UTF-8.
    #[error("record contains invalid UTF-8")]
    InvalidUtf8,

    /// An underlying file operation failed.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl WalError {
    /// Wrap an I/O error with a human-readable context line.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        WalError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for WAL operations.
pub type WalResult<T> = Result<T, WalError>;
