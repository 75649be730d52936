//! Snapshot error types.

use std::io;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl SnapshotError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        SnapshotError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn io_at(path: &Path, source: io::Error) -> Self {
        Self::io(format!("snapshot I/O failed at {}", path.display()), source)
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
