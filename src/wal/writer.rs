//! Append-only WAL sink.
//!
//! The file is opened create+append and is never rotated at runtime. A
//! commit appends its pages and fsyncs before it may report success; the
//! recovery orchestrator is the only caller of [`WalWriter::truncate`].
//! Serialization of concurrent committers is the caller's job (the engine
//! keeps the writer behind a process-level mutex).

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::errors::{WalError, WalResult};
use super::page::Page;

pub struct WalWriter {
    path: PathBuf,
    file: File,
}

impl WalWriter {
    /// Open (or create) the WAL file for appending.
    pub fn open(path: &Path) -> WalResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| WalError::io(format!("failed to open WAL file {}", path.display()), e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the given pages and fsync. The commit must not be reported
    /// durable before this returns.
    pub fn append_pages(&mut self, pages: &[Page]) -> WalResult<()> {
        for page in pages {
            self.file
                .write_all(page)
                .map_err(|e| WalError::io("failed to append WAL page", e))?;
        }
        self.file
            .sync_all()
            .map_err(|e| WalError::io("fsync failed after WAL append", e))
    }

    /// Truncate to zero, rewind, fsync. Called by recovery and shutdown
    /// once the snapshot is authoritative.
    pub fn truncate(&mut self) -> WalResult<()> {
        self.file
            .set_len(0)
            .map_err(|e| WalError::io("failed to truncate WAL", e))?;
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| WalError::io("failed to rewind WAL", e))?;
        self.file
            .sync_all()
            .map_err(|e| WalError::io("fsync failed after WAL truncation", e))
    }
}
