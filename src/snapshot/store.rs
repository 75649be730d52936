//! Checkpoint file store.
//!
//! The snapshot is a text file, one record per line: `<key> <value>\n`.
//! Neither field may contain whitespace. The file is only ever replaced
//! atomically: write the tmp file, fsync it, rename over the snapshot,
//! fsync the directory. Entries are written in sorted key order so that
//! rewriting the same state produces byte-identical files.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::errors::{SnapshotError, SnapshotResult};

pub struct SnapshotStore {
    db_path: PathBuf,
    tmp_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(db_path: PathBuf, tmp_path: PathBuf) -> Self {
        Self { db_path, tmp_path }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Load every well-formed line. A missing file is an empty snapshot;
    /// malformed lines are logged and skipped.
    pub fn load(&self) -> SnapshotResult<Vec<(String, String)>> {
        let file = match File::open(&self.db_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SnapshotError::io_at(&self.db_path, e)),
        };

        let mut entries = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| SnapshotError::io_at(&self.db_path, e))?;
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(key), Some(value), None) => {
                    entries.push((key.to_string(), value.to_string()));
                }
                _ => {
                    warn!(line = line_no + 1, "skipping malformed snapshot line");
                }
            }
        }
        Ok(entries)
    }

    /// Atomically replace the snapshot with the given entries.
    pub fn write(&self, mut entries: Vec<(String, String)>) -> SnapshotResult<()> {
        entries.sort();

        let tmp = File::create(&self.tmp_path)
            .map_err(|e| SnapshotError::io_at(&self.tmp_path, e))?;
        let mut writer = BufWriter::new(tmp);
        for (key, value) in &entries {
            writeln!(writer, "{key} {value}")
                .map_err(|e| SnapshotError::io_at(&self.tmp_path, e))?;
        }
        let tmp = writer
            .into_inner()
            .map_err(|e| SnapshotError::io_at(&self.tmp_path, e.into()))?;
        tmp.sync_all()
            .map_err(|e| SnapshotError::io_at(&self.tmp_path, e))?;

        std::fs::rename(&self.tmp_path, &self.db_path).map_err(|e| {
            SnapshotError::io(
                format!(
                    "failed to rename {} over {}",
                    self.tmp_path.display(),
                    self.db_path.display()
                ),
                e,
            )
        })?;

        self.fsync_parent_dir()
    }

    /// Make the rename durable.
    fn fsync_parent_dir(&self) -> SnapshotResult<()> {
        let Some(dir) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        let handle = OpenOptions::new()
            .read(true)
            .open(dir)
            .map_err(|e| SnapshotError::io_at(dir, e))?;
        handle
            .sync_all()
            .map_err(|e| SnapshotError::io(format!("fsync directory {}", dir.display()), e))
    }
}
