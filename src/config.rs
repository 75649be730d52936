//! Store configuration.
//!
//! File names are configuration; there are no environment variables. The
//! defaults reproduce the conventional layout: `seccampdb.db`,
//! `seccampdb.log`, and the checkpoint scratch file `tmp.db`, all in the
//! data directory.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding all three files.
    pub data_dir: PathBuf,
    /// Snapshot (checkpoint) file name.
    pub db_file: String,
    /// Write-ahead log file name.
    pub wal_file: String,
    /// Scratch file the snapshot is staged in before the atomic rename.
    pub tmp_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            db_file: "seccampdb.db".to_string(),
            wal_file: "seccampdb.log".to_string(),
            tmp_file: "tmp.db".to_string(),
        }
    }
}

impl Config {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// A configuration rooted at the given data directory, default file
    /// names.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn wal_path(&self) -> PathBuf {
        self.data_dir.join(&self.wal_file)
    }

    pub fn tmp_path(&self) -> PathBuf {
        self.data_dir.join(&self.tmp_file)
    }
}
