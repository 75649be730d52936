//! Page-oriented WAL reader for recovery.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::errors::{WalError, WalResult};
use super::page::{Page, PAGE_SIZE};

/// Reads the WAL as a sequence of 4 KiB pages. A short final page (a
/// crash mid-append) is zero-padded; the zeroed tail terminates it like
/// any other page.
pub struct WalPageReader {
    file: Option<File>,
}

impl WalPageReader {
    /// Open the WAL for replay. A missing file reads as an empty log.
    pub fn open(path: &Path) -> WalResult<Self> {
        match File::open(path) {
            Ok(file) => Ok(Self { file: Some(file) }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self { file: None }),
            Err(e) => Err(WalError::io(
                format!("failed to open WAL file {}", path.display()),
                e,
            )),
        }
    }

    /// Read the next page, or `None` at end of log.
    pub fn next_page(&mut self) -> WalResult<Option<Page>> {
        let Some(file) = self.file.as_mut() else {
            return Ok(None);
        };

        let mut page = [0u8; PAGE_SIZE];
        let mut filled = 0;
        while filled < PAGE_SIZE {
            let n = file
                .read(&mut page[filled..])
                .map_err(|e| WalError::io("failed to read WAL page", e))?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            Ok(None)
        } else {
            Ok(Some(page))
        }
    }
}
