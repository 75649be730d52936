//! WAL replay.
//!
//! Replay walks the log page by page; within a page, record by record
//! until the zero terminator. No MVCC is reconstructed: only the final
//! durable state matters, so INSERT/UPDATE apply last-writer-wins and
//! DELETE removes the key outright. A record with a bad CRC is skipped —
//! the rest of its page is still processed — and an implausible size
//! byte abandons that page's tail.

use std::path::Path;

use tracing::warn;

use crate::index::Index;
use crate::wal::record::{self, Command, Decoded};
use crate::wal::{WalPageReader, PAGE_SIZE};

use super::errors::RecoveryResult;

/// Counters reported by one replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub pages: u64,
    pub applied: u64,
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub skipped: u64,
}

/// Replay the WAL at `path` into `index`.
pub fn replay(path: &Path, index: &Index) -> RecoveryResult<ReplayStats> {
    let mut reader = WalPageReader::open(path)?;
    let mut stats = ReplayStats::default();

    while let Some(page) = reader.next_page()? {
        stats.pages += 1;
        let mut offset = 0;
        while offset < PAGE_SIZE {
            match record::decode(&page[offset..]) {
                Decoded::Terminator => break,
                Decoded::Record { record, size } => {
                    stats.applied += 1;
                    match record.cmd {
                        Command::Insert => stats.inserts += 1,
                        Command::Update => stats.updates += 1,
                        Command::Delete => stats.deletes += 1,
                    }
                    apply(index, record.cmd, &record.key, record.value);
                    offset += size;
                }
                Decoded::Skipped { size, error } => {
                    warn!(page = stats.pages, offset, %error, "skipping WAL record");
                    stats.skipped += 1;
                    offset += size;
                }
                Decoded::Corrupt { size_byte } => {
                    warn!(
                        page = stats.pages,
                        offset, size_byte, "corrupt WAL page tail, abandoning page"
                    );
                    break;
                }
            }
        }
    }
    Ok(stats)
}

fn apply(index: &Index, cmd: Command, key: &str, value: String) {
    match cmd {
        Command::Insert | Command::Update => index.put_recovered(key, value),
        Command::Delete => index.remove(key),
    }
}
