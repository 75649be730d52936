//! 4 KiB page packing.
//!
//! A commit serializes its whole write set into one or more
//! zero-initialized pages. Records are packed back-to-back; the zeroed
//! tail doubles as the terminator, so pages never need an explicit end
//! marker. A write set that does not fit one page spills into the next.

use super::errors::WalResult;
use super::record::{self, Command};

/// Size of one WAL page.
pub const PAGE_SIZE: usize = 4096;

/// A single zeroed page.
pub type Page = [u8; PAGE_SIZE];

/// Packs records into a sequence of pages.
pub struct PageBuilder {
    pages: Vec<Page>,
    cursor: usize,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self {
            pages: vec![[0u8; PAGE_SIZE]],
            cursor: 0,
        }
    }

    /// Append one record, starting a fresh page when the current one is
    /// out of room.
    pub fn push(&mut self, cmd: Command, key: &str, value: &str) -> WalResult<usize> {
        let len = record::encoded_len(key, value);
        if self.cursor + len > PAGE_SIZE {
            self.pages.push([0u8; PAGE_SIZE]);
            self.cursor = 0;
        }
        let page = self
            .pages
            .last_mut()
            .expect("page builder always holds at least one page");
        let written = record::encode_into(&mut page[self.cursor..], cmd, key, value)?;
        self.cursor += written;
        Ok(written)
    }

    /// True if no record has been pushed.
    pub fn is_empty(&self) -> bool {
        self.pages.len() == 1 && self.cursor == 0
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
