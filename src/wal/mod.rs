//! Write-ahead redo log: record codec, page packing, append-only sink,
//! and the page reader used by recovery.

pub mod errors;
pub mod page;
pub mod reader;
pub mod record;
pub mod writer;

pub use errors::{WalError, WalResult};
pub use page::{Page, PageBuilder, PAGE_SIZE};
pub use reader::WalPageReader;
pub use record::{Command, Decoded, LogRecord, MAX_RECORD_SIZE, RECORD_OVERHEAD};
pub use writer::WalWriter;
