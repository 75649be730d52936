//! Redo-log record codec.
//!
//! One record, packed back-to-back with its neighbors inside a 4 KiB page:
//!
//! | offset        | size          | field                                  |
//! |---------------|---------------|----------------------------------------|
//! | 0             | 1             | `size` (total record bytes, <= 255)    |
//! | 1             | 1             | `key_len`                              |
//! | 2             | 1             | `cmd`                                  |
//! | 3             | key_len       | key bytes                              |
//! | 3 + key_len   | size - 7 - key_len | value bytes                       |
//! | size - 4      | 4             | CRC32-IEEE of the key bytes (big-endian) |
//!
//! `size` is a single byte, so a record carries at most 248 bytes of
//! key + value. A zero `size` byte is the page terminator; a legitimate
//! record always has `size >= 7`, so the terminator is unambiguous.

use super::errors::{WalError, WalResult};

/// Fixed bytes per record: size + key_len + cmd + CRC32.
pub const RECORD_OVERHEAD: usize = 7;

/// Largest encodable record, dictated by the one-byte size prefix.
pub const MAX_RECORD_SIZE: usize = 255;

/// Logged commands. The wire format reserves 1 for READ, which is never
/// written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Command {
    Insert = 2,
    Update = 3,
    Delete = 4,
}

impl Command {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            2 => Some(Command::Insert),
            3 => Some(Command::Update),
            4 => Some(Command::Delete),
            _ => None,
        }
    }
}

/// A decoded log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub cmd: Command,
    pub key: String,
    pub value: String,
}

/// Outcome of decoding at one page offset.
///
/// A record with a bad checksum still reports how many bytes it occupies,
/// so replay can skip it and keep going; only a terminator or an
/// implausible size byte stops the page.
#[derive(Debug)]
pub enum Decoded {
    /// Zero `size` byte: end of the packed sequence.
    Terminator,
    /// A verified record and the bytes it occupies.
    Record { record: LogRecord, size: usize },
    /// A record that failed verification; `size` bytes should be skipped.
    Skipped { size: usize, error: WalError },
    /// A nonzero `size` byte that cannot start a record. The rest of the
    /// page is unusable.
    Corrupt { size_byte: u8 },
}

/// Total encoded length of a record for the given key and value.
pub fn encoded_len(key: &str, value: &str) -> usize {
    key.len() + value.len() + RECORD_OVERHEAD
}

/// Encode one record into `buf`, which must have room for
/// [`encoded_len`] bytes. Returns the number of bytes written.
pub fn encode_into(buf: &mut [u8], cmd: Command, key: &str, value: &str) -> WalResult<usize> {
    let size = encoded_len(key, value);
    if size > MAX_RECORD_SIZE {
        return Err(WalError::RecordTooLarge {
            key_len: key.len(),
            value_len: value.len(),
            max: MAX_RECORD_SIZE,
        });
    }
    let key_len = key.len();

    buf[0] = size as u8;
    buf[1] = key_len as u8;
    buf[2] = cmd.as_u8();
    buf[3..3 + key_len].copy_from_slice(key.as_bytes());
    buf[3 + key_len..size - 4].copy_from_slice(value.as_bytes());

    let checksum = crc32fast::hash(key.as_bytes());
    buf[size - 4..size].copy_from_slice(&checksum.to_be_bytes());

    Ok(size)
}

/// Decode the record starting at `buf[0]`. `buf` is the remainder of a
/// page, so the terminator and truncation checks are page-relative.
pub fn decode(buf: &[u8]) -> Decoded {
    if buf.is_empty() {
        return Decoded::Terminator;
    }
    let size = buf[0] as usize;
    if size == 0 {
        return Decoded::Terminator;
    }
    if size < RECORD_OVERHEAD || size > buf.len() {
        return Decoded::Corrupt { size_byte: buf[0] };
    }

    let key_len = buf[1] as usize;
    if key_len + RECORD_OVERHEAD > size {
        return Decoded::Corrupt { size_byte: buf[0] };
    }

    let key_bytes = &buf[3..3 + key_len];
    let value_bytes = &buf[3 + key_len..size - 4];

    let mut stored = [0u8; 4];
    stored.copy_from_slice(&buf[size - 4..size]);
    let stored = u32::from_be_bytes(stored);
    let computed = crc32fast::hash(key_bytes);
    if stored != computed {
        return Decoded::Skipped {
            size,
            error: WalError::ChecksumMismatch { stored, computed },
        };
    }

    let cmd = match Command::from_u8(buf[2]) {
        Some(cmd) => cmd,
        None => {
            return Decoded::Skipped {
                size,
                error: WalError::UnknownCommand(buf[2]),
            }
        }
    };

    let (key, value) = match (
        std::str::from_utf8(key_bytes),
        std::str::from_utf8(value_bytes),
    ) {
        (Ok(k), Ok(v)) => (k.to_string(), v.to_string()),
        _ => {
            return Decoded::Skipped {
                size,
                error: WalError::InvalidUtf8,
            }
        }
    };

    Decoded::Record {
        record: LogRecord { cmd, key, value },
        size,
    }
}
