//! Transaction context: read set, write set, and the read/staging
//! protocols.
//!
//! Reads resolve through the write set, then the read set, then the
//! index; a miss in the index installs a sentinel tombstone so a re-read
//! cannot see a key a concurrent transaction establishes in between.
//! Writes only stage; nothing touches a chain until commit. Staging
//! checks pre-conditions against the in-transaction view alone: a
//! violation visible there fails immediately, everything else is settled
//! by commit-time validation.

use std::collections::{BTreeMap, HashMap};

use crate::mvcc::{Record, Version};
use crate::wal::record::{self, Command};
use crate::wal::MAX_RECORD_SIZE;

use super::commit;
use super::db::Database;
use super::errors::{TxError, TxResult};

/// One staged write. The version is unlinked from any chain until commit
/// installs it.
#[derive(Debug, Clone)]
pub(crate) struct Operation {
    pub cmd: Command,
    pub version: Version,
}

/// What a read observed, memoized for the rest of the transaction.
#[derive(Debug, Clone)]
struct Observed {
    value: String,
    deleted: bool,
}

/// Per-key staged operations, ordered; the map's key order is the
/// lock-acquisition order at commit.
pub(crate) type WriteSet = BTreeMap<String, Vec<Operation>>;

pub struct Transaction<'db> {
    db: &'db Database,
    ts: u64,
    write_set: WriteSet,
    read_set: HashMap<String, Observed>,
    finished: bool,
}

impl<'db> Transaction<'db> {
    pub(crate) fn new(db: &'db Database, ts: u64) -> Self {
        Self {
            db,
            ts,
            write_set: WriteSet::new(),
            read_set: HashMap::new(),
            finished: false,
        }
    }

    /// This transaction's timestamp.
    pub fn ts(&self) -> u64 {
        self.ts
    }

    /// Read a key at this transaction's timestamp.
    pub fn read(&mut self, key: &str) -> TxResult<String> {
        validate_key(key)?;

        // 1. Own staged write wins.
        if let Some(ops) = self.write_set.get(key) {
            if let Some(op) = ops.last() {
                return if op.cmd == Command::Delete {
                    Err(TxError::NotFound)
                } else {
                    Ok(op.version.value.clone())
                };
            }
        }

        // 2. Memoized observation.
        if let Some(obs) = self.read_set.get(key) {
            return if obs.deleted {
                Err(TxError::NotFound)
            } else {
                Ok(obs.value.clone())
            };
        }

        // 3. The index. A miss installs a sentinel tombstone; if a writer
        // raced the install, the winner's record is consulted like any
        // existing one.
        let ts = self.ts;
        let record = self
            .db
            .index
            .load_or_store(key, || Record::new(key, Version::sentinel(ts)));

        let observed = {
            let mut chain = record.lock();
            match chain.visible_at_mut(ts) {
                Some(version) => {
                    if version.r_ts < ts {
                        version.r_ts = ts;
                    }
                    Observed {
                        value: version.value.clone(),
                        deleted: version.deleted,
                    }
                }
                // Every reachable version is newer than us: the key did
                // not exist at our timestamp.
                None => Observed {
                    value: String::new(),
                    deleted: true,
                },
            }
        };

        let result = if observed.deleted {
            Err(TxError::NotFound)
        } else {
            Ok(observed.value.clone())
        };
        self.read_set.insert(key.to_string(), observed);
        result
    }

    /// Stage an insert. Fails fast if this transaction already sees the
    /// key as live.
    pub fn insert(&mut self, key: &str, value: &str) -> TxResult<()> {
        validate_key(key)?;
        validate_value(value)?;
        validate_size(key, value)?;

        match self.view(key) {
            View::Live => return Err(TxError::AlreadyExists),
            View::Absent | View::Unknown => {}
        }

        self.stage(key, Command::Insert, value.to_string(), false);
        Ok(())
    }

    /// Stage an update. Fails fast if this transaction already sees the
    /// key as absent; an unknown key stages optimistically and commit
    /// validates.
    pub fn update(&mut self, key: &str, value: &str) -> TxResult<()> {
        validate_key(key)?;
        validate_value(value)?;
        validate_size(key, value)?;

        match self.view(key) {
            View::Absent => return Err(TxError::NotFound),
            View::Live | View::Unknown => {}
        }

        self.stage(key, Command::Update, value.to_string(), false);
        Ok(())
    }

    /// Stage a delete; same optimism as update.
    pub fn delete(&mut self, key: &str) -> TxResult<()> {
        validate_key(key)?;
        validate_size(key, "")?;

        match self.view(key) {
            View::Absent => return Err(TxError::NotFound),
            View::Live | View::Unknown => {}
        }

        self.stage(key, Command::Delete, String::new(), true);
        Ok(())
    }

    /// Run the commit protocol. Always deregisters the timestamp, on
    /// success and failure alike; either way the transaction is over.
    pub fn commit(mut self) -> TxResult<()> {
        self.finished = true;
        let result = if self.write_set.is_empty() {
            // Read-only: nothing to lock, log, or install.
            Ok(())
        } else {
            commit::execute(self.db, self.ts, &self.write_set)
        };
        self.db.live_txs.deregister(self.ts);
        result
    }

    /// Discard both sets. Sentinels installed by reads stay behind as
    /// deleted heads; GC owns them.
    pub fn abort(mut self) {
        self.finished = true;
        self.db.live_txs.deregister(self.ts);
    }

    fn stage(&mut self, key: &str, cmd: Command, value: String, deleted: bool) {
        let version = Version::staged(value, self.ts, deleted);
        self.write_set
            .entry(key.to_string())
            .or_default()
            .push(Operation { cmd, version });
    }

    /// The key's state as far as this transaction can tell without
    /// touching shared structures.
    fn view(&self, key: &str) -> View {
        if let Some(ops) = self.write_set.get(key) {
            if let Some(op) = ops.last() {
                return if op.cmd == Command::Delete {
                    View::Absent
                } else {
                    View::Live
                };
            }
        }
        if let Some(obs) = self.read_set.get(key) {
            return if obs.deleted { View::Absent } else { View::Live };
        }
        View::Unknown
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.db.live_txs.deregister(self.ts);
        }
    }
}

enum View {
    Live,
    Absent,
    Unknown,
}

fn validate_key(key: &str) -> TxResult<()> {
    if key.is_empty() {
        return Err(TxError::InvalidArgument {
            what: "key",
            reason: "must not be empty",
        });
    }
    if key.chars().any(char::is_whitespace) {
        return Err(TxError::InvalidArgument {
            what: "key",
            reason: "must not contain whitespace",
        });
    }
    Ok(())
}

fn validate_value(value: &str) -> TxResult<()> {
    if value.chars().any(char::is_whitespace) {
        return Err(TxError::InvalidArgument {
            what: "value",
            reason: "must not contain whitespace",
        });
    }
    Ok(())
}

fn validate_size(key: &str, value: &str) -> TxResult<()> {
    if record::encoded_len(key, value) > MAX_RECORD_SIZE {
        return Err(TxError::record_too_large(key, value));
    }
    Ok(())
}
