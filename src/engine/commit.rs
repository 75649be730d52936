//! The commit protocol.
//!
//! Six steps, atomic with respect to every other commit:
//!
//! 1. The write set's BTreeMap order is the lexicographic key order;
//!    acquiring record locks in that order makes deadlock impossible.
//! 2. Per key, load-or-store the record, lock it, and validate: an
//!    insert needs an absent record or a tombstoned head, an update or
//!    delete needs a live head, and in both cases the committer's
//!    timestamp must not precede the head's read timestamp. Any failure
//!    is a conflict.
//! 3. Serialize every staged operation into zeroed 4 KiB pages, append
//!    and fsync under the process-wide WAL mutex. The commit must not
//!    report success before the fsync returns.
//! 4. Install: the final operation per key becomes the new chain head.
//!    A head this transaction itself wrote (its insert placeholder or
//!    read sentinel) is replaced in place; anything older is pushed on.
//! 5. Garbage-collect the written chains against the minimum live
//!    timestamp, locks still held.
//! 6. Release the locks (guards drop). The caller deregisters the
//!    timestamp.
//!
//! An error in steps 2–3 drops every acquired guard on the way out and
//! leaves all chains untouched.

use std::sync::Arc;

use crate::mvcc::{gc, OwnedChainGuard, Record, Version};
use crate::wal::record::Command;
use crate::wal::PageBuilder;

use super::db::Database;
use super::errors::{TxError, TxResult};
use super::transaction::{Operation, WriteSet};

pub(crate) fn execute(db: &Database, ts: u64, write_set: &WriteSet) -> TxResult<()> {
    // Step 1: the BTreeMap already iterates in lexicographic key order.
    let entries: Vec<(&String, &[Operation])> = write_set
        .iter()
        .filter(|(_, ops)| !ops.is_empty())
        .map(|(key, ops)| (key, ops.as_slice()))
        .collect();

    // Step 2: lock and validate, per key in order. `locked[i]` guards
    // `entries[i]`.
    let mut locked: Vec<(Arc<Record>, OwnedChainGuard)> = Vec::with_capacity(entries.len());
    for &(key, ops) in &entries {
        let (record, guard) = match ops[0].cmd {
            Command::Insert => lock_for_insert(db, key, ts)?,
            Command::Update | Command::Delete => lock_for_mutation(db, key, ts)?,
        };
        locked.push((record, guard));
    }

    // Step 3: durability. `?` drops every guard.
    let mut builder = PageBuilder::new();
    for &(key, ops) in &entries {
        for op in ops {
            builder.push(op.cmd, key, &op.version.value)?;
        }
    }
    {
        let mut wal = db.wal.lock();
        wal.append_pages(&builder.into_pages())?;
    }

    // Step 4: install. The final operation per key becomes the head.
    for (&(_key, ops), (_record, guard)) in entries.iter().zip(locked.iter_mut()) {
        let last = &ops[ops.len() - 1];
        if guard.head().w_ts == ts {
            // Our own placeholder or sentinel holds the head slot.
            guard.replace_head(last.version.clone());
        } else {
            guard.push(last.version.clone());
        }
    }

    // Step 5: GC while the locks are held. This transaction is still
    // registered, so the floor never exceeds `ts`.
    let min_ts = db.live_txs.min_ts().unwrap_or(u64::MAX);
    for (_record, guard) in locked.iter_mut() {
        gc::collect(guard, min_ts);
    }

    // Step 6: guards drop here.
    Ok(())
}

/// Insert target: either a fresh record (placeholder tombstone installed
/// via compare-and-insert) or an existing record whose head is a
/// tombstone no later reader has pinned.
fn lock_for_insert(
    db: &Database,
    key: &str,
    ts: u64,
) -> TxResult<(Arc<Record>, OwnedChainGuard)> {
    let record = db
        .index
        .load_or_store(key, || Record::new(key, Version::sentinel(ts)));
    let guard = record.lock_owned();
    let head = guard.head();
    if !head.deleted || ts < head.r_ts {
        return Err(TxError::CommitConflict);
    }
    Ok((record, guard))
}

/// Update/delete target: the record must exist with a live head that no
/// later transaction has read.
fn lock_for_mutation(
    db: &Database,
    key: &str,
    ts: u64,
) -> TxResult<(Arc<Record>, OwnedChainGuard)> {
    let Some(record) = db.index.get(key) else {
        return Err(TxError::CommitConflict);
    };
    let guard = record.lock_owned();
    let head = guard.head();
    if head.deleted || ts < head.r_ts {
        return Err(TxError::CommitConflict);
    }
    Ok((record, guard))
}
