//! Parallel sessions: disjoint commits never contend, overlapping
//! commits serialize on the record lock, and the sentinel protocol lets
//! at most one racing insert establish a key.

use std::sync::{Arc, Barrier};
use std::thread;

use seccampdb::{Config, Database, TxError};
use tempfile::TempDir;

fn open(dir: &TempDir) -> Arc<Database> {
    Arc::new(Database::open(&Config::in_dir(dir.path())).expect("open database"))
}

#[test]
fn test_disjoint_commits_all_succeed() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let threads = 8;
    let keys_per_thread = 10;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut tx = db.begin();
                for i in 0..keys_per_thread {
                    tx.insert(&format!("t{t}-k{i}"), &format!("{t}.{i}")).unwrap();
                }
                tx.commit().unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(db.dump().len(), threads * keys_per_thread);

    let mut tx = db.begin();
    assert_eq!(tx.read("t3-k7").unwrap(), "3.7");
    tx.abort();
}

#[test]
fn test_contended_updates_serialize_by_timestamp() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    {
        let mut tx = db.begin();
        tx.insert("counter", "0").unwrap();
        tx.commit().unwrap();
    }

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut tx = db.begin();
                let ts = tx.ts();
                let outcome = tx
                    .update("counter", &ts.to_string())
                    .and_then(|_| tx.commit());
                (ts, outcome.is_ok())
            })
        })
        .collect();

    let results: Vec<(u64, bool)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<u64> = results
        .iter()
        .filter(|(_, ok)| *ok)
        .map(|(ts, _)| *ts)
        .collect();

    // Successful commits happened in increasing timestamp order, so the
    // newest winner's value is the one left standing.
    assert!(!winners.is_empty());
    let newest = winners.iter().max().unwrap();

    let mut tx = db.begin();
    assert_eq!(tx.read("counter").unwrap(), newest.to_string());
    tx.abort();
}

#[test]
fn test_racing_inserts_establish_key_at_most_once() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut tx = db.begin();
                // Read-then-insert, the phantom-sensitive pattern.
                if tx.read("prize").is_ok() {
                    tx.abort();
                    return None;
                }
                let value = format!("winner-{t}");
                if tx.insert("prize", &value).is_err() {
                    tx.abort();
                    return None;
                }
                match tx.commit() {
                    Ok(()) => Some(value),
                    Err(TxError::CommitConflict) => None,
                    Err(e) => panic!("unexpected commit error: {e}"),
                }
            })
        })
        .collect();

    let winners: Vec<String> = handles
        .into_iter()
        .filter_map(|h| h.join().unwrap())
        .collect();

    assert!(winners.len() <= 1, "two inserts established the same key");

    let mut tx = db.begin();
    match tx.read("prize") {
        Ok(value) => {
            assert_eq!(winners.len(), 1);
            assert_eq!(value, winners[0]);
        }
        Err(TxError::NotFound) => assert!(winners.is_empty()),
        Err(e) => panic!("unexpected read error: {e}"),
    }
    tx.abort();
}

#[test]
fn test_reader_snapshot_stable_under_concurrent_updates() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    {
        let mut tx = db.begin();
        tx.insert("k", "original").unwrap();
        tx.commit().unwrap();
    }

    let mut reader = db.begin();
    assert_eq!(reader.read("k").unwrap(), "original");

    let writer_db = Arc::clone(&db);
    let writer = thread::spawn(move || {
        let mut tx = writer_db.begin();
        tx.update("k", "changed").unwrap();
        tx.commit().unwrap();
    });
    writer.join().unwrap();

    // The writer committed; the reader's view must not move.
    assert_eq!(reader.read("k").unwrap(), "original");
    reader.commit().unwrap();

    let mut after = db.begin();
    assert_eq!(after.read("k").unwrap(), "changed");
    after.abort();
}

#[test]
fn test_concurrent_commits_all_durable_after_restart() {
    let dir = TempDir::new().unwrap();
    {
        let db = open(&dir);
        let threads = 4;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let db = Arc::clone(&db);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..5 {
                        let mut tx = db.begin();
                        tx.insert(&format!("t{t}-k{i}"), "d").unwrap();
                        tx.commit().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    let db = open(&dir);
    assert_eq!(db.dump().len(), 20);
}
