//! End-to-end transaction scenarios against a real data directory.

use seccampdb::{Config, Database, TxError};
use tempfile::TempDir;

fn open(dir: &TempDir) -> Database {
    Database::open(&Config::in_dir(dir.path())).expect("open database")
}

/// Open the store and commit the given pairs in one transaction.
fn seed(dir: &TempDir, pairs: &[(&str, &str)]) -> Database {
    let db = open(dir);
    let mut tx = db.begin();
    for (key, value) in pairs {
        tx.insert(key, value).unwrap();
    }
    tx.commit().unwrap();
    db
}

#[test]
fn test_single_tx_basic() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let mut t1 = db.begin();
    t1.insert("a", "1").unwrap();
    assert_eq!(t1.read("a").unwrap(), "1");
    t1.update("a", "2").unwrap();
    assert_eq!(t1.read("a").unwrap(), "2");
    t1.delete("a").unwrap();
    assert!(matches!(t1.read("a"), Err(TxError::NotFound)));
    t1.commit().unwrap();

    // Restart: the deleted key stays gone.
    drop(db);
    let db = open(&dir);
    let mut t2 = db.begin();
    assert!(matches!(t2.read("a"), Err(TxError::NotFound)));
    t2.abort();
}

#[test]
fn test_mvcc_snapshot_read() {
    let dir = TempDir::new().unwrap();
    let db = seed(&dir, &[("k", "v0")]);

    let mut t1 = db.begin();
    assert_eq!(t1.read("k").unwrap(), "v0");

    let mut t2 = db.begin();
    t2.update("k", "v2").unwrap();
    t2.commit().unwrap();

    // T1 still sees the version it read, via its snapshot.
    assert_eq!(t1.read("k").unwrap(), "v0");
    t1.commit().unwrap();

    let mut t3 = db.begin();
    assert_eq!(t3.read("k").unwrap(), "v2");
    t3.abort();
}

#[test]
fn test_write_write_conflict_rejects_older_timestamp() {
    let dir = TempDir::new().unwrap();
    let db = seed(&dir, &[("k", "v0")]);

    let mut t1 = db.begin();
    t1.update("k", "v1").unwrap();

    let mut t2 = db.begin();
    t2.update("k", "v2").unwrap();
    t2.commit().unwrap();

    // T1 is older than the committed write it would clobber.
    assert!(matches!(t1.commit(), Err(TxError::CommitConflict)));

    let mut t3 = db.begin();
    assert_eq!(t3.read("k").unwrap(), "v2");
    t3.abort();
}

#[test]
fn test_phantom_prevention_at_most_one_insert_wins() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let mut t1 = db.begin();
    assert!(matches!(t1.read("k"), Err(TxError::NotFound)));

    let mut t2 = db.begin();
    t2.insert("k", "v").unwrap();
    t2.commit().unwrap();

    // T1 observed absence; its own insert must not also establish "k".
    t1.insert("k", "v-prime").unwrap();
    assert!(matches!(t1.commit(), Err(TxError::CommitConflict)));

    let mut t3 = db.begin();
    assert_eq!(t3.read("k").unwrap(), "v");
    t3.abort();
}

#[test]
fn test_sentinel_blocks_earlier_timestamped_insert() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let mut t1 = db.begin(); // older timestamp
    let mut t2 = db.begin(); // newer timestamp

    // The newer transaction reads absence first, pinning the sentinel.
    assert!(matches!(t2.read("k"), Err(TxError::NotFound)));

    t1.insert("k", "v").unwrap();
    assert!(matches!(t1.commit(), Err(TxError::CommitConflict)));
    t2.abort();
}

#[test]
fn test_repeated_read_is_stable_within_tx() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let mut t1 = db.begin();
    assert!(matches!(t1.read("ghost"), Err(TxError::NotFound)));

    let mut t2 = db.begin();
    t2.insert("ghost", "boo").unwrap();
    let _ = t2.commit();

    // Whatever t2's fate, t1 must keep seeing what it first saw.
    assert!(matches!(t1.read("ghost"), Err(TxError::NotFound)));
    t1.abort();
}

#[test]
fn test_insert_on_live_key_fails_at_staging() {
    let dir = TempDir::new().unwrap();
    let db = seed(&dir, &[("k", "v")]);

    let mut tx = db.begin();
    assert_eq!(tx.read("k").unwrap(), "v");
    assert!(matches!(tx.insert("k", "other"), Err(TxError::AlreadyExists)));
    tx.abort();
}

#[test]
fn test_insert_after_own_delete_recreates_key() {
    let dir = TempDir::new().unwrap();
    let db = seed(&dir, &[("k", "v")]);

    let mut tx = db.begin();
    assert_eq!(tx.read("k").unwrap(), "v");
    tx.delete("k").unwrap();
    tx.insert("k", "reborn").unwrap();
    assert_eq!(tx.read("k").unwrap(), "reborn");
    tx.commit().unwrap();

    let mut check = db.begin();
    assert_eq!(check.read("k").unwrap(), "reborn");
    check.abort();
}

#[test]
fn test_insert_after_committed_delete_succeeds() {
    let dir = TempDir::new().unwrap();
    let db = seed(&dir, &[("k", "v")]);

    let mut t1 = db.begin();
    t1.delete("k").unwrap();
    t1.commit().unwrap();

    let mut t2 = db.begin();
    assert!(matches!(t2.read("k"), Err(TxError::NotFound)));
    t2.insert("k", "again").unwrap();
    t2.commit().unwrap();

    let mut t3 = db.begin();
    assert_eq!(t3.read("k").unwrap(), "again");
    t3.abort();
}

#[test]
fn test_update_of_unknown_key_is_validated_at_commit() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    // Staging is optimistic; commit discovers the key never existed.
    let mut tx = db.begin();
    tx.update("missing", "v").unwrap();
    assert!(matches!(tx.commit(), Err(TxError::CommitConflict)));
}

#[test]
fn test_update_after_observed_absence_fails_at_staging() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let mut tx = db.begin();
    assert!(matches!(tx.read("missing"), Err(TxError::NotFound)));
    assert!(matches!(tx.update("missing", "v"), Err(TxError::NotFound)));
    assert!(matches!(tx.delete("missing"), Err(TxError::NotFound)));
    tx.abort();
}

#[test]
fn test_abort_discards_staged_writes() {
    let dir = TempDir::new().unwrap();
    let db = seed(&dir, &[("k", "v")]);

    let mut t1 = db.begin();
    t1.update("k", "never").unwrap();
    t1.insert("extra", "never").unwrap();
    t1.abort();

    let mut t2 = db.begin();
    assert_eq!(t2.read("k").unwrap(), "v");
    assert!(matches!(t2.read("extra"), Err(TxError::NotFound)));
    t2.abort();
}

#[test]
fn test_read_only_commit_succeeds() {
    let dir = TempDir::new().unwrap();
    let db = seed(&dir, &[("k", "v")]);

    let mut tx = db.begin();
    assert_eq!(tx.read("k").unwrap(), "v");
    tx.commit().unwrap();
}

#[test]
fn test_empty_value_roundtrip() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let mut t1 = db.begin();
    t1.insert("empty", "").unwrap();
    t1.commit().unwrap();

    drop(db);
    let db = open(&dir);
    let mut t2 = db.begin();
    assert_eq!(t2.read("empty").unwrap(), "");
    t2.abort();
}

#[test]
fn test_maximum_sized_record_survives_restart() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let key = "k".repeat(48);
    let value = "v".repeat(200); // 48 + 200 = 248, the limit

    let mut t1 = db.begin();
    t1.insert(&key, &value).unwrap();
    t1.commit().unwrap();

    drop(db);
    let db = open(&dir);
    let mut t2 = db.begin();
    assert_eq!(t2.read(&key).unwrap(), value);
    t2.abort();
}

#[test]
fn test_oversized_record_rejected_at_staging() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let key = "k".repeat(48);
    let value = "v".repeat(201); // one byte past the limit

    let mut tx = db.begin();
    assert!(matches!(
        tx.insert(&key, &value),
        Err(TxError::RecordTooLarge { .. })
    ));
    tx.abort();
}

#[test]
fn test_whitespace_and_empty_keys_rejected() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let mut tx = db.begin();
    assert!(matches!(
        tx.insert("bad key", "v"),
        Err(TxError::InvalidArgument { .. })
    ));
    assert!(matches!(
        tx.insert("key", "bad value"),
        Err(TxError::InvalidArgument { .. })
    ));
    assert!(matches!(
        tx.insert("", "v"),
        Err(TxError::InvalidArgument { .. })
    ));
    tx.abort();
}
