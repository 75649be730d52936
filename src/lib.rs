//! seccampdb - an in-memory key-value store with durable transactions.
//!
//! Sessions run read/insert/update/delete command sequences and finish
//! with commit or abort. Concurrency control is MVCC with timestamp
//! ordering: per-key version chains, per-transaction read and write
//! sets, and commit-time validation under per-record locks acquired in
//! key order. Committed data survives restart through a page-oriented
//! redo log and an atomically replaced checkpoint file.

pub mod config;
pub mod engine;
pub mod index;
pub mod mvcc;
pub mod recovery;
pub mod server;
pub mod snapshot;
pub mod wal;

pub use config::Config;
pub use engine::{Database, Transaction, TxError, TxResult};
