//! Startup recovery: snapshot load, WAL replay, re-checkpoint, WAL
//! truncation.

pub mod errors;
pub mod replay;
pub mod startup;

pub use errors::{RecoveryError, RecoveryResult};
pub use replay::ReplayStats;
pub use startup::{checkpoint, recover};
