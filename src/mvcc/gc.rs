//! Version garbage collection.
//!
//! Runs at the tail of every commit, over exactly the records that commit
//! wrote, while their locks are still held. A version may be reclaimed
//! only once no live transaction could ever reach it: everything strictly
//! older than the newest non-head version below the minimum live
//! timestamp is unreachable. The head is never reclaimed, so a record
//! stays resident (possibly as a lone tombstone) once created.

use super::version::VersionChain;

/// Trim one locked chain against the visibility floor. `min_ts` is the
/// minimum live transaction timestamp, `u64::MAX` when none is live.
/// Idempotent: a second call with the same floor reclaims nothing.
pub fn collect(chain: &mut VersionChain, min_ts: u64) -> usize {
    chain.prune_older_than(min_ts)
}
