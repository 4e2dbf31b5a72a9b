//! The key-value ledger substrate.
//!
//! Everything in this crate is built on a single primitive: an external
//! ledger offering single-key atomic `get`/`put`. There are no range
//! queries, no secondary indexes, and no transactions spanning keys;
//! higher layers reconstruct those properties through key design and
//! ordered writes.

mod memory;

pub use memory::MemoryLedger;

use crate::error::StoreError;

/// The single-key storage contract.
///
/// Implementations must serialize conflicting accesses to an individual
/// key; the crate never assumes atomicity across keys. A multi-step
/// mutation interrupted between `put` calls leaves the ledger with a
/// partial update, which the higher layers document rather than repair.
pub trait Ledger: Send + Sync {
    /// Read the value at `key`, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` at `key`, overwriting any previous value.
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
}
