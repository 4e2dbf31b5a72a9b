//! In-memory ledger backend.
//!
//! A thread-safe map-backed implementation of [`Ledger`], intended for
//! embedded usage, tests, and as a reference implementation of the
//! substrate contract.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::ledger::Ledger;

fn lock_err(context: &'static str) -> StoreError {
    StoreError::Backend(format!("poisoned lock: {context}"))
}

/// Map-backed [`Ledger`] with per-call locking.
///
/// Individual `get`/`put` calls are serialized by the lock; nothing is held
/// across calls, so the no-cross-key-atomicity property of the substrate is
/// preserved exactly.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys ever written.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.read().map_err(|_| lock_err("len"))?.len())
    }

    /// Returns true if no key was ever written.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.entries.read().map_err(|_| lock_err("is_empty"))?.is_empty())
    }
}

impl Ledger for MemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.read().map_err(|_| lock_err("get"))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| lock_err("put"))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key_reads_none() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.get("missing").unwrap(), None);
    }

    #[test]
    fn test_put_then_get() {
        let ledger = MemoryLedger::new();
        ledger.put("k", b"v1".to_vec()).unwrap();
        assert_eq!(ledger.get("k").unwrap(), Some(b"v1".to_vec()));
    }

    #[test]
    fn test_overwrite_wins() {
        let ledger = MemoryLedger::new();
        ledger.put("k", b"v1".to_vec()).unwrap();
        ledger.put("k", b"v2".to_vec()).unwrap();
        assert_eq!(ledger.get("k").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_empty() {
        let ledger = MemoryLedger::new();
        assert!(ledger.is_empty().unwrap());
        ledger.put("k", Vec::new()).unwrap();
        assert!(!ledger.is_empty().unwrap());
        // An empty value is still a present key.
        assert_eq!(ledger.get("k").unwrap(), Some(Vec::new()));
    }
}
