//! Enumeration indexes.
//!
//! The ledger has no table scans, so each entity type maintains a single
//! well-known key (`"Assemblies"`, `"Packages"`) holding the ordered list
//! of every primary key ever created. The list is append-only: nothing is
//! pruned or deduplicated here; the create-time existence probe is the
//! only duplicate defense. An index entry whose record no longer resolves
//! is tolerated by listing queries; an undecodable index is not.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::TrackResult;
use crate::ledger::Ledger;

/// Stored shape of an enumeration index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdList {
    /// Primary keys in creation order.
    pub ids: Vec<String>,
}

/// Reads and appends to the per-entity-type enumeration indexes.
#[derive(Clone)]
pub struct EnumerationIndex {
    ledger: Arc<dyn Ledger>,
}

impl EnumerationIndex {
    /// Creates an index accessor over the given ledger.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Loads the id list stored at `key`.
    ///
    /// An absent index reads as empty (no entity of that type was ever
    /// created); an undecodable one is corrupt state and fails the caller.
    pub fn load(&self, key: &str) -> TrackResult<Vec<String>> {
        let Some(bytes) = self.ledger.get(key)? else {
            return Ok(Vec::new());
        };
        let list: IdList = codec::decode(key, &bytes)?;
        Ok(list.ids)
    }

    /// Appends `id` to the list stored at `key`.
    pub fn append(&self, key: &str, id: &str) -> TrackResult<()> {
        let mut ids = self.load(key)?;
        ids.push(id.to_string());
        let list = IdList { ids };
        self.ledger.put(key, codec::encode(key, &list)?)?;
        Ok(())
    }
}
