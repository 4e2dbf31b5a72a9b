//! The record store.
//!
//! Owns create/update/read for both entity types at their primary keys,
//! enforcing existence preconditions and keeping the enumeration index and
//! history log in step. Every multi-step mutation is an ordered sequence
//! of independent single-key writes (record, then index, then history)
//! with no cross-key atomicity: an error mid-sequence aborts the remaining
//! steps and leaves the earlier writes in place.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::error::{StoreError, TrackResult};
use crate::history::{HistoryLog, HistoryOp};
use crate::index::EnumerationIndex;
use crate::ledger::Ledger;

/// A record the store can manage: serializable, identified by a primary
/// key, and enumerated under a fixed index key.
pub trait TrackedRecord: Serialize + DeserializeOwned + Clone {
    /// Human-readable entity kind, used in error messages.
    const KIND: &'static str;
    /// Well-known enumeration index key for this entity type.
    const INDEX_KEY: &'static str;

    /// The primary key.
    fn id(&self) -> &str;
}

/// How a write should be reflected in the entity's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Append the post-write snapshot (every substantive mutation).
    Append,
    /// Replace the final history entry in place (hash-stamping only).
    ReplaceLast,
}

/// Create/update/read for tracked records over the ledger.
#[derive(Clone)]
pub struct RecordStore {
    ledger: Arc<dyn Ledger>,
    index: EnumerationIndex,
    history: HistoryLog,
}

impl RecordStore {
    /// Creates a store over the given ledger.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        let index = EnumerationIndex::new(Arc::clone(&ledger));
        let history = HistoryLog::new(Arc::clone(&ledger));
        Self {
            ledger,
            index,
            history,
        }
    }

    /// Reads and decodes the record at `id`, or `None` if the key is
    /// absent.
    pub fn try_get<R: TrackedRecord>(&self, id: &str) -> TrackResult<Option<R>> {
        let Some(bytes) = self.ledger.get(id)? else {
            return Ok(None);
        };
        Ok(Some(codec::decode(id, &bytes)?))
    }

    /// Reads the record at `id`, failing if the key is absent.
    pub fn get<R: TrackedRecord>(&self, id: &str) -> TrackResult<R> {
        self.try_get(id)?.ok_or_else(|| {
            StoreError::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Creates a new record.
    ///
    /// Precondition: no value is stored at the primary key. Side effects,
    /// in order: write the record, append the id to the enumeration
    /// index, initialize the history with the creation snapshot.
    pub fn create<R: TrackedRecord>(&self, record: &R) -> TrackResult<()> {
        let id = record.id();
        if self.ledger.get(id)?.is_some() {
            return Err(StoreError::AlreadyExists {
                kind: R::KIND,
                id: id.to_string(),
            }
            .into());
        }
        self.ledger.put(id, codec::encode(id, record)?)?;
        self.index.append(R::INDEX_KEY, id)?;
        self.history.apply(id, HistoryOp::Append(record.clone()))?;
        Ok(())
    }

    /// Overwrites an existing record and appends the post-update snapshot
    /// to its history.
    ///
    /// Precondition: a value is stored at the primary key. Merging of
    /// mutable fields is the caller's responsibility; this layer writes
    /// the record exactly as given.
    pub fn update<R: TrackedRecord>(&self, record: &R) -> TrackResult<()> {
        let id = record.id();
        if self.ledger.get(id)?.is_none() {
            return Err(StoreError::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            }
            .into());
        }
        self.save(record, HistoryMode::Append)
    }

    /// Writes a record the caller has already resolved, with the given
    /// history mode. Used by propagation and hash-stamping, which load
    /// the record themselves and must control the history write mode.
    pub fn save<R: TrackedRecord>(&self, record: &R, mode: HistoryMode) -> TrackResult<()> {
        let id = record.id();
        self.ledger.put(id, codec::encode(id, record)?)?;
        let op = match mode {
            HistoryMode::Append => HistoryOp::Append(record.clone()),
            HistoryMode::ReplaceLast => HistoryOp::ReplaceLast(record.clone()),
        };
        self.history.apply(id, op)
    }

    /// All primary keys of `R`'s entity type, in creation order.
    pub fn list_ids<R: TrackedRecord>(&self) -> TrackResult<Vec<String>> {
        self.index.load(R::INDEX_KEY)
    }

    /// The full history sequence for `id` (empty if never created).
    pub fn history_of<R: TrackedRecord>(&self, id: &str) -> TrackResult<Vec<R>> {
        self.history.read(id)
    }
}
