//! Per-entity history logs.
//!
//! Every entity carries an ordered sequence of full snapshots under the
//! key `id + "H"`. Two write modes exist: `Append` grows the sequence on
//! every substantive mutation, while `ReplaceLast` swaps the final entry
//! in place so that hash-stamping never inflates the visible history
//! length. The sequence starts with the creation snapshot, so a
//! `ReplaceLast` against an empty sequence can only mean state drift and
//! is reported as corrupt state.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::error::{StoreError, TrackResult};
use crate::ledger::Ledger;

/// History key for an entity id.
#[must_use]
pub fn history_key(id: &str) -> String {
    format!("{id}H")
}

/// A tagged history write.
#[derive(Debug, Clone)]
pub enum HistoryOp<R> {
    /// Append a snapshot to the end of the sequence.
    Append(R),
    /// Replace the final snapshot in place; the sequence length is
    /// unchanged.
    ReplaceLast(R),
}

/// Reads and writes history sequences on the ledger.
#[derive(Clone)]
pub struct HistoryLog {
    ledger: Arc<dyn Ledger>,
}

impl HistoryLog {
    /// Creates a history log over the given ledger.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Reads the full snapshot sequence for `id`.
    ///
    /// An absent history key reads as the empty sequence; bytes that fail
    /// to decode surface as corrupt state.
    pub fn read<R: DeserializeOwned>(&self, id: &str) -> TrackResult<Vec<R>> {
        let key = history_key(id);
        let Some(bytes) = self.ledger.get(&key)? else {
            return Ok(Vec::new());
        };
        Ok(codec::decode(&key, &bytes)?)
    }

    /// Applies a tagged write to the sequence for `id`.
    pub fn apply<R>(&self, id: &str, op: HistoryOp<R>) -> TrackResult<()>
    where
        R: Serialize + DeserializeOwned,
    {
        let key = history_key(id);
        let mut entries: Vec<R> = self.read(id)?;
        match op {
            HistoryOp::Append(snapshot) => entries.push(snapshot),
            HistoryOp::ReplaceLast(snapshot) => {
                let Some(last) = entries.last_mut() else {
                    return Err(StoreError::CorruptState {
                        key,
                        reason: "replace-last on an empty history".to_string(),
                    }
                    .into());
                };
                *last = snapshot;
            }
        }
        self.ledger.put(&key, codec::encode(&key, &entries)?)?;
        Ok(())
    }
}
