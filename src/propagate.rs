//! Cross-entity propagation.
//!
//! Package mutations ripple into the assemblies they reference: creation
//! claims each referenced assembly for the new case, updates push a fresh
//! status, and hash-stamping copies the stamp onto assemblies that have
//! not been stamped in the current assignment epoch. Each assembly is an
//! independent single-key write; a failure part-way leaves the earlier
//! writes in place, matching the substrate's no-compensation model.

use crate::assembly::AssemblyRecord;
use crate::error::{StoreError, TrackResult};
use crate::status::AssemblyStatus;
use crate::store::{HistoryMode, RecordStore};

/// Applies package-driven mutations to referenced assemblies.
#[derive(Clone)]
pub struct Propagator {
    store: RecordStore,
}

impl Propagator {
    /// Creates a propagator over the given store.
    #[must_use]
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    fn load(&self, id: &str) -> TrackResult<AssemblyRecord> {
        self.store.try_get(id)?.ok_or_else(|| {
            StoreError::Propagation {
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Package-create propagation: claim each referenced assembly.
    ///
    /// Sets the caller-supplied associated status, points the assembly's
    /// package back-reference at `case_id`, and clears `info2`: the
    /// previous stamp, if any, committed to a different assignment and is
    /// invalidated by the new one. Appends to each assembly's history.
    pub fn assign(
        &self,
        case_id: &str,
        refs: [&str; 2],
        status: &AssemblyStatus,
        user: &str,
    ) -> TrackResult<()> {
        for id in refs {
            if id.is_empty() {
                continue;
            }
            let mut assembly = self.load(id)?;
            assembly.status = status.clone();
            assembly.package = case_id.to_string();
            assembly.info2.clear();
            assembly.touch(user);
            self.store.save(&assembly, HistoryMode::Append)?;
        }
        Ok(())
    }

    /// Package-update propagation: push `status` to each referenced
    /// assembly.
    ///
    /// Skipped per-assembly when the current status already equals the
    /// target, so a re-submitted update does not grow any history.
    pub fn restatus(&self, refs: [&str; 2], status: &AssemblyStatus, user: &str) -> TrackResult<()> {
        for id in refs {
            if id.is_empty() {
                continue;
            }
            let mut assembly = self.load(id)?;
            if assembly.status == *status {
                continue;
            }
            assembly.status = status.clone();
            assembly.touch(user);
            self.store.save(&assembly, HistoryMode::Append)?;
        }
        Ok(())
    }

    /// Hash-stamp propagation: copy `hash` onto each referenced assembly
    /// whose `info2` is still empty.
    ///
    /// Already-stamped assemblies are skipped silently. The write replaces
    /// the last history entry rather than appending, keeping history
    /// length aligned with substantive status changes.
    pub fn stamp(&self, refs: [&str; 2], hash: &str, user: &str) -> TrackResult<()> {
        for id in refs {
            if id.is_empty() {
                continue;
            }
            let mut assembly = self.load(id)?;
            if !assembly.info2.is_empty() {
                continue;
            }
            assembly.info2 = hash.to_string();
            assembly.touch(user);
            self.store.save(&assembly, HistoryMode::ReplaceLast)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use std::sync::Arc;

    fn fixture() -> (RecordStore, Propagator) {
        let store = RecordStore::new(Arc::new(MemoryLedger::new()));
        let propagator = Propagator::new(store.clone());
        (store, propagator)
    }

    fn seeded(id: &str, store: &RecordStore) -> AssemblyRecord {
        let record = AssemblyRecord {
            assembly_id: id.to_string(),
            device_serial_no: "SER-1".to_string(),
            device_type: "vaporizer".to_string(),
            filament_batch_id: "F-1".to_string(),
            led_batch_id: "L-1".to_string(),
            circuit_board_batch_id: "C-1".to_string(),
            wire_batch_id: "W-1".to_string(),
            casing_batch_id: "CA-1".to_string(),
            adaptor_batch_id: "A-1".to_string(),
            stick_pod_batch_id: "S-1".to_string(),
            manufacturing_plant: "plant-1".to_string(),
            status: AssemblyStatus::from_code("6"),
            assembly_date: "20260807090000".to_string(),
            created_on: "20260807090001".to_string(),
            last_updated_on: "20260807090001".to_string(),
            created_by: "alice".to_string(),
            last_updated_by: "alice".to_string(),
            package: String::new(),
            info2: "stale-stamp".to_string(),
        };
        store.create(&record).unwrap();
        record
    }

    #[test]
    fn test_assign_claims_both_references() {
        let (store, propagator) = fixture();
        seeded("ASM-1", &store);
        seeded("ASM-2", &store);

        propagator
            .assign("CASE-1", ["ASM-1", "ASM-2"], &AssemblyStatus::Packaged, "paula")
            .unwrap();

        for id in ["ASM-1", "ASM-2"] {
            let assembly: AssemblyRecord = store.get(id).unwrap();
            assert_eq!(assembly.status, AssemblyStatus::Packaged);
            assert_eq!(assembly.package, "CASE-1");
            assert_eq!(assembly.info2, "");
            assert_eq!(assembly.last_updated_by, "paula");
            let history: Vec<AssemblyRecord> = store.history_of::<AssemblyRecord>(id).unwrap();
            assert_eq!(history.len(), 2);
        }
    }

    #[test]
    fn test_assign_skips_empty_slots() {
        let (store, propagator) = fixture();
        seeded("ASM-1", &store);
        propagator
            .assign("CASE-1", ["ASM-1", ""], &AssemblyStatus::Packaged, "paula")
            .unwrap();
        let assembly: AssemblyRecord = store.get("ASM-1").unwrap();
        assert_eq!(assembly.package, "CASE-1");
    }

    #[test]
    fn test_assign_missing_reference_fails() {
        let (_, propagator) = fixture();
        let err = propagator
            .assign("CASE-1", ["ASM-404", ""], &AssemblyStatus::Packaged, "paula")
            .unwrap_err();
        assert!(err.is_propagation());
    }

    #[test]
    fn test_restatus_skips_when_already_at_target() {
        let (store, propagator) = fixture();
        seeded("ASM-1", &store);

        propagator
            .restatus(["ASM-1", ""], &AssemblyStatus::ReadyForPackaging, "paula")
            .unwrap();

        let history: Vec<AssemblyRecord> = store.history_of::<AssemblyRecord>("ASM-1").unwrap();
        assert_eq!(history.len(), 1); // no growth on the no-op
        let assembly: AssemblyRecord = store.get("ASM-1").unwrap();
        assert_eq!(assembly.last_updated_by, "alice"); // untouched
    }

    #[test]
    fn test_restatus_applies_new_status() {
        let (store, propagator) = fixture();
        seeded("ASM-1", &store);

        propagator
            .restatus(["ASM-1", ""], &AssemblyStatus::Packaged, "paula")
            .unwrap();

        let assembly: AssemblyRecord = store.get("ASM-1").unwrap();
        assert_eq!(assembly.status, AssemblyStatus::Packaged);
        // restatus leaves the package back-reference and info2 alone
        assert_eq!(assembly.info2, "stale-stamp");
        let history: Vec<AssemblyRecord> = store.history_of::<AssemblyRecord>("ASM-1").unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_stamp_only_fills_empty_info2() {
        let (store, propagator) = fixture();
        seeded("ASM-1", &store); // info2 = "stale-stamp"
        let mut fresh = seeded("ASM-2", &store);
        fresh.info2.clear();
        store.save(&fresh, HistoryMode::Append).unwrap();

        propagator.stamp(["ASM-1", "ASM-2"], "h1", "paula").unwrap();

        let stale: AssemblyRecord = store.get("ASM-1").unwrap();
        assert_eq!(stale.info2, "stale-stamp"); // skipped silently

        let stamped: AssemblyRecord = store.get("ASM-2").unwrap();
        assert_eq!(stamped.info2, "h1");
        // ReplaceLast: stamping did not grow the history
        let history: Vec<AssemblyRecord> = store.history_of::<AssemblyRecord>("ASM-2").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap().info2, "h1");
    }
}
