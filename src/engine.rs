//! The trace engine.
//!
//! One façade over the whole pipeline: the identity gate authorizes, the
//! record store reads/validates/writes, the enumeration index and history
//! log are kept in step, the propagator ripples package mutations into
//! referenced assemblies, and the query engine serves the listing
//! operations. Each public method is one unit of work against the ledger;
//! an error aborts the remaining steps of that method and nothing is
//! rolled back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assembly::{AssemblyRecord, BatchKind};
use crate::error::TrackResult;
use crate::identity::{IdentityGate, Role};
use crate::ledger::{Ledger, MemoryLedger};
use crate::package::{PackageRecord, RefRole};
use crate::propagate::Propagator;
use crate::query::{AssemblyFilter, PackageFilter, QueryEngine};
use crate::stamp::{self, StampRange};
use crate::status::{self, AssemblyStatus};
use crate::store::{HistoryMode, RecordStore};

const MUTATE_ASSEMBLY: &[Role] = &[Role::AssemblyLine];
const MUTATE_PACKAGE: &[Role] = &[Role::PackageLine];
const READ_ASSEMBLY: &[Role] = &[Role::AssemblyLine, Role::Viewer];
const READ_PACKAGE: &[Role] = &[Role::PackageLine, Role::Viewer];

/// Caller-supplied assembly fields for create and update.
///
/// On update, the identity and device fields are ignored in favor of the
/// stored record; they are carried here so both operations share one
/// argument shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyInput {
    pub assembly_id: String,
    pub device_serial_no: String,
    pub device_type: String,
    pub filament_batch_id: String,
    pub led_batch_id: String,
    pub circuit_board_batch_id: String,
    pub wire_batch_id: String,
    pub casing_batch_id: String,
    pub adaptor_batch_id: String,
    pub stick_pod_batch_id: String,
    pub manufacturing_plant: String,
    /// Status wire code.
    pub status: String,
    /// 14-digit assembly date.
    pub assembly_date: String,
}

/// Caller-supplied package fields for create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInput {
    pub case_id: String,
    pub holder_assembly_id: String,
    pub charger_assembly_id: String,
    pub status: String,
    /// 14-digit packaging date.
    pub packaging_date: String,
    pub shipping_address: String,
    /// Status code propagated to the referenced assemblies.
    pub assembly_status: String,
}

/// Caller-supplied package fields for update.
///
/// The assembly references are deliberately absent: updates read them
/// back from the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageUpdate {
    pub case_id: String,
    pub status: String,
    pub shipping_address: String,
    /// Status code propagated to the referenced assemblies.
    pub assembly_status: String,
}

/// Record management over a single-key ledger.
#[derive(Clone)]
pub struct TraceEngine {
    gate: IdentityGate,
    store: RecordStore,
    propagator: Propagator,
    query: QueryEngine,
}

impl TraceEngine {
    /// Creates an engine over the given ledger.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        let gate = IdentityGate::new(Arc::clone(&ledger));
        let store = RecordStore::new(ledger);
        let propagator = Propagator::new(store.clone());
        let query = QueryEngine::new(store.clone());
        Self {
            gate,
            store,
            propagator,
            query,
        }
    }

    /// Creates an engine over a fresh in-memory ledger.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryLedger::new()))
    }

    /// The underlying record store.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// The identity gate.
    #[must_use]
    pub fn gate(&self) -> &IdentityGate {
        &self.gate
    }

    // ---- identity helpers ----

    /// Bootstrap write: map `name` to `role`.
    pub fn register_identity(&self, name: &str, role: &str) -> TrackResult<()> {
        self.gate.register(name, role)
    }

    /// The role string mapped to `name`, if any.
    pub fn lookup_identity(&self, name: &str) -> TrackResult<Option<String>> {
        self.gate.lookup(name)
    }

    // ---- assembly mutations ----

    /// Creates an assembly from caller input, assigning creation metadata.
    pub fn create_assembly(&self, input: &AssemblyInput, user: &str) -> TrackResult<AssemblyRecord> {
        self.gate.authorize(user, MUTATE_ASSEMBLY)?;
        stamp::validate("assembly_date", &input.assembly_date)?;

        let now = stamp::now();
        let record = AssemblyRecord {
            assembly_id: input.assembly_id.clone(),
            device_serial_no: input.device_serial_no.clone(),
            device_type: input.device_type.clone(),
            filament_batch_id: input.filament_batch_id.clone(),
            led_batch_id: input.led_batch_id.clone(),
            circuit_board_batch_id: input.circuit_board_batch_id.clone(),
            wire_batch_id: input.wire_batch_id.clone(),
            casing_batch_id: input.casing_batch_id.clone(),
            adaptor_batch_id: input.adaptor_batch_id.clone(),
            stick_pod_batch_id: input.stick_pod_batch_id.clone(),
            manufacturing_plant: input.manufacturing_plant.clone(),
            status: AssemblyStatus::from_code(&input.status),
            assembly_date: input.assembly_date.clone(),
            created_on: now.clone(),
            last_updated_on: now,
            created_by: user.to_string(),
            last_updated_by: user.to_string(),
            package: String::new(),
            info2: String::new(),
        };
        self.store.create(&record)?;
        Ok(record)
    }

    /// Updates an assembly's mutable fields.
    ///
    /// Identity, device serial/type, and creation metadata are carried
    /// over from the stored record regardless of caller input; the status
    /// transition guard applies.
    pub fn update_assembly(&self, input: &AssemblyInput, user: &str) -> TrackResult<AssemblyRecord> {
        let role = self.gate.authorize(user, MUTATE_ASSEMBLY)?;
        stamp::validate("assembly_date", &input.assembly_date)?;

        let mut record: AssemblyRecord = self.store.get(&input.assembly_id)?;
        let target = AssemblyStatus::from_code(&input.status);
        status::check_assembly_transition(role, &input.assembly_id, &record.status, &target)?;

        record.filament_batch_id = input.filament_batch_id.clone();
        record.led_batch_id = input.led_batch_id.clone();
        record.circuit_board_batch_id = input.circuit_board_batch_id.clone();
        record.wire_batch_id = input.wire_batch_id.clone();
        record.casing_batch_id = input.casing_batch_id.clone();
        record.adaptor_batch_id = input.adaptor_batch_id.clone();
        record.stick_pod_batch_id = input.stick_pod_batch_id.clone();
        record.manufacturing_plant = input.manufacturing_plant.clone();
        record.status = target;
        record.assembly_date = input.assembly_date.clone();
        record.touch(user);

        self.store.update(&record)?;
        Ok(record)
    }

    /// Updates an assembly's status alone, subject to the transition
    /// guard.
    pub fn update_assembly_status(
        &self,
        assembly_id: &str,
        status_code: &str,
        user: &str,
    ) -> TrackResult<AssemblyRecord> {
        let role = self.gate.authorize(user, MUTATE_ASSEMBLY)?;

        let mut record: AssemblyRecord = self.store.get(assembly_id)?;
        let target = AssemblyStatus::from_code(status_code);
        status::check_assembly_transition(role, assembly_id, &record.status, &target)?;

        record.status = target;
        record.touch(user);
        self.store.update(&record)?;
        Ok(record)
    }

    /// Stamps an assembly's write-once `info2` marker.
    ///
    /// A second stamp is a silent no-op: the stored value wins, the
    /// history is untouched, and no error is raised. The write replaces
    /// the last history entry so bookkeeping never inflates history
    /// length.
    pub fn stamp_assembly(
        &self,
        assembly_id: &str,
        hash: &str,
        user: &str,
    ) -> TrackResult<AssemblyRecord> {
        self.gate.authorize(user, MUTATE_ASSEMBLY)?;

        let mut record: AssemblyRecord = self.store.get(assembly_id)?;
        if !record.info2.is_empty() {
            return Ok(record);
        }
        record.info2 = hash.to_string();
        record.touch(user);
        self.store.save(&record, HistoryMode::ReplaceLast)?;
        Ok(record)
    }

    // ---- package mutations ----

    /// Creates a package and claims its referenced assemblies.
    ///
    /// The package is committed before propagation runs, so a dangling
    /// assembly reference surfaces as a propagation error with the
    /// package already written; the substrate offers no way to undo it.
    pub fn create_package(&self, input: &PackageInput, user: &str) -> TrackResult<PackageRecord> {
        self.gate.authorize(user, MUTATE_PACKAGE)?;
        stamp::validate("packaging_date", &input.packaging_date)?;

        let now = stamp::now();
        let record = PackageRecord {
            case_id: input.case_id.clone(),
            holder_assembly_id: input.holder_assembly_id.clone(),
            charger_assembly_id: input.charger_assembly_id.clone(),
            status: input.status.clone(),
            packaging_date: input.packaging_date.clone(),
            shipping_address: input.shipping_address.clone(),
            created_on: now.clone(),
            last_updated_on: now,
            created_by: user.to_string(),
            last_updated_by: user.to_string(),
            info2: String::new(),
        };
        self.store.create(&record)?;

        let associated = AssemblyStatus::from_code(&input.assembly_status);
        self.propagator.assign(
            &record.case_id,
            [&record.holder_assembly_id, &record.charger_assembly_id],
            &associated,
            user,
        )?;
        Ok(record)
    }

    /// Updates a package's mutable fields and re-propagates status.
    ///
    /// The assembly references come from the stored record, never the
    /// caller; propagation skips assemblies already at the target status.
    pub fn update_package(&self, update: &PackageUpdate, user: &str) -> TrackResult<PackageRecord> {
        self.gate.authorize(user, MUTATE_PACKAGE)?;

        let mut record: PackageRecord = self.store.get(&update.case_id)?;
        record.status = update.status.clone();
        record.shipping_address = update.shipping_address.clone();
        record.touch(user);
        self.store.update(&record)?;

        let associated = AssemblyStatus::from_code(&update.assembly_status);
        self.propagator.restatus(
            [&record.holder_assembly_id, &record.charger_assembly_id],
            &associated,
            user,
        )?;
        Ok(record)
    }

    /// Stamps a package's write-once `info2` marker and copies the stamp
    /// onto referenced assemblies that are still unstamped.
    ///
    /// A second stamp leaves all state (the package, both assemblies,
    /// every history) exactly as the first left it.
    pub fn stamp_package(&self, case_id: &str, hash: &str, user: &str) -> TrackResult<PackageRecord> {
        self.gate.authorize(user, MUTATE_PACKAGE)?;

        let mut record: PackageRecord = self.store.get(case_id)?;
        if !record.info2.is_empty() {
            return Ok(record);
        }
        record.info2 = hash.to_string();
        record.touch(user);
        self.store.save(&record, HistoryMode::ReplaceLast)?;

        self.propagator.stamp(
            [&record.holder_assembly_id, &record.charger_assembly_id],
            hash,
            user,
        )?;
        Ok(record)
    }

    // ---- assembly reads ----

    /// Reads one assembly.
    pub fn get_assembly(&self, assembly_id: &str, user: &str) -> TrackResult<AssemblyRecord> {
        self.gate.authorize(user, READ_ASSEMBLY)?;
        self.store.get(assembly_id)
    }

    /// All assemblies, in creation order.
    pub fn assemblies(&self, user: &str) -> TrackResult<Vec<AssemblyRecord>> {
        self.gate.authorize(user, READ_ASSEMBLY)?;
        self.query.assemblies(&AssemblyFilter::any())
    }

    /// Assemblies whose `batch_tag` field equals `value`.
    pub fn assemblies_by_batch(
        &self,
        batch_tag: &str,
        value: &str,
        user: &str,
    ) -> TrackResult<Vec<AssemblyRecord>> {
        self.gate.authorize(user, READ_ASSEMBLY)?;
        let kind = BatchKind::parse(batch_tag)?;
        self.query.assemblies(&AssemblyFilter::any().with_batch(kind, value))
    }

    /// Assemblies whose assembly date falls inside `[from, to]`.
    pub fn assemblies_by_date(
        &self,
        from: &str,
        to: &str,
        user: &str,
    ) -> TrackResult<Vec<AssemblyRecord>> {
        self.gate.authorize(user, READ_ASSEMBLY)?;
        let range = StampRange::parse(from, to)?;
        self.query.assemblies(&AssemblyFilter::any().with_range(range))
    }

    /// Conjunction of the batch and date filters.
    pub fn assemblies_by_batch_and_date(
        &self,
        batch_tag: &str,
        value: &str,
        from: &str,
        to: &str,
        user: &str,
    ) -> TrackResult<Vec<AssemblyRecord>> {
        self.gate.authorize(user, READ_ASSEMBLY)?;
        let kind = BatchKind::parse(batch_tag)?;
        let range = StampRange::parse(from, to)?;
        self.query
            .assemblies(&AssemblyFilter::any().with_batch(kind, value).with_range(range))
    }

    /// The full snapshot history of one assembly (empty if never created).
    pub fn assembly_history(&self, assembly_id: &str, user: &str) -> TrackResult<Vec<AssemblyRecord>> {
        self.gate.authorize(user, READ_ASSEMBLY)?;
        self.store.history_of(assembly_id)
    }

    /// Latest snapshot of each assembly whose history ever fell inside
    /// `[from, to]`.
    pub fn assembly_history_by_date(
        &self,
        from: &str,
        to: &str,
        user: &str,
    ) -> TrackResult<Vec<AssemblyRecord>> {
        self.gate.authorize(user, READ_ASSEMBLY)?;
        let range = StampRange::parse(from, to)?;
        self.query
            .assemblies_from_history(&AssemblyFilter::any().with_range(range))
    }

    /// Latest snapshot of each assembly whose history ever matched both
    /// filters.
    pub fn assembly_history_by_batch_and_date(
        &self,
        batch_tag: &str,
        value: &str,
        from: &str,
        to: &str,
        user: &str,
    ) -> TrackResult<Vec<AssemblyRecord>> {
        self.gate.authorize(user, READ_ASSEMBLY)?;
        let kind = BatchKind::parse(batch_tag)?;
        let range = StampRange::parse(from, to)?;
        self.query
            .assemblies_from_history(&AssemblyFilter::any().with_batch(kind, value).with_range(range))
    }

    // ---- package reads ----

    /// Reads one package.
    pub fn get_package(&self, case_id: &str, user: &str) -> TrackResult<PackageRecord> {
        self.gate.authorize(user, READ_PACKAGE)?;
        self.store.get(case_id)
    }

    /// All packages, in creation order.
    pub fn packages(&self, user: &str) -> TrackResult<Vec<PackageRecord>> {
        self.gate.authorize(user, READ_PACKAGE)?;
        self.query.packages(&PackageFilter::any())
    }

    /// Packages whose `ref_tag` reference equals `assembly_id`.
    pub fn packages_by_reference(
        &self,
        ref_tag: &str,
        assembly_id: &str,
        user: &str,
    ) -> TrackResult<Vec<PackageRecord>> {
        self.gate.authorize(user, READ_PACKAGE)?;
        let role = RefRole::parse(ref_tag)?;
        self.query
            .packages(&PackageFilter::any().with_reference(role, assembly_id))
    }

    /// Packages whose packaging date falls inside `[from, to]`.
    pub fn packages_by_date(
        &self,
        from: &str,
        to: &str,
        user: &str,
    ) -> TrackResult<Vec<PackageRecord>> {
        self.gate.authorize(user, READ_PACKAGE)?;
        let range = StampRange::parse(from, to)?;
        self.query.packages(&PackageFilter::any().with_range(range))
    }

    /// Conjunction of the reference and date filters.
    pub fn packages_by_reference_and_date(
        &self,
        ref_tag: &str,
        assembly_id: &str,
        from: &str,
        to: &str,
        user: &str,
    ) -> TrackResult<Vec<PackageRecord>> {
        self.gate.authorize(user, READ_PACKAGE)?;
        let role = RefRole::parse(ref_tag)?;
        let range = StampRange::parse(from, to)?;
        self.query.packages(
            &PackageFilter::any()
                .with_reference(role, assembly_id)
                .with_range(range),
        )
    }

    /// The full snapshot history of one package (empty if never created).
    pub fn package_history(&self, case_id: &str, user: &str) -> TrackResult<Vec<PackageRecord>> {
        self.gate.authorize(user, READ_PACKAGE)?;
        self.store.history_of(case_id)
    }

    /// Latest snapshot of each package whose history ever fell inside
    /// `[from, to]`.
    pub fn package_history_by_date(
        &self,
        from: &str,
        to: &str,
        user: &str,
    ) -> TrackResult<Vec<PackageRecord>> {
        self.gate.authorize(user, READ_PACKAGE)?;
        let range = StampRange::parse(from, to)?;
        self.query
            .packages_from_history(&PackageFilter::any().with_range(range))
    }

    // ---- raw listings ----

    /// Every assembly id ever created, in creation order. No
    /// authorization; a raw listing affordance.
    pub fn list_assembly_ids(&self) -> TrackResult<Vec<String>> {
        self.store.list_ids::<AssemblyRecord>()
    }

    /// Every package case id ever created, in creation order.
    pub fn list_package_ids(&self) -> TrackResult<Vec<String>> {
        self.store.list_ids::<PackageRecord>()
    }
}
