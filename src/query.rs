//! Linear-scan query engine.
//!
//! The ledger offers no queries, so every listing walks the enumeration
//! index and loads each record (or its history) individually. Ids whose
//! record key no longer resolves are skipped (a partially-failed create
//! may leave the index pointing at nothing), while a corrupt top-level
//! index or an undecodable record fails the whole query. Results keep the
//! index's insertion order.

use crate::assembly::{AssemblyRecord, BatchKind};
use crate::error::TrackResult;
use crate::package::{PackageRecord, RefRole};
use crate::stamp::StampRange;
use crate::store::{RecordStore, TrackedRecord};

/// Conjunctive filter over assemblies.
#[derive(Debug, Clone, Default)]
pub struct AssemblyFilter {
    batch: Option<(BatchKind, String)>,
    range: Option<StampRange>,
}

impl AssemblyFilter {
    /// Matches every assembly.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Requires the given batch field to equal `value`.
    #[must_use]
    pub fn with_batch(mut self, kind: BatchKind, value: impl Into<String>) -> Self {
        self.batch = Some((kind, value.into()));
        self
    }

    /// Requires `assembly_date` to fall inside `range`.
    #[must_use]
    pub fn with_range(mut self, range: StampRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Returns true if `assembly` satisfies every present predicate.
    #[must_use]
    pub fn matches(&self, assembly: &AssemblyRecord) -> bool {
        if let Some((kind, value)) = &self.batch {
            if assembly.batch(*kind) != value {
                return false;
            }
        }
        if let Some(range) = &self.range {
            if !range.contains(&assembly.assembly_date) {
                return false;
            }
        }
        true
    }
}

/// Conjunctive filter over packages.
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    reference: Option<(RefRole, String)>,
    range: Option<StampRange>,
}

impl PackageFilter {
    /// Matches every package.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Requires the given reference slot to equal `assembly_id`.
    #[must_use]
    pub fn with_reference(mut self, role: RefRole, assembly_id: impl Into<String>) -> Self {
        self.reference = Some((role, assembly_id.into()));
        self
    }

    /// Requires `packaging_date` to fall inside `range`.
    #[must_use]
    pub fn with_range(mut self, range: StampRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Returns true if `package` satisfies every present predicate.
    #[must_use]
    pub fn matches(&self, package: &PackageRecord) -> bool {
        if let Some((role, assembly_id)) = &self.reference {
            if package.reference(*role) != assembly_id {
                return false;
            }
        }
        if let Some(range) = &self.range {
            if !range.contains(&package.packaging_date) {
                return false;
            }
        }
        true
    }
}

/// Index-scan queries over the record store.
#[derive(Clone)]
pub struct QueryEngine {
    store: RecordStore,
}

impl QueryEngine {
    /// Creates a query engine over the given store.
    #[must_use]
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    fn scan<R, F>(&self, pred: F) -> TrackResult<Vec<R>>
    where
        R: TrackedRecord,
        F: Fn(&R) -> bool,
    {
        let mut out = Vec::new();
        for id in self.store.list_ids::<R>()? {
            if let Some(record) = self.store.try_get::<R>(&id)? {
                if pred(&record) {
                    out.push(record);
                }
            }
        }
        Ok(out)
    }

    /// Latest-only history scan: for each entity whose history contains at
    /// least one matching snapshot, emit its most recent snapshot. The
    /// scan stops at the first match per entity; it answers "did this
    /// entity ever satisfy the filter, and if so, what is it now".
    fn scan_history_latest<R, F>(&self, pred: F) -> TrackResult<Vec<R>>
    where
        R: TrackedRecord,
        F: Fn(&R) -> bool,
    {
        let mut out = Vec::new();
        for id in self.store.list_ids::<R>()? {
            let mut snapshots = self.store.history_of::<R>(&id)?;
            if snapshots.iter().any(&pred) {
                if let Some(latest) = snapshots.pop() {
                    out.push(latest);
                }
            }
        }
        Ok(out)
    }

    /// Assemblies matching `filter`, in creation order.
    pub fn assemblies(&self, filter: &AssemblyFilter) -> TrackResult<Vec<AssemblyRecord>> {
        self.scan(|a| filter.matches(a))
    }

    /// Latest snapshot of each assembly whose history ever matched
    /// `filter`.
    pub fn assemblies_from_history(
        &self,
        filter: &AssemblyFilter,
    ) -> TrackResult<Vec<AssemblyRecord>> {
        self.scan_history_latest(|a| filter.matches(a))
    }

    /// Packages matching `filter`, in creation order.
    pub fn packages(&self, filter: &PackageFilter) -> TrackResult<Vec<PackageRecord>> {
        self.scan(|p| filter.matches(p))
    }

    /// Latest snapshot of each package whose history ever matched
    /// `filter`.
    pub fn packages_from_history(
        &self,
        filter: &PackageFilter,
    ) -> TrackResult<Vec<PackageRecord>> {
        self.scan_history_latest(|p| filter.matches(p))
    }
}
