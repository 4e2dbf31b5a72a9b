//! # Trackline: record management over a single-key ledger
//!
//! Trackline maintains two kinds of business entities, **Assembly** and
//! **Package**, on top of a primitive key-value ledger offering nothing
//! but single-key `get`/`put`. Uniqueness, enumerability, mutation
//! history, role-gated status transitions, and cross-entity consistency
//! are all reconstructed through key design and ordered writes.
//!
//! ## Core Concepts
//!
//! - **Assembly**: a manufactured sub-unit tracked through production and
//!   packaging
//! - **Package**: a shipping unit referencing up to two assemblies
//! - **History Log**: append-mostly sequence of full snapshots per entity
//! - **Enumeration Index**: the list of all primary keys of one entity
//!   type, emulating table scans
//! - **Hash-stamp**: a write-once value attached once per assignment epoch
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trackline::{Dispatcher, TraceEngine};
//!
//! let dispatcher = Dispatcher::new(TraceEngine::in_memory());
//! dispatcher.dispatch_named(
//!     "register-identity",
//!     &["alice".to_string(), "assembly-line".to_string()],
//! )?;
//! let response = dispatcher.dispatch_named("create-assembly", &args)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Substrate and plumbing
pub mod codec;
pub mod error;
pub mod ledger;
pub mod stamp;

// Domain records
pub mod assembly;
pub mod package;
pub mod status;

// Storage components
pub mod history;
pub mod index;
pub mod store;

// Authorization, propagation, queries
pub mod identity;
pub mod propagate;
pub mod query;

// Engine and operation surface
pub mod dispatch;
pub mod engine;
pub mod request;

// Re-export primary types at crate root for convenience
pub use assembly::{AssemblyRecord, BatchKind};
pub use dispatch::{Dispatcher, Response};
pub use engine::{AssemblyInput, PackageInput, PackageUpdate, TraceEngine};
pub use error::{AuthError, StoreError, TrackError, TrackResult, ValidationError};
pub use history::{HistoryLog, HistoryOp};
pub use identity::{IdentityGate, Role};
pub use index::{EnumerationIndex, IdList};
pub use ledger::{Ledger, MemoryLedger};
pub use package::{PackageRecord, RefRole};
pub use query::{AssemblyFilter, PackageFilter, QueryEngine};
pub use request::{OpKind, Request};
pub use stamp::StampRange;
pub use status::AssemblyStatus;
pub use store::{HistoryMode, RecordStore, TrackedRecord};
