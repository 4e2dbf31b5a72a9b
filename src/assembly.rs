//! Assembly records.
//!
//! An assembly is a manufactured sub-unit tracked from the production line
//! through packaging. Its identity, device serial/type, and creation
//! metadata are fixed at creation; everything else mutates through the
//! engine's guarded operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::stamp;
use crate::status::AssemblyStatus;
use crate::store::TrackedRecord;

/// The seven recognized supply-batch categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    Filament,
    Led,
    CircuitBoard,
    Wire,
    Casing,
    Adaptor,
    StickPod,
}

impl BatchKind {
    /// Every batch kind, in record-field order.
    pub const ALL: [Self; 7] = [
        Self::Filament,
        Self::Led,
        Self::CircuitBoard,
        Self::Wire,
        Self::Casing,
        Self::Adaptor,
        Self::StickPod,
    ];

    /// Wire tag of the batch kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Filament => "filament",
            Self::Led => "led",
            Self::CircuitBoard => "circuit_board",
            Self::Wire => "wire",
            Self::Casing => "casing",
            Self::Adaptor => "adaptor",
            Self::StickPod => "stick_pod",
        }
    }

    /// Parses a caller-supplied batch tag.
    pub fn parse(tag: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| ValidationError::UnknownBatchKind(tag.to_string()))
    }
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyRecord {
    /// Primary key, externally supplied, unique at creation.
    pub assembly_id: String,
    /// Immutable after creation.
    pub device_serial_no: String,
    /// Immutable after creation.
    pub device_type: String,
    pub filament_batch_id: String,
    pub led_batch_id: String,
    pub circuit_board_batch_id: String,
    pub wire_batch_id: String,
    pub casing_batch_id: String,
    pub adaptor_batch_id: String,
    pub stick_pod_batch_id: String,
    pub manufacturing_plant: String,
    pub status: AssemblyStatus,
    /// 14-digit assembly date, validated on entry.
    pub assembly_date: String,
    pub created_on: String,
    pub last_updated_on: String,
    pub created_by: String,
    pub last_updated_by: String,
    /// Back-reference to the consuming package's case id; empty until the
    /// assembly is packaged.
    pub package: String,
    /// Write-once hash marker. Cleared when a new package reference is
    /// attached, then set exactly once by the stamp operation.
    pub info2: String,
}

impl AssemblyRecord {
    /// The batch identifier for `kind`.
    #[must_use]
    pub fn batch(&self, kind: BatchKind) -> &str {
        match kind {
            BatchKind::Filament => &self.filament_batch_id,
            BatchKind::Led => &self.led_batch_id,
            BatchKind::CircuitBoard => &self.circuit_board_batch_id,
            BatchKind::Wire => &self.wire_batch_id,
            BatchKind::Casing => &self.casing_batch_id,
            BatchKind::Adaptor => &self.adaptor_batch_id,
            BatchKind::StickPod => &self.stick_pod_batch_id,
        }
    }

    /// Refreshes the last-update metadata.
    pub fn touch(&mut self, user: &str) {
        self.last_updated_on = stamp::now();
        self.last_updated_by = user.to_string();
    }
}

impl TrackedRecord for AssemblyRecord {
    const KIND: &'static str = "Assembly";
    const INDEX_KEY: &'static str = "Assemblies";

    fn id(&self) -> &str {
        &self.assembly_id
    }
}
