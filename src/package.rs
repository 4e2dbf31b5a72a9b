//! Package records.
//!
//! A package is a shipping unit referencing up to two assemblies (holder
//! and charger). Either reference may be empty, meaning "not applicable";
//! both are fixed at creation, and later updates read them back from the
//! stored record rather than trusting caller input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::stamp;
use crate::store::TrackedRecord;

/// Which assembly reference of a package to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefRole {
    Holder,
    Charger,
}

impl RefRole {
    /// Wire tag of the reference role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Holder => "holder",
            Self::Charger => "charger",
        }
    }

    /// Parses a caller-supplied reference tag.
    pub fn parse(tag: &str) -> Result<Self, ValidationError> {
        match tag {
            "holder" => Ok(Self::Holder),
            "charger" => Ok(Self::Charger),
            other => Err(ValidationError::UnknownReferenceRole(other.to_string())),
        }
    }
}

impl fmt::Display for RefRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Primary key, externally supplied, unique at creation.
    pub case_id: String,
    /// Immutable after creation; empty means "not applicable".
    pub holder_assembly_id: String,
    /// Immutable after creation; empty means "not applicable".
    pub charger_assembly_id: String,
    /// Free-form status code; no transition guard applies.
    pub status: String,
    /// 14-digit packaging date, validated on entry.
    pub packaging_date: String,
    pub shipping_address: String,
    pub created_on: String,
    pub last_updated_on: String,
    pub created_by: String,
    pub last_updated_by: String,
    /// Write-once hash marker, same semantics as the assembly field.
    pub info2: String,
}

impl PackageRecord {
    /// The assembly id held in the given reference slot.
    #[must_use]
    pub fn reference(&self, role: RefRole) -> &str {
        match role {
            RefRole::Holder => &self.holder_assembly_id,
            RefRole::Charger => &self.charger_assembly_id,
        }
    }

    /// Both reference slots, holder first.
    #[must_use]
    pub fn references(&self) -> [&str; 2] {
        [&self.holder_assembly_id, &self.charger_assembly_id]
    }

    /// Refreshes the last-update metadata.
    pub fn touch(&mut self, user: &str) {
        self.last_updated_on = stamp::now();
        self.last_updated_by = user.to_string();
    }
}

impl TrackedRecord for PackageRecord {
    const KIND: &'static str = "Package";
    const INDEX_KEY: &'static str = "Packages";

    fn id(&self) -> &str {
        &self.case_id
    }
}
