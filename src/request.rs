//! The operation surface and request envelope.
//!
//! Every operation arrives as a name plus a flat ordered list of text
//! arguments. The names form a closed enumeration: callers resolve a
//! name to an [`OpKind`] once and the dispatcher routes on the variant,
//! never on per-call string comparison. The envelope carries a protocol
//! version, a request id, and a timestamp for audit logs, wrapping the
//! operation the way a transport would ship it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TrackError, ValidationError};

/// Every named operation, mutations and reads alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpKind {
    CreateAssembly,
    UpdateAssemblyById,
    UpdateAssemblyStatusById,
    UpdateAssemblySecondaryHashById,
    CreatePackage,
    UpdatePackage,
    UpdatePackageSecondaryHashById,
    RegisterIdentity,
    GetAssemblyById,
    GetAllAssemblies,
    GetAssembliesByBatchNumber,
    GetAssembliesByDate,
    GetAssembliesByBatchAndDate,
    GetAssemblyHistoryById,
    GetAssemblyHistoryByDate,
    GetAssemblyHistoryByBatchAndDate,
    GetPackageById,
    GetAllPackages,
    GetPackagesByAssemblyReference,
    GetPackagesByDate,
    GetPackagesByAssemblyReferenceAndDate,
    GetPackageHistoryById,
    GetPackageHistoryByDate,
    ListAllAssemblyIds,
    ListAllPackageIds,
    LookupIdentity,
}

impl OpKind {
    /// Every operation, in surface order.
    pub const ALL: [Self; 26] = [
        Self::CreateAssembly,
        Self::UpdateAssemblyById,
        Self::UpdateAssemblyStatusById,
        Self::UpdateAssemblySecondaryHashById,
        Self::CreatePackage,
        Self::UpdatePackage,
        Self::UpdatePackageSecondaryHashById,
        Self::RegisterIdentity,
        Self::GetAssemblyById,
        Self::GetAllAssemblies,
        Self::GetAssembliesByBatchNumber,
        Self::GetAssembliesByDate,
        Self::GetAssembliesByBatchAndDate,
        Self::GetAssemblyHistoryById,
        Self::GetAssemblyHistoryByDate,
        Self::GetAssemblyHistoryByBatchAndDate,
        Self::GetPackageById,
        Self::GetAllPackages,
        Self::GetPackagesByAssemblyReference,
        Self::GetPackagesByDate,
        Self::GetPackagesByAssemblyReferenceAndDate,
        Self::GetPackageHistoryById,
        Self::GetPackageHistoryByDate,
        Self::ListAllAssemblyIds,
        Self::ListAllPackageIds,
        Self::LookupIdentity,
    ];

    /// Wire name of the operation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateAssembly => "create-assembly",
            Self::UpdateAssemblyById => "update-assembly-by-id",
            Self::UpdateAssemblyStatusById => "update-assembly-status-by-id",
            Self::UpdateAssemblySecondaryHashById => "update-assembly-secondary-hash-by-id",
            Self::CreatePackage => "create-package",
            Self::UpdatePackage => "update-package",
            Self::UpdatePackageSecondaryHashById => "update-package-secondary-hash-by-id",
            Self::RegisterIdentity => "register-identity",
            Self::GetAssemblyById => "get-assembly-by-id",
            Self::GetAllAssemblies => "get-all-assemblies",
            Self::GetAssembliesByBatchNumber => "get-assemblies-by-batch-number",
            Self::GetAssembliesByDate => "get-assemblies-by-date",
            Self::GetAssembliesByBatchAndDate => "get-assemblies-by-batch-and-date",
            Self::GetAssemblyHistoryById => "get-assembly-history-by-id",
            Self::GetAssemblyHistoryByDate => "get-assembly-history-by-date",
            Self::GetAssemblyHistoryByBatchAndDate => "get-assembly-history-by-batch-and-date",
            Self::GetPackageById => "get-package-by-id",
            Self::GetAllPackages => "get-all-packages",
            Self::GetPackagesByAssemblyReference => "get-packages-by-assembly-reference",
            Self::GetPackagesByDate => "get-packages-by-date",
            Self::GetPackagesByAssemblyReferenceAndDate => {
                "get-packages-by-assembly-reference-and-date"
            }
            Self::GetPackageHistoryById => "get-package-history-by-id",
            Self::GetPackageHistoryByDate => "get-package-history-by-date",
            Self::ListAllAssemblyIds => "list-all-assembly-ids",
            Self::ListAllPackageIds => "list-all-package-ids",
            Self::LookupIdentity => "lookup-identity",
        }
    }

    /// Exact number of arguments the operation takes, trailing user name
    /// included where one applies.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self {
            Self::CreateAssembly | Self::UpdateAssemblyById => 14,
            Self::CreatePackage => 8,
            Self::UpdatePackage | Self::GetAssembliesByBatchAndDate
            | Self::GetAssemblyHistoryByBatchAndDate
            | Self::GetPackagesByAssemblyReferenceAndDate => 5,
            Self::UpdateAssemblyStatusById
            | Self::UpdateAssemblySecondaryHashById
            | Self::UpdatePackageSecondaryHashById
            | Self::GetAssembliesByBatchNumber
            | Self::GetAssembliesByDate
            | Self::GetAssemblyHistoryByDate
            | Self::GetPackagesByAssemblyReference
            | Self::GetPackagesByDate
            | Self::GetPackageHistoryByDate => 3,
            Self::RegisterIdentity
            | Self::GetAssemblyById
            | Self::GetAssemblyHistoryById
            | Self::GetPackageById
            | Self::GetPackageHistoryById => 2,
            Self::GetAllAssemblies | Self::GetAllPackages | Self::LookupIdentity => 1,
            Self::ListAllAssemblyIds | Self::ListAllPackageIds => 0,
        }
    }

    /// Resolves a wire name.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| ValidationError::UnknownOperation(name.to_string()))
    }
}

/// The envelope every operation travels in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Protocol version (e.g., "1.0").
    pub version: String,

    /// Unique identifier for this request (for tracing/debugging).
    pub request_id: Uuid,

    /// When this request was created.
    pub timestamp: DateTime<Utc>,

    /// The operation to execute.
    pub op: OpKind,

    /// Flat ordered argument list; all arguments are text.
    pub args: Vec<String>,
}

impl Request {
    /// Current protocol version.
    pub const CURRENT_VERSION: &'static str = "1.0";

    /// Creates a new request envelope.
    #[must_use]
    pub fn new(op: OpKind, args: Vec<String>) -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            op,
            args,
        }
    }

    /// Sets a custom request ID (useful for correlation).
    #[must_use]
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }
}

/// Serialize a request to pretty JSON.
pub fn to_json_pretty(request: &Request) -> Result<String, TrackError> {
    serde_json::to_string_pretty(request)
        .map_err(|e| TrackError::internal(format!("serialize request: {e}")))
}

/// Deserialize a request from JSON.
pub fn from_json(s: &str) -> Result<Request, TrackError> {
    serde_json::from_str(s).map_err(|e| TrackError::internal(format!("deserialize request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_round_trips() {
        for op in OpKind::ALL {
            assert_eq!(OpKind::parse(op.name()).unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_name_fails() {
        let err = OpKind::parse("drop-all-tables").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownOperation(_)));
    }

    #[test]
    fn test_serde_name_matches_wire_name() {
        for op in OpKind::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.name()));
        }
    }

    #[test]
    fn test_arities() {
        assert_eq!(OpKind::CreateAssembly.arity(), 14);
        assert_eq!(OpKind::CreatePackage.arity(), 8);
        assert_eq!(OpKind::UpdatePackage.arity(), 5);
        assert_eq!(OpKind::RegisterIdentity.arity(), 2);
        assert_eq!(OpKind::ListAllAssemblyIds.arity(), 0);
        assert_eq!(OpKind::LookupIdentity.arity(), 1);
    }

    #[test]
    fn test_request_json_round_trip() {
        let request = Request::new(
            OpKind::GetAssemblyById,
            vec!["ASM-1".to_string(), "vera".to_string()],
        );
        let json = to_json_pretty(&request).unwrap();
        let back = from_json(&json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn test_request_id_override() {
        let id = Uuid::new_v4();
        let request = Request::new(OpKind::ListAllAssemblyIds, Vec::new()).with_request_id(id);
        assert_eq!(request.request_id, id);
        assert_eq!(request.version, Request::CURRENT_VERSION);
    }
}
