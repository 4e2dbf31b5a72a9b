//! Identity mapping and the authorization gate.
//!
//! The identity mapping is an external collaborator: user name -> role
//! string, stored at the plain name key in the same ledger namespace as
//! the records. This core only reads it, apart from the bootstrap
//! register operation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, StoreError, TrackResult, ValidationError};
use crate::ledger::Ledger;

/// The closed set of acting roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// May create and mutate assemblies.
    AssemblyLine,
    /// May create and mutate packages (and, through propagation, the
    /// assemblies a package references).
    PackageLine,
    /// Read-only access to both entity types.
    Viewer,
}

impl Role {
    /// Wire form of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AssemblyLine => "assembly-line",
            Self::PackageLine => "package-line",
            Self::Viewer => "viewer",
        }
    }

    /// Parses a stored or caller-supplied role string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "assembly-line" => Some(Self::AssemblyLine),
            "package-line" => Some(Self::PackageLine),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves user names to roles and denies mismatched operations.
#[derive(Clone)]
pub struct IdentityGate {
    ledger: Arc<dyn Ledger>,
}

impl IdentityGate {
    /// Creates a gate over the given ledger.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Bootstrap write: map `name` to `role`.
    ///
    /// Re-registering an existing name overwrites the mapping; this is a
    /// test/bootstrap affordance, not a governed operation.
    ///
    /// # Errors
    ///
    /// `ValidationError::UnknownRole` if `role` is not one of the closed
    /// role set.
    pub fn register(&self, name: &str, role: &str) -> TrackResult<()> {
        if name.is_empty() {
            return Err(AuthError::EmptyIdentity.into());
        }
        let role = Role::parse(role)
            .ok_or_else(|| ValidationError::UnknownRole(role.to_string()))?;
        self.ledger.put(name, role.as_str().as_bytes().to_vec())?;
        Ok(())
    }

    /// Reads the role string mapped to `name`, or `None` if unmapped.
    pub fn lookup(&self, name: &str) -> TrackResult<Option<String>> {
        let Some(bytes) = self.ledger.get(name)? else {
            return Ok(None);
        };
        let role = String::from_utf8(bytes).map_err(|_| StoreError::CorruptState {
            key: name.to_string(),
            reason: "role mapping is not valid UTF-8".to_string(),
        })?;
        Ok(Some(role))
    }

    /// Authorizes `name` against `required` roles, returning the resolved
    /// role on success. No side effects.
    ///
    /// # Errors
    ///
    /// - `AuthError::EmptyIdentity` for an empty name
    /// - `AuthError::UnknownIdentity` for an unmapped name
    /// - `AuthError::PermissionDenied` if the mapped role is not a member
    ///   of `required` (an unparseable stored role is treated the same)
    pub fn authorize(&self, name: &str, required: &[Role]) -> TrackResult<Role> {
        if name.is_empty() {
            return Err(AuthError::EmptyIdentity.into());
        }
        let Some(stored) = self.lookup(name)? else {
            return Err(AuthError::UnknownIdentity {
                name: name.to_string(),
            }
            .into());
        };
        match Role::parse(&stored) {
            Some(role) if required.contains(&role) => Ok(role),
            _ => Err(AuthError::PermissionDenied {
                name: name.to_string(),
                required: required.to_vec(),
            }
            .into()),
        }
    }
}
