//! Assembly status codes and the transition guard.
//!
//! Statuses travel as short decimal codes. Four codes carry transition
//! rules; every other code is an in-flow status the guard leaves
//! unrestricted. Package statuses have no guard of their own; package
//! transitions are bounded only by role authorization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::identity::Role;

/// Assembly lifecycle status, keyed by wire code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssemblyStatus {
    /// Code `2`: failed quality assurance.
    QaFailed,
    /// Code `6`: cleared for packaging; frozen against assembly-line edits.
    ReadyForPackaging,
    /// Code `7`: consumed by a package. Only cross-entity propagation may
    /// set this.
    Packaged,
    /// Code `8`: cancelled; frozen against assembly-line edits.
    Cancelled,
    /// Any other in-flow code, unrestricted by the guard.
    Other(String),
}

impl AssemblyStatus {
    /// Parses a wire code. Unrecognized codes are preserved as-is.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "2" => Self::QaFailed,
            "6" => Self::ReadyForPackaging,
            "7" => Self::Packaged,
            "8" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire code of this status.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::QaFailed => "2",
            Self::ReadyForPackaging => "6",
            Self::Packaged => "7",
            Self::Cancelled => "8",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for AssemblyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for AssemblyStatus {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<AssemblyStatus> for String {
    fn from(status: AssemblyStatus) -> Self {
        status.code().to_string()
    }
}

/// Validates an assembly-line status change against the stored record.
///
/// The rules bind only the assembly-line role; the package line mutates
/// assemblies exclusively through propagation, and viewers cannot reach a
/// mutation at all.
///
/// # Errors
///
/// `AuthError::TransitionDenied` when:
/// - the current status is `ReadyForPackaging` or `Cancelled` (the record
///   is frozen against assembly-line edits),
/// - the current status is `QaFailed` and the target is
///   `ReadyForPackaging` (a QA failure cannot be bypassed straight back to
///   ready),
/// - the target is `Packaged` (reserved for cross-entity propagation).
pub fn check_assembly_transition(
    role: Role,
    id: &str,
    current: &AssemblyStatus,
    target: &AssemblyStatus,
) -> Result<(), AuthError> {
    if role != Role::AssemblyLine {
        return Ok(());
    }

    let denied = matches!(
        current,
        AssemblyStatus::ReadyForPackaging | AssemblyStatus::Cancelled
    ) || (*current == AssemblyStatus::QaFailed && *target == AssemblyStatus::ReadyForPackaging)
        || *target == AssemblyStatus::Packaged;

    if denied {
        return Err(AuthError::TransitionDenied {
            id: id.to_string(),
            current: current.code().to_string(),
            target: target.code().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for code in ["2", "6", "7", "8", "1", "42"] {
            assert_eq!(AssemblyStatus::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(AssemblyStatus::from_code("2"), AssemblyStatus::QaFailed);
        assert_eq!(AssemblyStatus::from_code("6"), AssemblyStatus::ReadyForPackaging);
        assert_eq!(AssemblyStatus::from_code("7"), AssemblyStatus::Packaged);
        assert_eq!(AssemblyStatus::from_code("8"), AssemblyStatus::Cancelled);
        assert_eq!(
            AssemblyStatus::from_code("3"),
            AssemblyStatus::Other("3".to_string())
        );
    }

    #[test]
    fn test_serializes_as_plain_code() {
        let json = serde_json::to_string(&AssemblyStatus::Packaged).unwrap();
        assert_eq!(json, "\"7\"");
        let back: AssemblyStatus = serde_json::from_str("\"6\"").unwrap();
        assert_eq!(back, AssemblyStatus::ReadyForPackaging);
    }

    fn check(current: &str, target: &str) -> Result<(), AuthError> {
        check_assembly_transition(
            Role::AssemblyLine,
            "ASM-1",
            &AssemblyStatus::from_code(current),
            &AssemblyStatus::from_code(target),
        )
    }

    #[test]
    fn test_frozen_statuses_reject_any_edit() {
        assert!(check("6", "1").is_err());
        assert!(check("6", "6").is_err());
        assert!(check("8", "1").is_err());
    }

    #[test]
    fn test_qa_failed_cannot_jump_to_ready() {
        assert!(check("2", "6").is_err());
        // Other exits from QA-failed are allowed.
        assert!(check("2", "1").is_ok());
        assert!(check("2", "8").is_ok());
    }

    #[test]
    fn test_packaged_is_propagation_only() {
        assert!(check("1", "7").is_err());
        assert!(check("2", "7").is_err());
    }

    #[test]
    fn test_unrestricted_flow() {
        assert!(check("1", "2").is_ok());
        assert!(check("3", "6").is_ok());
        assert!(check("1", "8").is_ok());
    }

    #[test]
    fn test_guard_binds_only_the_assembly_line() {
        for role in [Role::PackageLine, Role::Viewer] {
            let result = check_assembly_transition(
                role,
                "ASM-1",
                &AssemblyStatus::ReadyForPackaging,
                &AssemblyStatus::Packaged,
            );
            assert!(result.is_ok());
        }
    }
}
