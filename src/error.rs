//! Error types for trackline.
//!
//! All errors are strongly typed using thiserror. This enables pattern
//! matching on specific error conditions and provides clear error messages
//! at the call boundary, where the dispatch layer decides whether to retry
//! a whole operation.

use thiserror::Error;

use crate::identity::Role;

/// Validation errors that occur while checking caller input.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Operation '{op}' expects {expected} arguments, got {actual}")]
    WrongArgumentCount {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Field '{field}' must be a 14-digit YYYYMMDDHHMMSS stamp, got '{value}'")]
    MalformedStamp {
        field: &'static str,
        value: String,
    },

    #[error("Unknown batch kind: '{0}'")]
    UnknownBatchKind(String),

    #[error("Unknown assembly reference role: '{0}' (expected 'holder' or 'charger')")]
    UnknownReferenceRole(String),

    #[error("Unknown role: '{0}'")]
    UnknownRole(String),

    #[error("Unknown operation: '{0}'")]
    UnknownOperation(String),
}

/// Authorization errors raised by the identity gate and the status guard.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User name cannot be empty")]
    EmptyIdentity,

    #[error("Unknown identity: '{name}'")]
    UnknownIdentity {
        name: String,
    },

    #[error("Permission denied for '{name}': operation requires one of {required:?}")]
    PermissionDenied {
        name: String,
        required: Vec<Role>,
    },

    #[error("Permission denied: assembly '{id}' transition '{current}' -> '{target}' is not allowed from the assembly line")]
    TransitionDenied {
        id: String,
        current: String,
        target: String,
    },
}

/// Storage-layer errors: precondition failures and state drift.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: '{id}'")]
    NotFound {
        kind: &'static str,
        id: String,
    },

    #[error("{kind} already exists: '{id}'")]
    AlreadyExists {
        kind: &'static str,
        id: String,
    },

    #[error("Corrupt state at key '{key}': {reason}")]
    CorruptState {
        key: String,
        reason: String,
    },

    #[error("Serialization failed at key '{key}': {reason}")]
    Encode {
        key: String,
        reason: String,
    },

    #[error("Propagation failed: referenced assembly '{id}' does not resolve")]
    Propagation {
        id: String,
    },

    #[error("Ledger backend error: {0}")]
    Backend(String),
}

/// Top-level error type for trackline.
///
/// This enum encompasses all errors an operation can return. No error is
/// fatal to the process; every operation is recoverable at the call
/// boundary.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl TrackError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this error denies the caller's authority, either at
    /// the identity gate or at the status transition guard.
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::PermissionDenied { .. } | AuthError::TransitionDenied { .. })
        )
    }

    /// Returns true if this is an unknown-identity failure.
    #[must_use]
    pub const fn is_unknown_identity(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::UnknownIdentity { .. } | AuthError::EmptyIdentity)
        )
    }

    /// Returns true if a required primary key was absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound { .. }))
    }

    /// Returns true if a create hit an occupied key.
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::Store(StoreError::AlreadyExists { .. }))
    }

    /// Returns true if stored bytes failed to decode as the expected record.
    #[must_use]
    pub const fn is_corrupt_state(&self) -> bool {
        matches!(self, Self::Store(StoreError::CorruptState { .. }))
    }

    /// Returns true if a cross-entity reference failed to resolve.
    #[must_use]
    pub const fn is_propagation(&self) -> bool {
        matches!(self, Self::Store(StoreError::Propagation { .. }))
    }
}

/// Result type alias for trackline operations.
pub type TrackResult<T> = Result<T, TrackError>;
