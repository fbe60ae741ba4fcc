//! Error taxonomy.
//!
//! One variant per kind named in the error-handling design, not one per
//! call site. `CoreError` wraps the kind with the operation name and a
//! correlation id so every caught error stays joinable to its audit trail.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::conflict::Conflict;

/// Opaque identifier that links a surfaced error back to the audit rows
/// and tracing spans an operation produced, even across process logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub String);

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl CorrelationId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

#[derive(Debug, Error, Clone)]
pub enum CoreErrorKind {
    #[error("permission denied: {permission}")]
    PermissionDenied { permission: String },

    #[error("validation failed on field `{field}`: {message}")]
    ValidationFailure { field: String, message: String },

    #[error("operation blocked: {reason}")]
    ConflictBlocking {
        reason: String,
        conflicts: Vec<Conflict>,
    },

    /// Not raised as an `Err` in normal flow — operations that merely
    /// warn return `Ok` with warnings attached. Kept in the taxonomy
    /// because callers that catch a boxed `CoreErrorKind` from a nested
    /// component need a matching arm.
    #[error("operation completed with warnings: {reason}")]
    ConflictWarning {
        reason: String,
        conflicts: Vec<Conflict>,
    },

    #[error("stale state on {entity} {id}: re-read and retry")]
    StaleState { entity: String, id: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error("transaction aborted during {operation}")]
    TransactionAborted { operation: String },

    #[error("notification delivery failed on channel {channel}")]
    NotificationDeliveryFailure { channel: String },
}

#[derive(Debug, Error, Clone)]
#[error("{kind} (operation={operation}, correlation_id={correlation_id})")]
pub struct CoreError {
    #[source]
    pub kind: CoreErrorKind,
    pub operation: &'static str,
    pub correlation_id: CorrelationId,
}

impl CoreError {
    pub fn new(
        operation: &'static str,
        correlation_id: CorrelationId,
        kind: CoreErrorKind,
    ) -> Self {
        Self {
            kind,
            operation,
            correlation_id,
        }
    }

    pub fn permission_denied(
        operation: &'static str,
        correlation_id: CorrelationId,
        permission: impl Into<String>,
    ) -> Self {
        Self::new(
            operation,
            correlation_id,
            CoreErrorKind::PermissionDenied {
                permission: permission.into(),
            },
        )
    }

    pub fn validation(
        operation: &'static str,
        correlation_id: CorrelationId,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            operation,
            correlation_id,
            CoreErrorKind::ValidationFailure {
                field: field.into(),
                message: message.into(),
            },
        )
    }

    pub fn blocking(
        operation: &'static str,
        correlation_id: CorrelationId,
        reason: impl Into<String>,
        conflicts: Vec<Conflict>,
    ) -> Self {
        Self::new(
            operation,
            correlation_id,
            CoreErrorKind::ConflictBlocking {
                reason: reason.into(),
                conflicts,
            },
        )
    }

    pub fn stale(
        operation: &'static str,
        correlation_id: CorrelationId,
        entity: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self::new(
            operation,
            correlation_id,
            CoreErrorKind::StaleState {
                entity: entity.into(),
                id: id.into(),
            },
        )
    }

    pub fn not_found(
        operation: &'static str,
        correlation_id: CorrelationId,
        entity: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self::new(
            operation,
            correlation_id,
            CoreErrorKind::NotFound {
                entity: entity.into(),
                id: id.into(),
            },
        )
    }

    pub fn aborted(operation: &'static str, correlation_id: CorrelationId) -> Self {
        Self::new(
            operation,
            correlation_id,
            CoreErrorKind::TransactionAborted {
                operation: operation.to_string(),
            },
        )
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// An operation that succeeded but has advisory warnings to surface
/// alongside its payload (over-hours, understaffing, ...). Never an
/// `Err` — warnings never block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Conflict>,
}

impl<T> Outcome<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<Conflict>) -> Self {
        Self { value, warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
