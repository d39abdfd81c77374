//! Service error model.
//!
//! One taxonomy for the whole core: validation failures are raised before any
//! side effect, collaborator failures are wrapped as `Internal` with a trace
//! identifier, and the transport layer maps each variant to a protocol status.

use thiserror::Error;
use uuid::Uuid;

/// Result type used across the service layers.
pub type Result<T> = core::result::Result<T, Error>;

/// Service-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed command input, detected before any side effect.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested record was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness invariant was violated (email, role name+tenant,
    /// assignment user+tenant, permission resource+action).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Bad credentials, inactive user, invalid/expired token, or a missing
    /// role/permission.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A repository/cache/bus failure, wrapped with a trace identifier.
    #[error("internal error [trace {trace_id}]: {message}")]
    Internal { message: String, trace_id: String },
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Wrap a collaborator failure, attaching a fresh trace identifier.
    pub fn internal(source: impl core::fmt::Display) -> Self {
        Self::Internal {
            message: source.to_string(),
            trace_id: Uuid::now_v7().to_string(),
        }
    }

    /// True for the conflict class (used by saga consumers to treat
    /// redelivered duplicates as non-fatal).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
