//! Contract error types for the system maintenance module
//!
//! These errors are transport-agnostic; the web and admin layers map them
//! to HTTP responses.

use thiserror::Error;

/// System maintenance domain errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaintenanceError {
    /// Entity not found
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource type (system, maintenance record, ...)
        resource: String,
        /// Resource identifier
        id: String,
    },

    /// Duplicate unique value or duplicate relationship edge
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// Input rejected before reaching the store
    #[error("Validation error: {field}: {message}")]
    Validation {
        /// Offending field, or `__all__` for errors spanning several fields
        field: String,
        message: String,
    },

    /// Delete refused because other rows still reference the entity
    #[error("Cannot delete {resource} {id}: still referenced by {referenced_by}")]
    Protected {
        resource: String,
        id: String,
        referenced_by: String,
    },

    /// Unknown username or wrong password
    #[error("Please enter a correct username and password")]
    InvalidCredentials,

    /// Correct credentials for a deactivated account
    #[error("This account is inactive")]
    InactiveAccount,

    /// Storage failure; details are logged, never returned
    #[error("Internal error")]
    Internal,
}

impl MaintenanceError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn protected(resource: &str, id: impl ToString, referenced_by: &str) -> Self {
        Self::Protected {
            resource: resource.to_string(),
            id: id.to_string(),
            referenced_by: referenced_by.to_string(),
        }
    }
}
