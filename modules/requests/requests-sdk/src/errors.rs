//! Public error types for the `requests` module.
//!
//! These errors are safe to expose to other modules and consumers. They name
//! an error kind and a message; mapping to a transport status is up to the
//! caller.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestsError {
    /// Input or workflow precondition rejected.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Entity with the specified id was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// The actor may not touch this request.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// A sibling service could not be reached.
    #[error("Dependency unavailable: {message}")]
    DependencyUnavailable { message: String },

    #[error("Internal error")]
    Internal,
}

impl RequestsError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn dependency_unavailable(message: impl Into<String>) -> Self {
        Self::DependencyUnavailable {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::Internal
    }
}
