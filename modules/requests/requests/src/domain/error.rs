use qp_filter::FilterError;
use requests_sdk::RequestsError;
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Request not found: {id}")]
    RequestNotFound { id: Uuid },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("{service} unavailable: {message}")]
    DependencyUnavailable {
        service: &'static str,
        message: String,
    },

    #[error("File not found: {id}")]
    FileNotFound { id: Uuid },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    #[must_use]
    pub fn request_not_found(id: Uuid) -> Self {
        Self::RequestNotFound { id }
    }

    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn dependency_unavailable(service: &'static str, message: impl Into<String>) -> Self {
        Self::DependencyUnavailable {
            service,
            message: message.into(),
        }
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for RequestsError {
    fn from(domain_error: DomainError) -> Self {
        match domain_error {
            DomainError::RequestNotFound { id } => RequestsError::not_found("Request", id),
            DomainError::FileNotFound { id } => RequestsError::not_found("File", id),
            DomainError::Validation { field, message } => {
                RequestsError::validation(format!("{field}: {message}"))
            }
            DomainError::Filter(e) => RequestsError::validation(e.to_string()),
            DomainError::Forbidden { message } => RequestsError::forbidden(message),
            DomainError::DependencyUnavailable { service, message } => {
                RequestsError::dependency_unavailable(format!("{service}: {message}"))
            }
            DomainError::Storage(e) => {
                tracing::error!(error = %e, "Storage error occurred");
                RequestsError::internal()
            }
        }
    }
}
