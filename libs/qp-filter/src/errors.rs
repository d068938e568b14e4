use std::fmt;

use thiserror::Error;

/// Failure of a single value parser.
///
/// Carries the human-readable message that is passed through to the client
/// inside [`FilterError::InvalidFilterValue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

impl ParseError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

/// Errors raised while translating query parameters.
///
/// Every variant is a client error; the caller decides the transport status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown filter parameters: {}", .0.join(", "))]
    UnknownFilter(Vec<String>),

    #[error("invalid value for filter '{key}': {message}")]
    InvalidFilterValue { key: String, message: String },

    #[error("missing required filter parameters: {}", .0.join(", "))]
    MissingRequiredFilter(Vec<String>),

    #[error("unsupported sort key: {0}")]
    InvalidSortKey(String),

    #[error("malformed query string: {0}")]
    MalformedQuery(String),
}

impl FilterError {
    pub(crate) fn invalid_value(key: &str, err: &ParseError) -> Self {
        Self::InvalidFilterValue {
            key: key.to_owned(),
            message: err.message().to_owned(),
        }
    }
}

pub type FilterResult<T> = Result<T, FilterError>;
