//! Problem-details rendering of errors.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::header::CONTENT_TYPE;
use qp_filter::FilterError;
use requests_sdk::RequestsError;
use serde::{Serialize, Serializer};

use crate::domain::error::DomainError;

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

/// RFC 9457 problem details.
#[derive(Debug, Clone, Serialize)]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    #[serde(serialize_with = "serialize_status_code")]
    pub status: StatusCode,
    pub detail: String,
    pub code: String,
}

impl Problem {
    #[must_use]
    pub fn new(status: StatusCode, code: &str, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: status.canonical_reason().unwrap_or("Error").to_owned(),
            status,
            detail: detail.into(),
            code: code.to_owned(),
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut response = (status, Json(self)).into_response();
        if let Ok(value) = APPLICATION_PROBLEM_JSON.parse() {
            response.headers_mut().insert(CONTENT_TYPE, value);
        }
        response
    }
}

impl From<RequestsError> for Problem {
    fn from(e: RequestsError) -> Self {
        match &e {
            RequestsError::Validation { .. } => {
                Problem::new(StatusCode::BAD_REQUEST, "validation", e.to_string())
            }
            RequestsError::NotFound { .. } => {
                Problem::new(StatusCode::NOT_FOUND, "not_found", e.to_string())
            }
            RequestsError::Forbidden { .. } => {
                Problem::new(StatusCode::FORBIDDEN, "forbidden", e.to_string())
            }
            RequestsError::DependencyUnavailable { .. } => Problem::new(
                StatusCode::FAILED_DEPENDENCY,
                "dependency_unavailable",
                e.to_string(),
            ),
            RequestsError::Internal => Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "An internal error occurred",
            ),
        }
    }
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        RequestsError::from(e).into()
    }
}

impl From<FilterError> for Problem {
    fn from(e: FilterError) -> Self {
        DomainError::from(e).into()
    }
}

pub type ApiResult<T> = Result<T, Problem>;
