//! `RequestsClientV1` trait definition.

use async_trait::async_trait;
use qp_filter::QueryParams;
use uuid::Uuid;

use crate::errors::RequestsError;
use crate::models::{Actor, HistoryLog, Request, RequestUpdate, StatusUpdate};

/// Public API of the `requests` module.
///
/// Every call runs on behalf of an authenticated [`Actor`].
#[async_trait]
pub trait RequestsClientV1: Send + Sync {
    async fn get_request(&self, actor: &Actor, id: Uuid) -> Result<Request, RequestsError>;

    /// List requests matching raw query parameters (`limit`, `offset`,
    /// `sort_by` and the filter keys of the actor's view).
    async fn list_requests(
        &self,
        actor: &Actor,
        params: &QueryParams,
    ) -> Result<Vec<Request>, RequestsError>;

    /// Apply a general (non-status) update and record it in history.
    async fn update_request(
        &self,
        actor: &Actor,
        id: Uuid,
        update: RequestUpdate,
    ) -> Result<Request, RequestsError>;

    /// Move a request to a new status and record it in history.
    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        update: StatusUpdate,
    ) -> Result<Request, RequestsError>;

    async fn get_history(&self, actor: &Actor, id: Uuid) -> Result<HistoryLog, RequestsError>;
}
