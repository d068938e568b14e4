//! Local implementation of `RequestsClientV1`.
//!
//! Used for in-process callers. Delegates to the domain service and converts
//! errors to SDK error types.

use std::sync::Arc;

use async_trait::async_trait;
use qp_filter::QueryParams;
use requests_sdk::{
    Actor, HistoryLog, Request, RequestUpdate, RequestsClientV1, RequestsError, StatusUpdate,
};
use uuid::Uuid;

use crate::domain::service::RequestsService;

pub struct RequestsLocalClient {
    service: Arc<RequestsService>,
}

impl RequestsLocalClient {
    #[must_use]
    pub fn new(service: Arc<RequestsService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RequestsClientV1 for RequestsLocalClient {
    async fn get_request(&self, actor: &Actor, id: Uuid) -> Result<Request, RequestsError> {
        self.service.get_request(actor, id).await.map_err(Into::into)
    }

    async fn list_requests(
        &self,
        actor: &Actor,
        params: &QueryParams,
    ) -> Result<Vec<Request>, RequestsError> {
        self.service
            .list_requests(actor, params)
            .await
            .map_err(Into::into)
    }

    async fn update_request(
        &self,
        actor: &Actor,
        id: Uuid,
        update: RequestUpdate,
    ) -> Result<Request, RequestsError> {
        self.service
            .update_request(actor, id, update)
            .await
            .map_err(Into::into)
    }

    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        update: StatusUpdate,
    ) -> Result<Request, RequestsError> {
        self.service
            .update_status(actor, id, update)
            .await
            .map_err(Into::into)
    }

    async fn get_history(&self, actor: &Actor, id: Uuid) -> Result<HistoryLog, RequestsError> {
        self.service.get_history(actor, id).await.map_err(Into::into)
    }
}
