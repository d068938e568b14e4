use async_trait::async_trait;
use qp_filter::TranslatedQuery;
use requests_sdk::{HistoryLog, Request};
use serde_json::Value;
use uuid::Uuid;

#[async_trait]
pub trait RequestsRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Request>>;

    /// Requests matching every fragment, sorted, with `offset`/`limit` applied.
    /// `query.limit` is already clamped by the caller.
    async fn list(&self, query: &TranslatedQuery<Value>) -> anyhow::Result<Vec<Request>>;

    /// Insert or replace by id.
    async fn save(&self, request: &Request) -> anyhow::Result<()>;
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn get(&self, request_id: Uuid) -> anyhow::Result<Option<HistoryLog>>;

    async fn save(&self, log: &HistoryLog) -> anyhow::Result<()>;
}
