//! Outbound collaborators of the requests domain.

use std::sync::Arc;

use async_trait::async_trait;
use requests_sdk::{FileRef, WarehouseLine};
use uuid::Uuid;

use super::error::DomainError;
use super::repo::{HistoryRepository, RequestsRepository};

/// Organization/house directory of the sibling service.
#[async_trait]
pub trait DirectoryPort: Send + Sync {
    /// House groups a house belongs to, used as access binds.
    async fn resolve_house_group_ids(&self, house_id: Uuid) -> Result<Vec<Uuid>, DomainError>;

    /// Workers that may be assigned on behalf of an organization.
    async fn resolve_allowed_worker_ids(&self, provider_id: Uuid)
    -> Result<Vec<Uuid>, DomainError>;

    /// Houses a worker of an organization is allowed to see.
    async fn resolve_allowed_house_ids(
        &self,
        provider_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Vec<Uuid>, DomainError>;
}

/// Warehouse reservations of the sibling service.
#[async_trait]
pub trait InventoryPort: Send + Sync {
    /// Replace the reservation of `request_id` with `lines` and return what the
    /// inventory actually reserved.
    async fn upsert_reservation(
        &self,
        request_id: Uuid,
        provider_id: Uuid,
        lines: &[WarehouseLine],
    ) -> Result<Vec<WarehouseLine>, DomainError>;
}

/// Binary attachments. `tag` names the owner; reads and deletes with another
/// tag fail as not found.
#[async_trait]
pub trait FileStorePort: Send + Sync {
    async fn create(&self, name: &str, content: Vec<u8>, tag: &str)
    -> Result<FileRef, DomainError>;

    async fn read(&self, id: Uuid, tag: &str) -> Result<Vec<u8>, DomainError>;

    async fn delete(&self, id: Uuid, tag: &str) -> Result<(), DomainError>;
}

/// Everything the service talks to.
#[derive(Clone)]
pub struct Ports {
    pub requests: Arc<dyn RequestsRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub directory: Arc<dyn DirectoryPort>,
    pub inventory: Arc<dyn InventoryPort>,
    pub files: Arc<dyn FileStorePort>,
}

/// Owner tag of files attached to a request.
#[must_use]
pub fn file_tag(request_id: Uuid) -> String {
    format!("request:{request_id}")
}
