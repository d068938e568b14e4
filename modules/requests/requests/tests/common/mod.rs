#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Shared fixtures: in-memory storage, recording fakes for the sibling
//! service, and a sample request.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use requests::domain::error::DomainError;
use requests::domain::ports::{DirectoryPort, InventoryPort, Ports};
use requests::domain::service::{RequestsService, ServiceConfig};
use requests::infra::files::InMemoryFileStore;
use requests::infra::storage::{InMemoryHistoryRepository, InMemoryRequestsRepository};
use requests_sdk::{
    Actor, ActorRole, Binds, Execution, HouseRef, Relations, Request, RequestStatus, RequestTag,
    WarehouseLine,
};
use uuid::Uuid;

#[derive(Default)]
pub struct FakeDirectory {
    pub house_groups: Vec<Uuid>,
    pub workers: Vec<Uuid>,
    pub houses: Vec<Uuid>,
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl DirectoryPort for FakeDirectory {
    async fn resolve_house_group_ids(&self, house_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        self.calls.lock().push(format!("groups:{house_id}"));
        Ok(self.house_groups.clone())
    }

    async fn resolve_allowed_worker_ids(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<Uuid>, DomainError> {
        self.calls.lock().push(format!("workers:{provider_id}"));
        Ok(self.workers.clone())
    }

    async fn resolve_allowed_house_ids(
        &self,
        provider_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Vec<Uuid>, DomainError> {
        self.calls
            .lock()
            .push(format!("houses:{provider_id}:{worker_id}"));
        Ok(self.houses.clone())
    }
}

/// Inventory that reserves exactly what it is asked for and records each call.
#[derive(Default)]
pub struct FakeInventory {
    pub calls: Mutex<Vec<Vec<WarehouseLine>>>,
}

#[async_trait]
impl InventoryPort for FakeInventory {
    async fn upsert_reservation(
        &self,
        _request_id: Uuid,
        _provider_id: Uuid,
        lines: &[WarehouseLine],
    ) -> Result<Vec<WarehouseLine>, DomainError> {
        self.calls.lock().push(lines.to_vec());
        Ok(lines.to_vec())
    }
}

pub struct TestEnv {
    pub service: Arc<RequestsService>,
    pub requests: Arc<InMemoryRequestsRepository>,
    pub history: Arc<InMemoryHistoryRepository>,
    pub files: Arc<InMemoryFileStore>,
    pub directory: Arc<FakeDirectory>,
    pub inventory: Arc<FakeInventory>,
    pub ports: Ports,
}

impl TestEnv {
    pub fn new(directory: FakeDirectory, seed: Vec<Request>) -> Self {
        let requests = Arc::new(InMemoryRequestsRepository::with_requests(seed));
        let history = Arc::new(InMemoryHistoryRepository::new());
        let files = Arc::new(InMemoryFileStore::new());
        let directory = Arc::new(directory);
        let inventory = Arc::new(FakeInventory::default());
        let ports = Ports {
            requests: requests.clone(),
            history: history.clone(),
            directory: directory.clone(),
            inventory: inventory.clone(),
            files: files.clone(),
        };
        let service = Arc::new(RequestsService::new(
            ports.clone(),
            ServiceConfig::default(),
        ));
        Self {
            service,
            requests,
            history,
            files,
            directory,
            inventory,
            ports,
        }
    }
}

pub fn dispatcher(provider_id: Uuid) -> Actor {
    Actor {
        id: Uuid::now_v7(),
        name: "Dana Dispatcher".to_owned(),
        role: ActorRole::Dispatcher,
        provider_id: Some(provider_id),
    }
}

pub fn worker(provider_id: Uuid) -> Actor {
    Actor {
        id: Uuid::now_v7(),
        name: "Wes Worker".to_owned(),
        role: ActorRole::Worker,
        provider_id: Some(provider_id),
    }
}

pub fn tenant() -> Actor {
    Actor {
        id: Uuid::now_v7(),
        name: "Tara Tenant".to_owned(),
        role: ActorRole::Tenant,
        provider_id: None,
    }
}

/// A request created an hour ago, bound to `provider_id`.
pub fn sample_request(number: i64, provider_id: Uuid, created_by: Uuid) -> Request {
    Request {
        id: Uuid::now_v7(),
        number,
        created_at: Utc::now() - Duration::hours(1),
        created_by,
        dispatcher: None,
        house: HouseRef {
            id: Uuid::now_v7(),
            address: "12 Elm Street".to_owned(),
        },
        area: None,
        status: RequestStatus::Accepted,
        tag: RequestTag::Current,
        description: "Water on the stairs".to_owned(),
        desired_time: None,
        category: None,
        is_public: false,
        administrative_supervision: false,
        housing_supervision: false,
        relations: Relations::default(),
        execution: Execution::new(provider_id),
        requester_attachments: Vec::new(),
        binds: Binds {
            providers: vec![provider_id],
            house_groups: Vec::new(),
        },
    }
}
