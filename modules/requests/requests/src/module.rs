//! Composition root of the requests module.

use std::sync::Arc;

use axum::Router;
use requests_sdk::RequestsClientV1;
use tracing::info;

use crate::api::rest::routes;
use crate::config::RequestsConfig;
use crate::domain::ports::Ports;
use crate::domain::service::{RequestsService, ServiceConfig};
use crate::local_client::RequestsLocalClient;

/// Wires the domain service to its ports and exposes the client and router.
#[derive(Clone)]
pub struct RequestsModule {
    service: Arc<RequestsService>,
}

impl RequestsModule {
    #[must_use]
    pub fn new(config: &RequestsConfig, ports: Ports) -> Self {
        info!(
            default_page_size = config.default_page_size,
            max_page_size = config.max_page_size,
            "Initializing requests module"
        );
        let service = Arc::new(RequestsService::new(ports, ServiceConfig::from(config)));
        Self { service }
    }

    /// In-process client for other modules.
    #[must_use]
    pub fn client(&self) -> Arc<dyn RequestsClientV1> {
        Arc::new(RequestsLocalClient::new(self.service.clone()))
    }

    #[must_use]
    pub fn service(&self) -> Arc<RequestsService> {
        self.service.clone()
    }

    /// REST routes of the module, state already attached.
    #[must_use]
    pub fn router(&self) -> Router {
        routes::router(self.service.clone())
    }
}
