use std::sync::Arc;

use axum::routing::{get, patch};
use axum::{Extension, Router};

use super::handlers;
use crate::domain::service::RequestsService;

#[must_use]
pub fn router(service: Arc<RequestsService>) -> Router {
    Router::new()
        .route("/requests", get(handlers::list_requests))
        .route("/requests/report", get(handlers::list_report))
        .route(
            "/requests/{id}",
            get(handlers::get_request).patch(handlers::update_request),
        )
        .route("/requests/{id}/status", patch(handlers::update_status))
        .route("/requests/{id}/history", get(handlers::get_history))
        .layer(Extension(service))
}
