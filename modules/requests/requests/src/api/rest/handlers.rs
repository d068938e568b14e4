use std::sync::Arc;

use axum::extract::{Path, RawQuery};
use axum::{Extension, Json};
use qp_filter::QueryParams;
use requests_sdk::{RequestUpdate, StatusUpdate};
use serde_json::Value;
use tracing::field::Empty;
use uuid::Uuid;

use super::actor::CurrentActor;
use super::dto::{HistoryLogDto, StatusUpdateReq, UpdateRequestReq};
use super::error::ApiResult;
use crate::domain::document::to_document;
use crate::domain::service::RequestsService;

fn params(raw: Option<&str>) -> ApiResult<QueryParams> {
    Ok(QueryParams::from_query_str(raw.unwrap_or_default())?)
}

/// List requests visible to the actor, filtered by query parameters.
#[tracing::instrument(skip_all, fields(actor.id = %actor.id, count = Empty))]
pub async fn list_requests(
    CurrentActor(actor): CurrentActor,
    Extension(svc): Extension<Arc<RequestsService>>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<Vec<Value>>> {
    let params = params(query.as_deref())?;
    let requests = svc.list_requests(&actor, &params).await?;
    tracing::Span::current().record("count", requests.len());
    Ok(Json(requests.iter().map(to_document).collect()))
}

/// Staff report over a mandatory creation date range.
#[tracing::instrument(skip_all, fields(actor.id = %actor.id))]
pub async fn list_report(
    CurrentActor(actor): CurrentActor,
    Extension(svc): Extension<Arc<RequestsService>>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<Vec<Value>>> {
    let params = params(query.as_deref())?;
    let requests = svc.list_for_report(&actor, &params).await?;
    Ok(Json(requests.iter().map(to_document).collect()))
}

#[tracing::instrument(skip_all, fields(actor.id = %actor.id, request.id = %id))]
pub async fn get_request(
    CurrentActor(actor): CurrentActor,
    Extension(svc): Extension<Arc<RequestsService>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let request = svc.get_request(&actor, id).await?;
    Ok(Json(to_document(&request)))
}

#[tracing::instrument(skip_all, fields(actor.id = %actor.id, request.id = %id))]
pub async fn update_request(
    CurrentActor(actor): CurrentActor,
    Extension(svc): Extension<Arc<RequestsService>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequestReq>,
) -> ApiResult<Json<Value>> {
    let update = RequestUpdate::try_from(req)?;
    let request = svc.update_request(&actor, id, update).await?;
    Ok(Json(to_document(&request)))
}

#[tracing::instrument(skip_all, fields(actor.id = %actor.id, request.id = %id))]
pub async fn update_status(
    CurrentActor(actor): CurrentActor,
    Extension(svc): Extension<Arc<RequestsService>>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateReq>,
) -> ApiResult<Json<Value>> {
    let update = StatusUpdate::try_from(req)?;
    let request = svc.update_status(&actor, id, update).await?;
    Ok(Json(to_document(&request)))
}

#[tracing::instrument(skip_all, fields(actor.id = %actor.id, request.id = %id))]
pub async fn get_history(
    CurrentActor(actor): CurrentActor,
    Extension(svc): Extension<Arc<RequestsService>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<HistoryLogDto>> {
    let log = svc.get_history(&actor, id).await?;
    Ok(Json(log.into()))
}
