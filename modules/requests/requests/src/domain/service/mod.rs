//! Domain service for maintenance requests.
//!
//! Listing runs the raw query through the filter table of the actor's view and
//! adds access-scoping fragments. Updates run a fixed sequence of field
//! mutators against one request, collect [`ChangeRecord`]s, keep compensations
//! for side effects outside the request document, and fold the records into
//! the request's history once the request is persisted.

use chrono::{Duration, Utc};
use qp_filter::{FilterSpec, QueryParams, TranslatorLimits, translate};
use requests_sdk::{Actor, ActorRole, ChangeRecord, FileRef, HistoryLog, Request};
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

use super::change_tracker::ChangeTracker;
use super::error::DomainError;
use super::filters;
use super::history::{HistoryWindows, fold_entry};
use super::ports::Ports;
use super::rollback::RollbackStack;
use crate::config::RequestsConfig;

mod general;
mod resources;
mod status;

/// Service configuration extracted from module config.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub tenant_max_page_size: u64,
    pub history_windows: HistoryWindows,
    pub file_link_prefix: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from(&RequestsConfig::default())
    }
}

impl From<&RequestsConfig> for ServiceConfig {
    fn from(cfg: &RequestsConfig) -> Self {
        Self {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
            tenant_max_page_size: cfg.tenant_max_page_size,
            history_windows: HistoryWindows {
                merge: Duration::seconds(cfg.history_merge_window_secs),
                creation_grace: Duration::seconds(cfg.creation_grace_secs),
            },
            file_link_prefix: cfg.file_link_prefix.trim_end_matches('/').to_owned(),
        }
    }
}

struct ListViews {
    dispatcher: FilterSpec<Value>,
    tenant: FilterSpec<Value>,
    report: FilterSpec<Value>,
}

/// Domain service for request listing and audited updates.
pub struct RequestsService {
    ports: Ports,
    config: ServiceConfig,
    views: ListViews,
}

impl RequestsService {
    #[must_use]
    pub fn new(ports: Ports, config: ServiceConfig) -> Self {
        Self {
            ports,
            config,
            views: ListViews {
                dispatcher: filters::dispatcher_spec(),
                tenant: filters::tenant_spec(),
                report: filters::report_spec(),
            },
        }
    }

    /// # Errors
    /// Fails when the request does not exist or the actor may not read it.
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn get_request(&self, actor: &Actor, id: Uuid) -> Result<Request, DomainError> {
        let request = self.load(id).await?;
        check_read_access(actor, &request)?;
        Ok(request)
    }

    /// # Errors
    /// Fails on invalid filter parameters or when the actor has no scope.
    #[instrument(skip(self, actor, params), fields(actor_id = %actor.id, role = %actor.role))]
    pub async fn list_requests(
        &self,
        actor: &Actor,
        params: &QueryParams,
    ) -> Result<Vec<Request>, DomainError> {
        let (spec, max_limit) = match actor.role {
            ActorRole::Tenant => (&self.views.tenant, self.config.tenant_max_page_size),
            _ => (&self.views.dispatcher, self.config.max_page_size),
        };
        self.run_list(actor, params, spec, max_limit).await
    }

    /// Staff report listing; a creation date range is mandatory.
    ///
    /// # Errors
    /// Fails for tenants and when the date range is missing.
    #[instrument(skip(self, actor, params), fields(actor_id = %actor.id))]
    pub async fn list_for_report(
        &self,
        actor: &Actor,
        params: &QueryParams,
    ) -> Result<Vec<Request>, DomainError> {
        if actor.role == ActorRole::Tenant {
            return Err(DomainError::forbidden("reports are not available to tenants"));
        }
        self.run_list(actor, params, &self.views.report, self.config.max_page_size)
            .await
    }

    /// # Errors
    /// Fails when the request does not exist or the actor may not read it.
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn get_history(&self, actor: &Actor, id: Uuid) -> Result<HistoryLog, DomainError> {
        let request = self.load(id).await?;
        check_read_access(actor, &request)?;
        let log = self.ports.history.get(id).await?;
        Ok(log.unwrap_or_else(|| HistoryLog::new(id)))
    }

    async fn run_list(
        &self,
        actor: &Actor,
        params: &QueryParams,
        spec: &FilterSpec<Value>,
        max_limit: u64,
    ) -> Result<Vec<Request>, DomainError> {
        let limits = TranslatorLimits::new()
            .with_default_limit(self.config.default_page_size.min(max_limit))
            .with_max_limit(max_limit);

        let mut query = translate(params, spec)?;
        limits.validate_sort_count(query.sort.len())?;
        query.limit = Some(query.limit_or(&limits));

        for fragment in self.scope_fragments(actor).await? {
            query.push_fragment(fragment);
        }

        tracing::debug!(
            fragments = query.fragments.len(),
            limit = query.limit.unwrap_or_default(),
            "listing requests"
        );
        self.ports
            .requests
            .list(&query)
            .await
            .map_err(DomainError::from)
    }

    /// Fragments restricting a listing to what `actor` may see.
    async fn scope_fragments(&self, actor: &Actor) -> Result<Vec<Value>, DomainError> {
        match actor.role {
            ActorRole::System => Ok(Vec::new()),
            ActorRole::Tenant => Ok(vec![json!({
                "$or": [
                    { "created_by": actor.id },
                    { "is_public": true },
                ]
            })]),
            ActorRole::Dispatcher => {
                let provider_id = staff_provider(actor)?;
                Ok(vec![json!({ "_binds.pr": provider_id })])
            }
            ActorRole::Worker => {
                let provider_id = staff_provider(actor)?;
                let houses = self
                    .ports
                    .directory
                    .resolve_allowed_house_ids(provider_id, actor.id)
                    .await?;
                Ok(vec![
                    json!({ "_binds.pr": provider_id }),
                    json!({ "house._id": { "$in": houses } }),
                ])
            }
        }
    }

    async fn load(&self, id: Uuid) -> Result<Request, DomainError> {
        self.ports
            .requests
            .get(id)
            .await?
            .ok_or_else(|| DomainError::request_not_found(id))
    }

    fn file_link(&self, file: &FileRef) -> String {
        format!("{}/{}", self.config.file_link_prefix, file.id)
    }

    /// Persist the request, settle the rollback stack, then write history.
    ///
    /// A call that recorded no change persists nothing.
    async fn finish(
        &self,
        actor: &Actor,
        request: Request,
        tracker: ChangeTracker,
        rollback: RollbackStack,
        tag: Option<&str>,
    ) -> Result<Request, DomainError> {
        if tracker.is_empty() {
            rollback.commit(&self.ports).await;
            return Ok(request);
        }

        if let Err(e) = self.ports.requests.save(&request).await {
            rollback.unwind(&self.ports).await;
            return Err(e.into());
        }
        rollback.commit(&self.ports).await;

        tracing::info!(
            request_id = %request.id,
            changes = tracker.len(),
            "request updated"
        );
        self.write_history(actor, &request, tracker.into_records(), tag)
            .await;
        Ok(request)
    }

    /// Best-effort: the request is already persisted, so failures are logged.
    async fn write_history(
        &self,
        actor: &Actor,
        request: &Request,
        records: Vec<ChangeRecord>,
        tag: Option<&str>,
    ) {
        let log = match self.ports.history.get(request.id).await {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(request_id = %request.id, error = %e, "history load failed");
                return;
            }
        };
        let Some(log) = fold_entry(
            log,
            request,
            actor.into(),
            records,
            tag,
            &self.config.history_windows,
            Utc::now(),
        ) else {
            return;
        };
        if let Err(e) = self.ports.history.save(&log).await {
            tracing::warn!(request_id = %request.id, error = %e, "history write failed");
        }
    }
}

fn staff_provider(actor: &Actor) -> Result<Uuid, DomainError> {
    actor
        .provider_id
        .ok_or_else(|| DomainError::forbidden("staff actor has no organization"))
}

fn check_read_access(actor: &Actor, request: &Request) -> Result<(), DomainError> {
    match actor.role {
        ActorRole::System => Ok(()),
        ActorRole::Tenant => {
            if request.created_by == actor.id || request.is_public {
                Ok(())
            } else {
                Err(DomainError::forbidden("request belongs to another tenant"))
            }
        }
        ActorRole::Dispatcher | ActorRole::Worker => check_bound(actor, request),
    }
}

fn check_write_access(actor: &Actor, request: &Request) -> Result<(), DomainError> {
    match actor.role {
        ActorRole::System => Ok(()),
        ActorRole::Tenant => {
            if request.created_by == actor.id {
                Ok(())
            } else {
                Err(DomainError::forbidden("request belongs to another tenant"))
            }
        }
        ActorRole::Dispatcher | ActorRole::Worker => check_bound(actor, request),
    }
}

fn check_bound(actor: &Actor, request: &Request) -> Result<(), DomainError> {
    let provider_id = staff_provider(actor)?;
    if request.binds.providers.contains(&provider_id) {
        Ok(())
    } else {
        Err(DomainError::forbidden(
            "request is not bound to the actor's organization",
        ))
    }
}
