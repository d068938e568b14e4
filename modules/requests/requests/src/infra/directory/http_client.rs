//! HTTP adapter for the directory/inventory service.
//!
//! The service runs on several candidate hosts. The first host answering its
//! health endpoint is cached process-wide and reused until a request to it
//! fails to connect or times out; the next attempt probes again. Concurrent
//! callers may probe redundantly, which is harmless.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use requests_sdk::WarehouseLine;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use super::dto::{
    HouseGroupsDto, HousesDto, ReservationDto, ReservationItemDto, ReservationRequestDto,
    WorkersDto,
};
use crate::config::DirectoryConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::{DirectoryPort, InventoryPort};

const SERVICE: &str = "directory";

/// Implements [`DirectoryPort`] and [`InventoryPort`].
pub struct HttpDirectoryClient {
    client: reqwest::Client,
    hosts: Vec<Url>,
    health_path: String,
    probe_timeout: Duration,
    max_attempts: usize,
    active: ArcSwapOption<Url>,
}

impl HttpDirectoryClient {
    /// # Errors
    /// Fails when a configured host is not a valid URL or the HTTP client cannot be built.
    pub fn new(config: &DirectoryConfig) -> anyhow::Result<Self> {
        let hosts = config
            .hosts
            .iter()
            .map(|h| Url::parse(h).with_context(|| format!("invalid directory host '{h}'")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        if hosts.is_empty() {
            anyhow::bail!("at least one directory host is required");
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build directory HTTP client")?;
        Ok(Self {
            client,
            hosts,
            health_path: config.health_path.clone(),
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
            max_attempts: config.max_attempts.max(1),
            active: ArcSwapOption::empty(),
        })
    }

    /// Host currently in use, if one was resolved.
    #[must_use]
    pub fn active_host(&self) -> Option<Url> {
        self.active.load_full().map(|u| (*u).clone())
    }

    async fn base_url(&self) -> Result<Arc<Url>, DomainError> {
        if let Some(url) = self.active.load_full() {
            return Ok(url);
        }
        self.probe().await
    }

    async fn probe(&self) -> Result<Arc<Url>, DomainError> {
        for host in &self.hosts {
            let Ok(health) = host.join(&self.health_path) else {
                continue;
            };
            let reachable = self
                .client
                .get(health)
                .timeout(self.probe_timeout)
                .send()
                .await
                .is_ok_and(|r| r.status().is_success());
            if reachable {
                tracing::info!(host = %host, "directory host selected");
                let url = Arc::new(host.clone());
                self.active.store(Some(url.clone()));
                return Ok(url);
            }
            tracing::debug!(host = %host, "directory host unreachable");
        }
        Err(DomainError::dependency_unavailable(
            SERVICE,
            "no candidate host is reachable",
        ))
    }

    fn invalidate(&self, failed: &Arc<Url>) {
        let previous = self.active.compare_and_swap(failed, None::<Arc<Url>>);
        if (*previous).as_ref().is_some_and(|p| Arc::ptr_eq(p, failed)) {
            tracing::warn!(host = %failed, "directory host invalidated");
        }
    }

    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, DomainError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| DomainError::dependency_unavailable(SERVICE, "invalid base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        resource: &str,
    ) -> Result<T, DomainError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            let base = self.base_url().await?;
            let url = Self::endpoint(&base, segments)?;

            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    tracing::warn!(attempt, url = %url, error = %e, "directory call failed");
                    self.invalidate(&base);
                    last_error = e.to_string();
                    continue;
                }
                Err(e) => {
                    return Err(DomainError::dependency_unavailable(SERVICE, e.to_string()));
                }
            };

            return match response.status() {
                StatusCode::NOT_FOUND => Err(DomainError::validation(
                    resource,
                    "not found in the directory",
                )),
                status if status.is_success() => response.json::<T>().await.map_err(|e| {
                    DomainError::dependency_unavailable(SERVICE, format!("bad response: {e}"))
                }),
                status => Err(DomainError::dependency_unavailable(
                    SERVICE,
                    format!("{method} {url}: HTTP {status}"),
                )),
            };
        }
        Err(DomainError::dependency_unavailable(
            SERVICE,
            format!("gave up after {} attempts: {last_error}", self.max_attempts),
        ))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        resource: &str,
    ) -> Result<T, DomainError> {
        self.call::<(), T>(Method::GET, segments, None, resource)
            .await
    }
}

#[async_trait]
impl DirectoryPort for HttpDirectoryClient {
    #[instrument(skip_all, fields(house_id = %house_id))]
    async fn resolve_house_group_ids(&self, house_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        let id = house_id.to_string();
        let dto: HouseGroupsDto = self
            .get(&["api", "houses", id.as_str(), "groups"], "house")
            .await?;
        Ok(dto.group_ids)
    }

    #[instrument(skip_all, fields(provider_id = %provider_id))]
    async fn resolve_allowed_worker_ids(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<Uuid>, DomainError> {
        let id = provider_id.to_string();
        let dto: WorkersDto = self
            .get(&["api", "providers", id.as_str(), "workers"], "provider")
            .await?;
        Ok(dto.worker_ids)
    }

    #[instrument(skip_all, fields(provider_id = %provider_id, worker_id = %worker_id))]
    async fn resolve_allowed_house_ids(
        &self,
        provider_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Vec<Uuid>, DomainError> {
        let provider = provider_id.to_string();
        let worker = worker_id.to_string();
        let dto: HousesDto = self
            .get(
                &[
                    "api",
                    "providers",
                    provider.as_str(),
                    "workers",
                    worker.as_str(),
                    "houses",
                ],
                "worker",
            )
            .await?;
        Ok(dto.house_ids)
    }
}

#[async_trait]
impl InventoryPort for HttpDirectoryClient {
    #[instrument(skip_all, fields(request_id = %request_id, items = lines.len()))]
    async fn upsert_reservation(
        &self,
        request_id: Uuid,
        provider_id: Uuid,
        lines: &[WarehouseLine],
    ) -> Result<Vec<WarehouseLine>, DomainError> {
        let id = request_id.to_string();
        let body = ReservationRequestDto {
            provider_id,
            items: lines.iter().map(ReservationItemDto::from).collect(),
        };
        let dto: ReservationDto = self
            .call(
                Method::PUT,
                &["api", "inventory", "reservations", id.as_str()],
                Some(&body),
                "execution.warehouses",
            )
            .await?;
        Ok(dto.items.into_iter().map(WarehouseLine::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segments() {
        let base = Url::parse("http://dir.local:8300/").unwrap();
        let url = HttpDirectoryClient::endpoint(&base, &["api", "houses", "h1", "groups"]).unwrap();
        assert_eq!(url.as_str(), "http://dir.local:8300/api/houses/h1/groups");
    }

    #[test]
    fn rejects_empty_host_list() {
        let config = DirectoryConfig {
            hosts: Vec::new(),
            ..DirectoryConfig::default()
        };
        assert!(HttpDirectoryClient::new(&config).is_err());
    }
}
