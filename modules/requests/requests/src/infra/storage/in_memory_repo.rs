//! In-memory repositories for requests and their history.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use qp_filter::TranslatedQuery;
use requests_sdk::{HistoryLog, Request};
use serde_json::Value;
use uuid::Uuid;

use super::matcher::{compare_at, matches_all};
use crate::domain::document::to_document;
use crate::domain::repo::{HistoryRepository, RequestsRepository};

/// Sort applied when the query names none: newest number first.
const DEFAULT_SORT: &str = "-number";

/// Requests keyed by id; listing evaluates filter fragments against the
/// stored document shape.
#[derive(Default)]
pub struct InMemoryRequestsRepository {
    requests: RwLock<HashMap<Uuid, Request>>,
}

impl InMemoryRequestsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_requests(requests: impl IntoIterator<Item = Request>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.requests.write();
            for request in requests {
                map.insert(request.id, request);
            }
        }
        repo
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.read().is_empty()
    }
}

fn compare_docs(a: &Value, b: &Value, sort: &[String]) -> Ordering {
    let keys: Vec<&str> = if sort.is_empty() {
        vec![DEFAULT_SORT]
    } else {
        sort.iter().map(String::as_str).collect()
    };
    for key in keys {
        let (path, descending) = match key.strip_prefix('-') {
            Some(path) => (path, true),
            None => (key, false),
        };
        let ord = compare_at(a, b, path);
        let ord = if descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl RequestsRepository for InMemoryRequestsRepository {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Request>> {
        Ok(self.requests.read().get(&id).cloned())
    }

    async fn list(&self, query: &TranslatedQuery<Value>) -> anyhow::Result<Vec<Request>> {
        let mut hits = Vec::new();
        {
            let map = self.requests.read();
            for request in map.values() {
                let doc = to_document(request);
                if matches_all(&doc, &query.fragments)? {
                    hits.push((doc, request.clone()));
                }
            }
        }

        hits.sort_by(|(a, _), (b, _)| compare_docs(a, b, &query.sort));

        let offset = usize::try_from(query.offset.unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(hits
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, request)| request)
            .collect())
    }

    async fn save(&self, request: &Request) -> anyhow::Result<()> {
        self.requests.write().insert(request.id, request.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryHistoryRepository {
    logs: RwLock<HashMap<Uuid, HistoryLog>>,
}

impl InMemoryHistoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn get(&self, request_id: Uuid) -> anyhow::Result<Option<HistoryLog>> {
        Ok(self.logs.read().get(&request_id).cloned())
    }

    async fn save(&self, log: &HistoryLog) -> anyhow::Result<()> {
        self.logs.write().insert(log.request_id, log.clone());
        Ok(())
    }
}
