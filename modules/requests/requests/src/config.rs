//! Configuration for the requests module.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct RequestsConfig {
    /// Page size when the client sends no `limit`.
    pub default_page_size: u64,
    /// Upper bound of `limit` for staff views and reports.
    pub max_page_size: u64,
    /// Upper bound of `limit` for the tenant view.
    pub tenant_max_page_size: u64,
    /// Successive edits by one actor within this window share a history entry.
    pub history_merge_window_secs: i64,
    /// Creator edits within this window after creation are not recorded.
    pub creation_grace_secs: i64,
    /// Prefix of the download link stored with uploaded-file history records.
    pub file_link_prefix: String,
    pub directory: DirectoryConfig,
}

impl Default for RequestsConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 1000,
            tenant_max_page_size: 20,
            history_merge_window_secs: 300,
            creation_grace_secs: 300,
            file_link_prefix: "/api/files".to_owned(),
            directory: DirectoryConfig::default(),
        }
    }
}

/// Sibling directory/inventory service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct DirectoryConfig {
    /// Candidate base URLs, probed in order.
    pub hosts: Vec<String>,
    pub health_path: String,
    pub probe_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_attempts: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["http://127.0.0.1:8300".to_owned()],
            health_path: "/health".to_owned(),
            probe_timeout_ms: 3000,
            request_timeout_ms: 10_000,
            max_attempts: 2,
        }
    }
}
