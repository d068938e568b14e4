//! Accumulator of field changes made during one update call.

use requests_sdk::ChangeRecord;
use serde_json::Value;

/// Append-only list of [`ChangeRecord`]s.
///
/// No deduplication: the same field may appear several times, e.g. one
/// record per uploaded file.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    records: Vec<ChangeRecord>,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        field: &str,
        value: Value,
        display_name: &str,
        display_value: impl Into<String>,
    ) {
        self.push(field, value, display_name, display_value.into(), None);
    }

    pub fn record_with_link(
        &mut self,
        field: &str,
        value: Value,
        display_name: &str,
        display_value: impl Into<String>,
        link: String,
    ) {
        self.push(field, value, display_name, display_value.into(), Some(link));
    }

    fn push(
        &mut self,
        field: &str,
        value: Value,
        display_name: &str,
        display_value: String,
        link: Option<String>,
    ) {
        tracing::debug!(field, display_value = %display_value, "change recorded");
        self.records.push(ChangeRecord {
            field: field.to_owned(),
            value,
            display_name: display_name.to_owned(),
            display_value,
            link,
        });
    }

    #[must_use]
    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<ChangeRecord> {
        self.records
    }
}
