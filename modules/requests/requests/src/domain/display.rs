//! Human-readable renderings used in history records.

use chrono::{DateTime, Utc};
use requests_sdk::{DesiredTime, ResourceLine, WarehouseLine};
use uuid::Uuid;

#[must_use]
pub fn datetime(value: DateTime<Utc>) -> String {
    value.format("%d.%m.%Y %H:%M").to_string()
}

#[must_use]
pub fn optional_datetime(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "not set".to_owned(), datetime)
}

#[must_use]
pub fn window(value: &DesiredTime) -> String {
    format!("{} - {}", datetime(value.start), datetime(value.end))
}

#[must_use]
pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[must_use]
pub fn ids(values: &[Uuid]) -> String {
    if values.is_empty() {
        return "none".to_owned();
    }
    values
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[must_use]
pub fn resource_line(line: &ResourceLine) -> String {
    format!(
        "{} {} {} x {}",
        line.name, line.quantity, line.unit, line.price
    )
}

#[must_use]
pub fn warehouse_line(line: &WarehouseLine) -> String {
    format!("{} x {}", line.name, line.quantity)
}
