//! List filter tables for the request views.
//!
//! The dispatcher view is the full table; the tenant and report views are
//! derived from it by removing or overriding entries.

use qp_filter::{FilterRule, FilterSpec, parsers};
use requests_sdk::{RequestStatus, RequestTag};
use serde_json::{Value, json};

use super::document::doc_timestamp;

pub const SORTABLE_FIELDS: &[&str] = &["number", "created_at", "status"];

/// Keys that expose staff-side details and are hidden from tenants.
const STAFF_ONLY_KEYS: &[&str] = &[
    "dispatcher__id__in",
    "dispatcher__department__id__in",
    "provider__id__in",
    "executor__id__in",
    "administrative_supervision",
    "housing_supervision",
];

fn in_fragment<T: serde::Serialize>(path: &str, values: &[T]) -> Value {
    json!({ path: { "$in": values } })
}

fn created_gte() -> FilterRule<Value> {
    FilterRule::single(parsers::datetime, |d| {
        json!({ "created_at": { "$gte": doc_timestamp(d) } })
    })
}

fn created_lte() -> FilterRule<Value> {
    FilterRule::single(parsers::datetime, |d| {
        json!({ "created_at": { "$lte": doc_timestamp(d) } })
    })
}

/// Full filter table used by dispatchers and workers.
#[must_use]
pub fn dispatcher_spec() -> FilterSpec<Value> {
    FilterSpec::new()
        .with(
            "_id__in",
            FilterRule::many(parsers::uuid, |ids| in_fragment("_id", &ids)),
        )
        .with(
            "number",
            FilterRule::single(parsers::integer, |n| json!({ "number": n })),
        )
        .with(
            "status__in",
            FilterRule::many(parsers::from_str::<RequestStatus>, |statuses| {
                let names: Vec<&str> = statuses.into_iter().map(RequestStatus::as_str).collect();
                in_fragment("status", &names)
            }),
        )
        .with(
            "tag",
            FilterRule::single(parsers::from_str::<RequestTag>, |t| {
                json!({ "tag": t.as_str() })
            }),
        )
        .with(
            "house__id__in",
            FilterRule::many(parsers::uuid, |ids| in_fragment("house._id", &ids)),
        )
        .with(
            "area__str_number__in",
            FilterRule::single(parsers::area_range, |numbers| {
                json!({ "area.str_number": { "$in": numbers } })
            }),
        )
        .with(
            "category",
            FilterRule::single(parsers::non_empty_string, |c| json!({ "category": c }))
                .excluded_by(["subcategory", "work_area"]),
        )
        .with(
            "subcategory",
            FilterRule::single(parsers::non_empty_string, |s| json!({ "subcategory": s }))
                .excluded_by(["work_area"]),
        )
        .with(
            "work_area",
            FilterRule::single(parsers::non_empty_string, |w| json!({ "work_area": w })),
        )
        .with(
            "dispatcher__id__in",
            FilterRule::many(parsers::uuid, |ids| in_fragment("dispatcher._id", &ids)),
        )
        .with(
            "dispatcher__department__id__in",
            FilterRule::many(parsers::uuid, |ids| {
                in_fragment("dispatcher.department._id", &ids)
            })
            .excluded_by(["dispatcher__id__in"]),
        )
        .with(
            "provider__id__in",
            FilterRule::many(parsers::uuid, |ids| {
                in_fragment("execution.provider._id", &ids)
            }),
        )
        .with(
            "executor__id__in",
            FilterRule::many(parsers::uuid, |ids| {
                in_fragment("execution.employees._id", &ids)
            }),
        )
        .with("created__gte", created_gte())
        .with("created__lte", created_lte())
        .with(
            "is_public",
            FilterRule::single(parsers::boolean, |b| json!({ "is_public": b })),
        )
        .with(
            "administrative_supervision",
            FilterRule::single(parsers::boolean, |b| {
                json!({ "administrative_supervision": b })
            }),
        )
        .with(
            "housing_supervision",
            FilterRule::single(parsers::boolean, |b| json!({ "housing_supervision": b })),
        )
        .sortable(SORTABLE_FIELDS.iter().copied())
}

/// Tenant view: the dispatcher table without staff-side keys.
#[must_use]
pub fn tenant_spec() -> FilterSpec<Value> {
    STAFF_ONLY_KEYS
        .iter()
        .fold(dispatcher_spec(), |spec, key| spec.without(key))
}

/// Report view: the dispatcher table with a mandatory creation date range.
#[must_use]
pub fn report_spec() -> FilterSpec<Value> {
    dispatcher_spec()
        .with("created__gte", created_gte().required())
        .with("created__lte", created_lte().required())
}
