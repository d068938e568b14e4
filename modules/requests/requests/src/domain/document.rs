//! Document shape of a stored request.
//!
//! Filter fragments address these paths (`house._id`, `execution.employees._id`,
//! `_binds.pr`, ...), so list filters and storage share one definition.

use chrono::{DateTime, SecondsFormat, Utc};
use requests_sdk::{Execution, FileRef, Request, ResourceLine, WarehouseLine};
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Canonical timestamp rendering: fixed width, so string order is time order.
#[must_use]
pub fn doc_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn opt_timestamp(value: Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, |v| Value::String(doc_timestamp(v)))
}

fn id_ref(id: Uuid) -> Value {
    json!({ "_id": id })
}

#[must_use]
pub fn file_refs(files: &[FileRef]) -> Value {
    Value::Array(
        files
            .iter()
            .map(|f| json!({ "_id": f.id, "name": f.name }))
            .collect(),
    )
}

#[must_use]
pub fn resource_lines(lines: &[ResourceLine]) -> Value {
    Value::Array(
        lines
            .iter()
            .map(|l| {
                json!({
                    "name": l.name,
                    "unit": l.unit,
                    "quantity": l.quantity,
                    "price": l.price,
                })
            })
            .collect(),
    )
}

#[must_use]
pub fn warehouse_lines(lines: &[WarehouseLine]) -> Value {
    Value::Array(
        lines
            .iter()
            .map(|l| {
                json!({
                    "warehouse": id_ref(l.warehouse_id),
                    "item": id_ref(l.item_id),
                    "name": l.name,
                    "quantity": l.quantity,
                })
            })
            .collect(),
    )
}

fn execution_document(execution: &Execution) -> Value {
    json!({
        "provider": id_ref(execution.provider_id),
        "employees": execution.employees.iter().copied().map(id_ref).collect::<Vec<_>>(),
        "start": opt_timestamp(execution.start),
        "end": opt_timestamp(execution.end),
        "delayed_until": opt_timestamp(execution.delayed_until),
        "delay_reason": execution.delay_reason,
        "description": execution.description,
        "act": file_refs(&execution.act),
        "attachments": file_refs(&execution.attachments),
        "materials": resource_lines(&execution.materials),
        "services": resource_lines(&execution.services),
        "warehouses": warehouse_lines(&execution.warehouses),
    })
}

/// Render `request` as a filterable document.
#[must_use]
pub fn to_document(request: &Request) -> Value {
    let mut doc = Map::new();
    doc.insert("_id".into(), json!(request.id));
    doc.insert("number".into(), json!(request.number));
    doc.insert(
        "created_at".into(),
        Value::String(doc_timestamp(request.created_at)),
    );
    doc.insert("created_by".into(), json!(request.created_by));
    doc.insert("status".into(), json!(request.status.as_str()));
    doc.insert("tag".into(), json!(request.tag.as_str()));
    doc.insert("description".into(), json!(request.description));
    doc.insert("is_public".into(), json!(request.is_public));
    doc.insert(
        "administrative_supervision".into(),
        json!(request.administrative_supervision),
    );
    doc.insert(
        "housing_supervision".into(),
        json!(request.housing_supervision),
    );

    doc.insert(
        "dispatcher".into(),
        request.dispatcher.as_ref().map_or(Value::Null, |d| {
            json!({
                "_id": d.id,
                "name": d.name,
                "department": d.department_id.map_or(Value::Null, id_ref),
            })
        }),
    );
    doc.insert(
        "house".into(),
        json!({ "_id": request.house.id, "address": request.house.address }),
    );
    doc.insert(
        "area".into(),
        request.area.as_ref().map_or(Value::Null, |a| {
            json!({ "_id": a.id, "str_number": a.str_number })
        }),
    );
    doc.insert(
        "desired_time".into(),
        request.desired_time.as_ref().map_or(Value::Null, |t| {
            json!({ "start": doc_timestamp(t.start), "end": doc_timestamp(t.end) })
        }),
    );

    let category = request.category.as_ref();
    doc.insert(
        "category".into(),
        category.map_or(Value::Null, |c| json!(c.category)),
    );
    doc.insert(
        "subcategory".into(),
        category
            .and_then(|c| c.subcategory.as_ref())
            .map_or(Value::Null, |s| json!(s)),
    );
    doc.insert(
        "work_area".into(),
        category
            .and_then(|c| c.work_area.as_ref())
            .map_or(Value::Null, |w| json!(w)),
    );
    doc.insert(
        "actions".into(),
        category.map_or_else(|| json!([]), |c| json!(c.actions)),
    );

    doc.insert(
        "relations".into(),
        json!({
            "template": request.relations.template_id.map_or(Value::Null, id_ref),
            "related": request.relations.related.iter().copied().map(id_ref).collect::<Vec<_>>(),
        }),
    );

    doc.insert("execution".into(), execution_document(&request.execution));
    doc.insert(
        "requester_attachments".into(),
        file_refs(&request.requester_attachments),
    );
    doc.insert(
        "_binds".into(),
        json!({ "pr": request.binds.providers, "hg": request.binds.house_groups }),
    );

    Value::Object(doc)
}
