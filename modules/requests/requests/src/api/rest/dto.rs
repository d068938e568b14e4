//! REST payloads.
//!
//! Requests are returned in their stored document shape; payloads are
//! converted into SDK types before they reach the service.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use requests_sdk::{
    CategorySelection, ChangeRecord, DesiredTime, FilesPatch, HistoryEntry, HistoryLog, NewFile,
    RequestStatus, RequestTag, RequestUpdate, RequestsError, ResourceLine, StatusUpdate,
    WarehouseLine,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesiredTimeDto {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDto {
    pub category: String,
    pub subcategory: Option<String>,
    pub work_area: Option<String>,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewFileDto {
    pub name: String,
    /// Standard base64.
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesPatchDto {
    #[serde(default)]
    pub add: Vec<NewFileDto>,
    #[serde(default)]
    pub remove: Vec<Uuid>,
}

impl TryFrom<FilesPatchDto> for FilesPatch {
    type Error = RequestsError;

    fn try_from(dto: FilesPatchDto) -> Result<Self, Self::Error> {
        let add = dto
            .add
            .into_iter()
            .map(|f| {
                STANDARD
                    .decode(f.content.as_bytes())
                    .map(|content| NewFile {
                        name: f.name.clone(),
                        content,
                    })
                    .map_err(|e| RequestsError::validation(format!("file '{}': {e}", f.name)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            add,
            remove: dto.remove,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequestReq {
    pub description: Option<String>,
    pub desired_time: Option<DesiredTimeDto>,
    pub category: Option<CategoryDto>,
    pub tag: Option<String>,
    pub is_public: Option<bool>,
    pub administrative_supervision: Option<bool>,
    pub housing_supervision: Option<bool>,
    /// Absent leaves the template as is; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub template_id: Option<Option<Uuid>>,
    pub related_request_id: Option<Uuid>,
    pub execution_act: Option<FilesPatchDto>,
    pub execution_attachments: Option<FilesPatchDto>,
    pub requester_attachments: Option<FilesPatchDto>,
}

/// Marks a field that was sent, even as `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn files(patch: Option<FilesPatchDto>) -> Result<Option<FilesPatch>, RequestsError> {
    patch.map(FilesPatch::try_from).transpose()
}

impl TryFrom<UpdateRequestReq> for RequestUpdate {
    type Error = RequestsError;

    fn try_from(req: UpdateRequestReq) -> Result<Self, Self::Error> {
        let tag = req
            .tag
            .as_deref()
            .map(str::parse::<RequestTag>)
            .transpose()
            .map_err(|e| RequestsError::validation(e.to_string()))?;
        Ok(Self {
            description: req.description,
            desired_time: req.desired_time.map(|t| DesiredTime {
                start: t.start,
                end: t.end,
            }),
            category: req.category.map(|c| CategorySelection {
                category: c.category,
                subcategory: c.subcategory,
                work_area: c.work_area,
                actions: c.actions,
            }),
            tag,
            is_public: req.is_public,
            administrative_supervision: req.administrative_supervision,
            housing_supervision: req.housing_supervision,
            template_id: req.template_id,
            related_request_id: req.related_request_id,
            execution_act: files(req.execution_act)?,
            execution_attachments: files(req.execution_attachments)?,
            requester_attachments: files(req.requester_attachments)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceLineDto {
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarehouseLineDto {
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdateReq {
    pub status: String,
    pub provider_id: Option<Uuid>,
    pub employees: Option<Vec<Uuid>>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub delayed_until: Option<DateTime<Utc>>,
    pub delay_reason: Option<String>,
    pub description: Option<String>,
    pub materials: Option<Vec<ResourceLineDto>>,
    pub services: Option<Vec<ResourceLineDto>>,
    pub warehouses: Option<Vec<WarehouseLineDto>>,
}

fn resource_lines(lines: Option<Vec<ResourceLineDto>>) -> Option<Vec<ResourceLine>> {
    lines.map(|lines| {
        lines
            .into_iter()
            .map(|l| ResourceLine {
                name: l.name,
                unit: l.unit,
                quantity: l.quantity,
                price: l.price,
            })
            .collect()
    })
}

impl TryFrom<StatusUpdateReq> for StatusUpdate {
    type Error = RequestsError;

    fn try_from(req: StatusUpdateReq) -> Result<Self, Self::Error> {
        let status = req
            .status
            .parse::<RequestStatus>()
            .map_err(|e| RequestsError::validation(e.to_string()))?;
        Ok(Self {
            status,
            provider_id: req.provider_id,
            employees: req.employees,
            start: req.start,
            end: req.end,
            delayed_until: req.delayed_until,
            delay_reason: req.delay_reason,
            description: req.description,
            materials: resource_lines(req.materials),
            services: resource_lines(req.services),
            warehouses: req.warehouses.map(|lines| {
                lines
                    .into_iter()
                    .map(|l| WarehouseLine {
                        warehouse_id: l.warehouse_id,
                        item_id: l.item_id,
                        name: l.name,
                        quantity: l.quantity,
                    })
                    .collect()
            }),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecordDto {
    pub field: String,
    pub value: serde_json::Value,
    pub display_name: String,
    pub display_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl From<ChangeRecord> for ChangeRecordDto {
    fn from(r: ChangeRecord) -> Self {
        Self {
            field: r.field,
            value: r.value,
            display_name: r.display_name,
            display_value: r.display_value,
            link: r.link,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryActorDto {
    pub id: Uuid,
    pub name: String,
    pub role: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntryDto {
    pub actor: HistoryActorDto,
    pub changes: Vec<ChangeRecordDto>,
    pub at: DateTime<Utc>,
    pub tag: Option<String>,
}

impl From<HistoryEntry> for HistoryEntryDto {
    fn from(e: HistoryEntry) -> Self {
        Self {
            actor: HistoryActorDto {
                id: e.actor.id,
                name: e.actor.name,
                role: e.actor.role.as_str(),
            },
            changes: e.changes.into_iter().map(Into::into).collect(),
            at: e.at,
            tag: e.tag,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryLogDto {
    pub request_id: Uuid,
    pub entries: Vec<HistoryEntryDto>,
}

impl From<HistoryLog> for HistoryLogDto {
    fn from(log: HistoryLog) -> Self {
        Self {
            request_id: log.request_id,
            entries: log.entries.into_iter().map(Into::into).collect(),
        }
    }
}
