//! Public models for the `requests` module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the `requests` module and its consumers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => ($wire:literal, $label:literal)),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable machine name.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// Human-readable label used in history records.
            #[must_use]
            pub fn display_name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Lifecycle status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    /// Initial state set on creation; a request never returns to it.
    Accepted,
    Run,
    Delayed,
    Performed,
    Refused,
}

string_enum!(RequestStatus, "status", {
    Accepted => ("accepted", "Accepted"),
    Run => ("run", "In progress"),
    Delayed => ("delayed", "Delayed"),
    Performed => ("performed", "Performed"),
    Refused => ("refused", "Refused"),
});

/// Urgency class of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestTag {
    #[default]
    Current,
    Urgent,
    Emergency,
}

string_enum!(RequestTag, "tag", {
    Current => ("current", "Current"),
    Urgent => ("urgent", "Urgent"),
    Emergency => ("emergency", "Emergency"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRole {
    Dispatcher,
    Worker,
    Tenant,
    System,
}

string_enum!(ActorRole, "role", {
    Dispatcher => ("dispatcher", "Dispatcher"),
    Worker => ("worker", "Worker"),
    Tenant => ("tenant", "Tenant"),
    System => ("system", "System"),
});

/// The authenticated user on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub role: ActorRole,
    /// Organization the actor works for; `None` for tenants.
    pub provider_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseRef {
    pub id: Uuid,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRef {
    pub id: Uuid,
    /// Apartment number as printed, possibly with a qualifier letter.
    pub str_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherRef {
    pub id: Uuid,
    pub name: String,
    pub department_id: Option<Uuid>,
}

/// A path in the category tree. Deeper levels are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelection {
    pub category: String,
    pub subcategory: Option<String>,
    pub work_area: Option<String>,
    pub actions: Vec<String>,
}

/// Window in which the requester wants the work done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredTime {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub content: Vec<u8>,
}

/// Files to upload into and remove from one attachment list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilesPatch {
    pub add: Vec<NewFile>,
    pub remove: Vec<Uuid>,
}

/// Manually entered material or service line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLine {
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Item reserved from a warehouse through the inventory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseLine {
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
}

/// Who performs the work, when, and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub provider_id: Uuid,
    pub employees: Vec<Uuid>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub delayed_until: Option<DateTime<Utc>>,
    pub delay_reason: Option<String>,
    pub description: Option<String>,
    pub act: Vec<FileRef>,
    pub attachments: Vec<FileRef>,
    pub materials: Vec<ResourceLine>,
    pub services: Vec<ResourceLine>,
    pub warehouses: Vec<WarehouseLine>,
}

impl Execution {
    #[must_use]
    pub fn new(provider_id: Uuid) -> Self {
        Self {
            provider_id,
            employees: Vec::new(),
            start: None,
            end: None,
            delayed_until: None,
            delay_reason: None,
            description: None,
            act: Vec::new(),
            attachments: Vec::new(),
            materials: Vec::new(),
            services: Vec::new(),
            warehouses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Relations {
    pub template_id: Option<Uuid>,
    pub related: Vec<Uuid>,
}

/// Access tags scoping a request to organizations and house groups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binds {
    pub providers: Vec<Uuid>,
    pub house_groups: Vec<Uuid>,
}

/// A maintenance request against a house or apartment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: Uuid,
    pub number: i64,
    pub created_at: DateTime<Utc>,
    /// Id of the actor who created the request.
    pub created_by: Uuid,
    pub dispatcher: Option<DispatcherRef>,
    pub house: HouseRef,
    pub area: Option<AreaRef>,
    pub status: RequestStatus,
    pub tag: RequestTag,
    pub description: String,
    pub desired_time: Option<DesiredTime>,
    pub category: Option<CategorySelection>,
    pub is_public: bool,
    pub administrative_supervision: bool,
    pub housing_supervision: bool,
    pub relations: Relations,
    pub execution: Execution,
    pub requester_attachments: Vec<FileRef>,
    pub binds: Binds,
}

/// Partial update of the non-status sections of a request.
///
/// `None` leaves a section untouched; a value equal to the stored one is a
/// no-op and is not recorded in history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestUpdate {
    pub description: Option<String>,
    pub desired_time: Option<DesiredTime>,
    pub category: Option<CategorySelection>,
    pub tag: Option<RequestTag>,
    pub is_public: Option<bool>,
    pub administrative_supervision: Option<bool>,
    pub housing_supervision: Option<bool>,
    /// `Some(None)` clears the template.
    pub template_id: Option<Option<Uuid>>,
    /// Link another request; a backlink is written into it as well.
    pub related_request_id: Option<Uuid>,
    pub execution_act: Option<FilesPatch>,
    pub execution_attachments: Option<FilesPatch>,
    pub requester_attachments: Option<FilesPatch>,
}

/// Transition to a lifecycle status together with execution details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: RequestStatus,
    /// Executing organization; a different value reassigns the request.
    pub provider_id: Option<Uuid>,
    pub employees: Option<Vec<Uuid>>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub delayed_until: Option<DateTime<Utc>>,
    pub delay_reason: Option<String>,
    pub description: Option<String>,
    pub materials: Option<Vec<ResourceLine>>,
    pub services: Option<Vec<ResourceLine>>,
    pub warehouses: Option<Vec<WarehouseLine>>,
}

impl StatusUpdate {
    #[must_use]
    pub fn new(status: RequestStatus) -> Self {
        Self {
            status,
            provider_id: None,
            employees: None,
            start: None,
            end: None,
            delayed_until: None,
            delay_reason: None,
            description: None,
            materials: None,
            services: None,
            warehouses: None,
        }
    }
}

/// One field change inside a history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    /// Dotted path of the changed attribute, e.g. `execution.start`.
    pub field: String,
    /// New value, kept for audit export only.
    pub value: serde_json::Value,
    pub display_name: String,
    pub display_value: String,
    /// Where an associated artifact (e.g. an uploaded file) can be fetched.
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryActor {
    pub id: Uuid,
    pub name: String,
    pub role: ActorRole,
}

impl From<&Actor> for HistoryActor {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            name: actor.name.clone(),
            role: actor.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub actor: HistoryActor,
    pub changes: Vec<ChangeRecord>,
    pub at: DateTime<Utc>,
    /// `None` for ordinary updates, a fixed marker for status updates.
    pub tag: Option<String>,
}

/// Audit trail of one request, newest entry first.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLog {
    pub request_id: Uuid,
    pub entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    #[must_use]
    pub fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            entries: Vec::new(),
        }
    }
}
