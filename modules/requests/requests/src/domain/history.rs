//! History folding: suppression of early creator edits and coalescing of
//! rapid successive edits by one actor.

use chrono::{DateTime, Duration, Utc};
use requests_sdk::{ChangeRecord, HistoryActor, HistoryEntry, HistoryLog, Request};

/// Marker tag of entries written by status updates.
pub const STATUS_HISTORY_TAG: &str = "status";

pub const DEFAULT_WINDOW_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindows {
    /// Entries by the same actor and tag closer than this are merged.
    pub merge: Duration,
    /// Untagged creator edits younger than this are not recorded.
    pub creation_grace: Duration,
}

impl Default for HistoryWindows {
    fn default() -> Self {
        Self {
            merge: Duration::seconds(DEFAULT_WINDOW_SECS),
            creation_grace: Duration::seconds(DEFAULT_WINDOW_SECS),
        }
    }
}

/// Fold a new entry into `log`.
///
/// Returns the log to persist, or `None` when nothing must be written:
/// either `records` is empty or the edit falls into the creation grace window.
#[must_use]
pub fn fold_entry(
    log: Option<HistoryLog>,
    request: &Request,
    actor: HistoryActor,
    mut records: Vec<ChangeRecord>,
    tag: Option<&str>,
    windows: &HistoryWindows,
    now: DateTime<Utc>,
) -> Option<HistoryLog> {
    if records.is_empty() {
        return None;
    }

    let first_write = log.as_ref().is_none_or(|l| l.entries.is_empty());
    if first_write
        && tag.is_none()
        && now - request.created_at < windows.creation_grace
        && actor.id == request.created_by
    {
        tracing::debug!(request_id = %request.id, "creator edit inside grace window, history skipped");
        return None;
    }

    records.sort_by(|a, b| a.field.cmp(&b.field));

    let mut log = log.unwrap_or_else(|| HistoryLog::new(request.id));
    let tag = tag.map(str::to_owned);

    let latest = log
        .entries
        .iter()
        .enumerate()
        .max_by_key(|(_, e)| e.at)
        .map(|(idx, _)| idx);
    if let Some(idx) = latest {
        let previous = &log.entries[idx];
        if previous.actor.id == actor.id && previous.tag == tag && now - previous.at < windows.merge
        {
            let previous = log.entries.remove(idx);
            records.extend(previous.changes);
        }
    }

    log.entries.push(HistoryEntry {
        actor,
        changes: records,
        at: now,
        tag,
    });
    log.entries.sort_by(|a, b| b.at.cmp(&a.at));
    Some(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use requests_sdk::{
        ActorRole, Binds, Execution, HouseRef, Relations, RequestStatus, RequestTag,
    };
    use serde_json::json;
    use uuid::Uuid;

    fn request(created_by: Uuid, created_at: DateTime<Utc>) -> Request {
        Request {
            id: Uuid::now_v7(),
            number: 1,
            created_at,
            created_by,
            dispatcher: None,
            house: HouseRef {
                id: Uuid::now_v7(),
                address: "1 Main St".to_owned(),
            },
            area: None,
            status: RequestStatus::Accepted,
            tag: RequestTag::Current,
            description: String::new(),
            desired_time: None,
            category: None,
            is_public: false,
            administrative_supervision: false,
            housing_supervision: false,
            relations: Relations::default(),
            execution: Execution::new(Uuid::now_v7()),
            requester_attachments: Vec::new(),
            binds: Binds::default(),
        }
    }

    fn actor(id: Uuid) -> HistoryActor {
        HistoryActor {
            id,
            name: "Dispatcher".to_owned(),
            role: ActorRole::Dispatcher,
        }
    }

    fn record(field: &str) -> ChangeRecord {
        ChangeRecord {
            field: field.to_owned(),
            value: json!(field),
            display_name: field.to_owned(),
            display_value: field.to_owned(),
            link: None,
        }
    }

    fn fields(entry: &HistoryEntry) -> Vec<&str> {
        entry.changes.iter().map(|c| c.field.as_str()).collect()
    }

    #[test]
    fn empty_records_write_nothing() {
        let now = Utc::now();
        let req = request(Uuid::now_v7(), now - Duration::hours(1));
        let folded = fold_entry(
            None,
            &req,
            actor(Uuid::now_v7()),
            Vec::new(),
            None,
            &HistoryWindows::default(),
            now,
        );
        assert!(folded.is_none());
    }

    #[test]
    fn creator_edit_inside_grace_is_suppressed() {
        let now = Utc::now();
        let creator = Uuid::now_v7();
        let req = request(creator, now - Duration::minutes(2));
        let windows = HistoryWindows::default();

        let by_creator = fold_entry(None, &req, actor(creator), vec![record("description")], None, &windows, now);
        assert!(by_creator.is_none());

        let by_other = fold_entry(
            None,
            &req,
            actor(Uuid::now_v7()),
            vec![record("description")],
            None,
            &windows,
            now,
        );
        assert_eq!(by_other.unwrap().entries.len(), 1);
    }

    #[test]
    fn tagged_creator_edit_inside_grace_is_recorded() {
        let now = Utc::now();
        let creator = Uuid::now_v7();
        let req = request(creator, now - Duration::minutes(1));
        let folded = fold_entry(
            None,
            &req,
            actor(creator),
            vec![record("status")],
            Some(STATUS_HISTORY_TAG),
            &HistoryWindows::default(),
            now,
        )
        .unwrap();
        assert_eq!(folded.entries[0].tag.as_deref(), Some(STATUS_HISTORY_TAG));
    }

    #[test]
    fn records_are_sorted_by_field() {
        let now = Utc::now();
        let req = request(Uuid::now_v7(), now - Duration::hours(1));
        let folded = fold_entry(
            None,
            &req,
            actor(Uuid::now_v7()),
            vec![record("tag"), record("description"), record("is_public")],
            None,
            &HistoryWindows::default(),
            now,
        )
        .unwrap();
        assert_eq!(fields(&folded.entries[0]), vec!["description", "is_public", "tag"]);
    }

    #[test]
    fn same_actor_and_tag_within_window_merges_new_then_old() {
        let start = Utc::now();
        let req = request(Uuid::now_v7(), start - Duration::hours(1));
        let editor = Uuid::now_v7();
        let windows = HistoryWindows::default();

        let log = fold_entry(None, &req, actor(editor), vec![record("tag")], None, &windows, start);
        let later = start + Duration::minutes(3);
        let log = fold_entry(log, &req, actor(editor), vec![record("description")], None, &windows, later)
            .unwrap();

        assert_eq!(log.entries.len(), 1);
        assert_eq!(fields(&log.entries[0]), vec!["description", "tag"]);
        assert_eq!(log.entries[0].at, later);
    }

    #[test]
    fn different_tag_or_stale_entry_appends() {
        let start = Utc::now();
        let req = request(Uuid::now_v7(), start - Duration::hours(1));
        let editor = Uuid::now_v7();
        let windows = HistoryWindows::default();

        let log = fold_entry(None, &req, actor(editor), vec![record("tag")], None, &windows, start);
        let log = fold_entry(
            log,
            &req,
            actor(editor),
            vec![record("status")],
            Some(STATUS_HISTORY_TAG),
            &windows,
            start + Duration::minutes(1),
        );
        let log = fold_entry(
            log,
            &req,
            actor(editor),
            vec![record("description")],
            None,
            &windows,
            start + Duration::minutes(10),
        )
        .unwrap();

        assert_eq!(log.entries.len(), 3);
        assert!(log.entries.windows(2).all(|w| w[0].at >= w[1].at));
        assert_eq!(fields(&log.entries[0]), vec!["description"]);
    }
}
