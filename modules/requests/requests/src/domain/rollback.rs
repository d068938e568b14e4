//! Compensating actions for side effects applied outside the request
//! document during one update call.
//!
//! Compensations are pushed in execution order and undone in reverse by
//! [`RollbackStack::unwind`]. Deletions of detached files are deferred and
//! only run by [`RollbackStack::commit`], after the request was persisted.

use requests_sdk::WarehouseLine;
use uuid::Uuid;

use super::error::DomainError;
use super::ports::Ports;

#[derive(Debug, Clone, PartialEq)]
pub enum Compensation {
    /// Remove the backlink to `linked_id` written into request `request_id`.
    UnlinkRelated { request_id: Uuid, linked_id: Uuid },
    /// Delete a file uploaded during the call.
    DeleteFile { id: Uuid, tag: String },
    /// Put the previous warehouse reservation back.
    RestoreReservation {
        request_id: Uuid,
        provider_id: Uuid,
        lines: Vec<WarehouseLine>,
    },
}

impl Compensation {
    fn kind(&self) -> &'static str {
        match self {
            Self::UnlinkRelated { .. } => "unlink_related",
            Self::DeleteFile { .. } => "delete_file",
            Self::RestoreReservation { .. } => "restore_reservation",
        }
    }

    async fn run(self, ports: &Ports) -> Result<(), DomainError> {
        match self {
            Self::UnlinkRelated {
                request_id,
                linked_id,
            } => {
                let Some(mut other) = ports.requests.get(request_id).await? else {
                    return Ok(());
                };
                other.relations.related.retain(|id| *id != linked_id);
                ports.requests.save(&other).await.map_err(DomainError::from)
            }
            Self::DeleteFile { id, tag } => ports.files.delete(id, &tag).await,
            Self::RestoreReservation {
                request_id,
                provider_id,
                lines,
            } => ports
                .inventory
                .upsert_reservation(request_id, provider_id, &lines)
                .await
                .map(|_| ()),
        }
    }
}

#[derive(Debug, Default)]
pub struct RollbackStack {
    compensations: Vec<Compensation>,
    deferred_deletes: Vec<(Uuid, String)>,
}

impl RollbackStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, compensation: Compensation) {
        self.compensations.push(compensation);
    }

    /// Delete a file once the call has been persisted.
    pub fn defer_delete_file(&mut self, id: Uuid, tag: String) {
        self.deferred_deletes.push((id, tag));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.compensations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compensations.is_empty()
    }

    /// Run every compensation, newest first. Failures are logged and do not
    /// stop the remaining compensations; deferred deletions are dropped.
    pub async fn unwind(self, ports: &Ports) {
        for compensation in self.compensations.into_iter().rev() {
            let kind = compensation.kind();
            if let Err(e) = compensation.run(ports).await {
                tracing::warn!(compensation = kind, error = %e, "compensation failed");
            } else {
                tracing::debug!(compensation = kind, "compensation applied");
            }
        }
    }

    /// Forget the compensations and run deferred deletions.
    pub async fn commit(self, ports: &Ports) {
        for (id, tag) in self.deferred_deletes {
            if let Err(e) = ports.files.delete(id, &tag).await {
                tracing::warn!(file_id = %id, error = %e, "deferred file delete failed");
            }
        }
    }
}
