//! Status update: transition to a lifecycle status with execution details.

use chrono::{DateTime, Utc};
use requests_sdk::{
    Actor, ActorRole, Execution, Request, RequestStatus, StatusUpdate, WarehouseLine,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use super::resources::{check_unique_names, diff_resource_lines, diff_warehouse_lines};
use super::{RequestsService, check_write_access};
use crate::domain::change_tracker::ChangeTracker;
use crate::domain::display;
use crate::domain::document::doc_timestamp;
use crate::domain::error::DomainError;
use crate::domain::history::STATUS_HISTORY_TAG;
use crate::domain::rollback::{Compensation, RollbackStack};

impl RequestsService {
    /// Move a request to `update.status`.
    ///
    /// A different `provider_id` reassigns the request to that organization
    /// and ends the call: nothing else from `update` is applied.
    ///
    /// # Errors
    /// Fails on access violations, missing status requirements and
    /// dependency errors; the previous reservation is restored in that case.
    #[instrument(skip(self, actor, update), fields(actor_id = %actor.id, status = %update.status))]
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        update: StatusUpdate,
    ) -> Result<Request, DomainError> {
        if actor.role == ActorRole::Tenant {
            return Err(DomainError::forbidden("tenants cannot change status"));
        }
        let mut request = self.load(id).await?;
        check_write_access(actor, &request)?;

        if update.status == RequestStatus::Accepted && request.status != RequestStatus::Accepted {
            return Err(DomainError::validation(
                "status",
                "a request cannot return to accepted",
            ));
        }

        let mut tracker = ChangeTracker::new();
        let mut rollback = RollbackStack::new();

        let applied = match update.provider_id {
            Some(provider_id) if provider_id != request.execution.provider_id => {
                self.reassign(actor, &mut request, provider_id, &mut tracker)
                    .await
            }
            _ => {
                self.apply_status(&mut request, update, &mut tracker, &mut rollback)
                    .await
            }
        };

        match applied {
            Ok(()) => {
                self.finish(
                    actor,
                    request,
                    tracker,
                    rollback,
                    Some(STATUS_HISTORY_TAG),
                )
                .await
            }
            Err(e) => {
                rollback.unwind(&self.ports).await;
                Err(e)
            }
        }
    }

    /// Hand the request over to another organization: rebind it to the new
    /// organization and the house's groups, and drop assigned workers.
    async fn reassign(
        &self,
        actor: &Actor,
        request: &mut Request,
        provider_id: Uuid,
        tracker: &mut ChangeTracker,
    ) -> Result<(), DomainError> {
        if actor.role == ActorRole::Worker {
            return Err(DomainError::forbidden(
                "workers cannot reassign a request",
            ));
        }
        let house_groups = self
            .ports
            .directory
            .resolve_house_group_ids(request.house.id)
            .await?;

        let previous = request.execution.provider_id;
        request.binds.providers.retain(|p| *p != previous);
        if !request.binds.providers.contains(&provider_id) {
            request.binds.providers.push(provider_id);
        }
        request.binds.house_groups = house_groups;

        tracing::info!(request_id = %request.id, from = %previous, to = %provider_id, "request reassigned");
        tracker.record(
            "execution.provider",
            json!(provider_id),
            "Executing organization",
            provider_id.to_string(),
        );
        request.execution.provider_id = provider_id;

        if !request.execution.employees.is_empty() {
            request.execution.employees.clear();
            tracker.record(
                "execution.employees",
                json!([]),
                "Employees",
                display::ids(&[]),
            );
        }
        Ok(())
    }

    async fn apply_status(
        &self,
        request: &mut Request,
        update: StatusUpdate,
        tracker: &mut ChangeTracker,
        rollback: &mut RollbackStack,
    ) -> Result<(), DomainError> {
        let execution = &mut request.execution;

        if let Some(employees) = update.employees
            && employees != execution.employees
        {
            self.assign_employees(execution, employees, tracker).await?;
        }

        set_time(
            &mut execution.start,
            update.start,
            ("execution.start", "Work start"),
            tracker,
        );
        set_time(
            &mut execution.end,
            update.end,
            ("execution.end", "Work end"),
            tracker,
        );
        if let (Some(start), Some(end)) = (execution.start, execution.end)
            && end < start
        {
            return Err(DomainError::validation(
                "execution.end",
                "end must not be before start",
            ));
        }
        set_time(
            &mut execution.delayed_until,
            update.delayed_until,
            ("execution.delayed_until", "Delayed until"),
            tracker,
        );
        set_text(
            &mut execution.delay_reason,
            update.delay_reason,
            ("execution.delay_reason", "Delay reason"),
            tracker,
        );
        set_text(
            &mut execution.description,
            update.description,
            ("execution.description", "Work description"),
            tracker,
        );

        if let Some(materials) = update.materials {
            check_unique_names("execution.materials", &materials)?;
            diff_resource_lines(
                ("execution.materials", "Materials"),
                &execution.materials,
                &materials,
                tracker,
            );
            execution.materials = materials;
        }
        if let Some(services) = update.services {
            check_unique_names("execution.services", &services)?;
            diff_resource_lines(
                ("execution.services", "Services"),
                &execution.services,
                &services,
                tracker,
            );
            execution.services = services;
        }

        if let Some(lines) = update.warehouses
            && lines != execution.warehouses
        {
            self.reserve_warehouses(request.id, execution, &lines, tracker, rollback)
                .await?;
        }

        check_status_requirements(update.status, execution)?;

        if update.status != request.status {
            tracker.record(
                "status",
                json!(update.status.as_str()),
                "Status",
                update.status.display_name(),
            );
            request.status = update.status;
        }
        Ok(())
    }

    async fn assign_employees(
        &self,
        execution: &mut Execution,
        employees: Vec<Uuid>,
        tracker: &mut ChangeTracker,
    ) -> Result<(), DomainError> {
        let allowed = self
            .ports
            .directory
            .resolve_allowed_worker_ids(execution.provider_id)
            .await?;
        if let Some(stranger) = employees.iter().find(|e| !allowed.contains(e)) {
            return Err(DomainError::validation(
                "execution.employees",
                format!("worker {stranger} does not belong to the executing organization"),
            ));
        }
        tracker.record(
            "execution.employees",
            json!(employees),
            "Employees",
            display::ids(&employees),
        );
        execution.employees = employees;
        Ok(())
    }

    /// The previous reservation is restored if the call fails later on.
    async fn reserve_warehouses(
        &self,
        request_id: Uuid,
        execution: &mut Execution,
        lines: &[WarehouseLine],
        tracker: &mut ChangeTracker,
        rollback: &mut RollbackStack,
    ) -> Result<(), DomainError> {
        let reconciled = self
            .ports
            .inventory
            .upsert_reservation(request_id, execution.provider_id, lines)
            .await?;
        rollback.push(Compensation::RestoreReservation {
            request_id,
            provider_id: execution.provider_id,
            lines: execution.warehouses.clone(),
        });
        diff_warehouse_lines(&execution.warehouses, &reconciled, tracker);
        execution.warehouses = reconciled;
        Ok(())
    }
}

fn set_time(
    slot: &mut Option<DateTime<Utc>>,
    value: Option<DateTime<Utc>>,
    (field, display_name): (&str, &str),
    tracker: &mut ChangeTracker,
) {
    if let Some(value) = value
        && *slot != Some(value)
    {
        tracker.record(
            field,
            json!(doc_timestamp(value)),
            display_name,
            display::datetime(value),
        );
        *slot = Some(value);
    }
}

fn set_text(
    slot: &mut Option<String>,
    value: Option<String>,
    (field, display_name): (&str, &str),
    tracker: &mut ChangeTracker,
) {
    if let Some(value) = value
        && slot.as_ref() != Some(&value)
    {
        tracker.record(field, json!(value), display_name, value.clone());
        *slot = Some(value);
    }
}

fn has_text(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Fields the target status needs, checked on the already-updated execution.
fn check_status_requirements(
    status: RequestStatus,
    execution: &Execution,
) -> Result<(), DomainError> {
    let mut missing = Vec::new();
    let needs_schedule = matches!(status, RequestStatus::Run | RequestStatus::Performed);
    if needs_schedule {
        if execution.start.is_none() {
            missing.push("execution.start");
        }
        if execution.end.is_none() {
            missing.push("execution.end");
        }
        if execution.employees.is_empty() {
            missing.push("execution.employees");
        }
    }
    match status {
        RequestStatus::Delayed => {
            if execution.delayed_until.is_none() {
                missing.push("execution.delayed_until");
            }
            if !has_text(execution.delay_reason.as_ref()) {
                missing.push("execution.delay_reason");
            }
        }
        RequestStatus::Performed | RequestStatus::Refused => {
            if !has_text(execution.description.as_ref()) {
                missing.push("execution.description");
            }
        }
        RequestStatus::Accepted | RequestStatus::Run => {}
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::validation(
            "status",
            format!(
                "status '{}' requires: {}",
                status.as_str(),
                missing.join(", ")
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn execution() -> Execution {
        Execution::new(Uuid::now_v7())
    }

    #[test]
    fn run_needs_schedule_and_worker() {
        let mut exec = execution();
        let err = check_status_requirements(RequestStatus::Run, &exec).unwrap_err();
        assert!(err.to_string().contains("execution.start, execution.end, execution.employees"));

        exec.start = Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        exec.end = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        exec.employees.push(Uuid::now_v7());
        assert!(check_status_requirements(RequestStatus::Run, &exec).is_ok());
        assert!(check_status_requirements(RequestStatus::Performed, &exec).is_err());

        exec.description = Some("replaced the riser valve".to_owned());
        assert!(check_status_requirements(RequestStatus::Performed, &exec).is_ok());
    }

    #[test]
    fn delayed_needs_date_and_reason() {
        let mut exec = execution();
        exec.delay_reason = Some("  ".to_owned());
        let err = check_status_requirements(RequestStatus::Delayed, &exec).unwrap_err();
        assert!(err.to_string().contains("execution.delayed_until, execution.delay_reason"));
    }

    #[test]
    fn refused_needs_description() {
        assert!(check_status_requirements(RequestStatus::Refused, &execution()).is_err());
    }
}
