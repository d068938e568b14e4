//! General (non-status) update of a request.

use requests_sdk::{Actor, ActorRole, FileRef, FilesPatch, Request, RequestUpdate};
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

use super::{RequestsService, check_read_access, check_write_access};
use crate::domain::categories::validate_selection;
use crate::domain::change_tracker::ChangeTracker;
use crate::domain::display;
use crate::domain::error::DomainError;
use crate::domain::ports::file_tag;
use crate::domain::rollback::{Compensation, RollbackStack};

impl RequestsService {
    /// Apply `update` section by section; values equal to the stored ones are
    /// skipped. On failure every compensation registered so far is undone.
    ///
    /// # Errors
    /// Fails on access violations, invalid values, unknown or foreign
    /// references and storage errors; nothing stays written in that case.
    #[instrument(skip(self, actor, update), fields(actor_id = %actor.id))]
    pub async fn update_request(
        &self,
        actor: &Actor,
        id: Uuid,
        update: RequestUpdate,
    ) -> Result<Request, DomainError> {
        let mut request = self.load(id).await?;
        check_write_access(actor, &request)?;
        if actor.role == ActorRole::Tenant {
            check_tenant_update(&update)?;
        }

        let mut tracker = ChangeTracker::new();
        let mut rollback = RollbackStack::new();

        match self
            .apply_general(actor, &mut request, update, &mut tracker, &mut rollback)
            .await
        {
            Ok(()) => {
                self.finish(actor, request, tracker, rollback, None)
                    .await
            }
            Err(e) => {
                rollback.unwind(&self.ports).await;
                Err(e)
            }
        }
    }

    async fn apply_general(
        &self,
        actor: &Actor,
        request: &mut Request,
        mut update: RequestUpdate,
        tracker: &mut ChangeTracker,
        rollback: &mut RollbackStack,
    ) -> Result<(), DomainError> {
        apply_fields(request, &mut update, tracker)?;

        if let Some(template_id) = update.template_id
            && request.relations.template_id != template_id
        {
            match template_id {
                Some(template_id) => {
                    self.set_template(actor, request, template_id, tracker).await?;
                }
                None => {
                    tracker.record("relations.template", Value::Null, "Template", "none");
                    request.relations.template_id = None;
                }
            }
        }

        if let Some(related_id) = update.related_request_id
            && !request.relations.related.contains(&related_id)
        {
            self.link_related(actor, request, related_id, tracker, rollback)
                .await?;
        }

        let tag = file_tag(request.id);
        if let Some(patch) = update.execution_act {
            self.apply_files_patch(
                &tag,
                &mut request.execution.act,
                patch,
                ("execution.act", "Act of work"),
                tracker,
                rollback,
            )
            .await?;
        }
        if let Some(patch) = update.execution_attachments {
            self.apply_files_patch(
                &tag,
                &mut request.execution.attachments,
                patch,
                ("execution.attachments", "Execution attachments"),
                tracker,
                rollback,
            )
            .await?;
        }
        if let Some(patch) = update.requester_attachments {
            self.apply_files_patch(
                &tag,
                &mut request.requester_attachments,
                patch,
                ("requester_attachments", "Requester attachments"),
                tracker,
                rollback,
            )
            .await?;
        }

        Ok(())
    }

    async fn set_template(
        &self,
        actor: &Actor,
        request: &mut Request,
        template_id: Uuid,
        tracker: &mut ChangeTracker,
    ) -> Result<(), DomainError> {
        if template_id == request.id {
            return Err(DomainError::validation(
                "relations.template",
                "a request cannot be its own template",
            ));
        }
        let template = self
            .load_reference(actor, request, "relations.template", template_id)
            .await?;
        tracker.record(
            "relations.template",
            json!(template_id),
            "Template",
            format!("#{}", template.number),
        );
        request.relations.template_id = Some(template_id);
        Ok(())
    }

    /// Link both ways; the backlink written into the other request is undone
    /// if the call fails later on.
    async fn link_related(
        &self,
        actor: &Actor,
        request: &mut Request,
        related_id: Uuid,
        tracker: &mut ChangeTracker,
        rollback: &mut RollbackStack,
    ) -> Result<(), DomainError> {
        if related_id == request.id {
            return Err(DomainError::validation(
                "relations.related",
                "a request cannot be related to itself",
            ));
        }
        let mut other = self
            .load_reference(actor, request, "relations.related", related_id)
            .await?;

        if !other.relations.related.contains(&request.id) {
            other.relations.related.push(request.id);
            self.ports.requests.save(&other).await?;
            rollback.push(Compensation::UnlinkRelated {
                request_id: related_id,
                linked_id: request.id,
            });
        }

        tracker.record(
            "relations.related",
            json!(related_id),
            "Related request",
            format!("#{}", other.number),
        );
        request.relations.related.push(related_id);
        Ok(())
    }

    /// Removals are validated first and deleted only after commit; uploads
    /// happen immediately and are deleted again on rollback.
    async fn apply_files_patch(
        &self,
        tag: &str,
        files: &mut Vec<FileRef>,
        patch: FilesPatch,
        (field, display_name): (&str, &str),
        tracker: &mut ChangeTracker,
        rollback: &mut RollbackStack,
    ) -> Result<(), DomainError> {
        for id in patch.remove {
            let pos = files.iter().position(|f| f.id == id).ok_or_else(|| {
                DomainError::validation(field, format!("file {id} is not attached"))
            })?;
            let removed = files.remove(pos);
            tracker.record(
                field,
                json!({ "removed": removed.id }),
                display_name,
                format!("removed {}", removed.name),
            );
            rollback.defer_delete_file(removed.id, tag.to_owned());
        }

        for new_file in patch.add {
            if new_file.name.trim().is_empty() {
                return Err(DomainError::validation(field, "file name must not be empty"));
            }
            let file = self
                .ports
                .files
                .create(&new_file.name, new_file.content, tag)
                .await?;
            rollback.push(Compensation::DeleteFile {
                id: file.id,
                tag: tag.to_owned(),
            });
            tracker.record_with_link(
                field,
                json!(file.id),
                display_name,
                file.name.clone(),
                self.file_link(&file),
            );
            files.push(file);
        }
        Ok(())
    }

    /// Load a request referenced from the payload.
    ///
    /// Absence, a request the actor cannot read and a request of another
    /// organization are all client errors on `field`.
    async fn load_reference(
        &self,
        actor: &Actor,
        request: &Request,
        field: &str,
        id: Uuid,
    ) -> Result<Request, DomainError> {
        let other = match self.load(id).await {
            Err(DomainError::RequestNotFound { id }) => {
                return Err(DomainError::validation(
                    field,
                    format!("referenced request {id} does not exist"),
                ));
            }
            other => other?,
        };
        let shares_provider = other
            .binds
            .providers
            .iter()
            .any(|p| request.binds.providers.contains(p));
        if !shares_provider || check_read_access(actor, &other).is_err() {
            return Err(DomainError::validation(
                field,
                format!("referenced request {id} belongs to another organization"),
            ));
        }
        Ok(other)
    }
}

/// Plain fields of the request document, in payload order.
fn apply_fields(
    request: &mut Request,
    update: &mut RequestUpdate,
    tracker: &mut ChangeTracker,
) -> Result<(), DomainError> {
    if let Some(description) = update.description.take()
        && description != request.description
    {
        if description.trim().is_empty() {
            return Err(DomainError::validation("description", "must not be empty"));
        }
        tracker.record(
            "description",
            json!(description),
            "Description",
            description.clone(),
        );
        request.description = description;
    }

    if let Some(window) = update.desired_time.take()
        && request.desired_time != Some(window)
    {
        if window.start >= window.end {
            return Err(DomainError::validation(
                "desired_time",
                "start must be before end",
            ));
        }
        tracker.record(
            "desired_time",
            json!({ "start": window.start, "end": window.end }),
            "Desired time",
            display::window(&window),
        );
        request.desired_time = Some(window);
    }

    if let Some(category) = update.category.take()
        && request.category.as_ref() != Some(&category)
    {
        let label = validate_selection(&category)?;
        tracker.record(
            "category",
            json!({
                "category": category.category,
                "subcategory": category.subcategory,
                "work_area": category.work_area,
                "actions": category.actions,
            }),
            "Category",
            label,
        );
        request.category = Some(category);
    }

    if let Some(tag) = update.tag.take()
        && tag != request.tag
    {
        tracker.record("tag", json!(tag.as_str()), "Tag", tag.display_name());
        request.tag = tag;
    }

    if let Some(is_public) = update.is_public.take()
        && is_public != request.is_public
    {
        tracker.record(
            "is_public",
            json!(is_public),
            "Public",
            display::yes_no(is_public),
        );
        request.is_public = is_public;
    }

    if let Some(flag) = update.administrative_supervision.take()
        && flag != request.administrative_supervision
    {
        tracker.record(
            "administrative_supervision",
            json!(flag),
            "Administrative supervision",
            display::yes_no(flag),
        );
        request.administrative_supervision = flag;
    }

    if let Some(flag) = update.housing_supervision.take()
        && flag != request.housing_supervision
    {
        tracker.record(
            "housing_supervision",
            json!(flag),
            "Housing supervision",
            display::yes_no(flag),
        );
        request.housing_supervision = flag;
    }
    Ok(())
}

/// Tenants may only edit what they wrote themselves.
fn check_tenant_update(update: &RequestUpdate) -> Result<(), DomainError> {
    let staff_fields = [
        ("category", update.category.is_some()),
        ("tag", update.tag.is_some()),
        ("is_public", update.is_public.is_some()),
        (
            "administrative_supervision",
            update.administrative_supervision.is_some(),
        ),
        ("housing_supervision", update.housing_supervision.is_some()),
        ("relations.template", update.template_id.is_some()),
        ("relations.related", update.related_request_id.is_some()),
        ("execution.act", update.execution_act.is_some()),
        (
            "execution.attachments",
            update.execution_attachments.is_some(),
        ),
    ];
    match staff_fields.iter().find(|(_, present)| *present) {
        Some((field, _)) => Err(DomainError::forbidden(format!(
            "tenants cannot change '{field}'"
        ))),
        None => Ok(()),
    }
}
