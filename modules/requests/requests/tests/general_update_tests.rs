#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::{Duration, Utc};
use common::{FakeDirectory, TestEnv, dispatcher, sample_request, tenant};
use requests::domain::error::DomainError;
use requests::domain::repo::{HistoryRepository, RequestsRepository};
use requests_sdk::{
    CategorySelection, DesiredTime, FilesPatch, NewFile, RequestTag, RequestUpdate, RequestsError,
};
use uuid::Uuid;

#[tokio::test]
async fn identical_payload_records_nothing() {
    let provider = Uuid::now_v7();
    let request = sample_request(1, provider, Uuid::now_v7());
    let id = request.id;
    let env = TestEnv::new(FakeDirectory::default(), vec![request.clone()]);

    let update = RequestUpdate {
        description: Some(request.description.clone()),
        tag: Some(request.tag),
        is_public: Some(request.is_public),
        ..Default::default()
    };
    let updated = env
        .service
        .update_request(&dispatcher(provider), id, update)
        .await
        .unwrap();

    assert_eq!(updated, request);
    assert!(env.history.get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn creator_edit_right_after_creation_is_not_history() {
    let provider = Uuid::now_v7();
    let creator = dispatcher(provider);
    let mut request = sample_request(2, provider, creator.id);
    request.created_at = Utc::now() - Duration::minutes(1);
    let id = request.id;
    let env = TestEnv::new(FakeDirectory::default(), vec![request]);

    let update = RequestUpdate {
        description: Some("Water on the stairs, 3rd floor".to_owned()),
        ..Default::default()
    };
    let updated = env
        .service
        .update_request(&creator, id, update.clone())
        .await
        .unwrap();
    assert_eq!(updated.description, "Water on the stairs, 3rd floor");
    assert!(env.history.get(id).await.unwrap().is_none());

    let other = dispatcher(provider);
    let update = RequestUpdate {
        description: Some("Water on the stairs, 4th floor".to_owned()),
        ..Default::default()
    };
    env.service.update_request(&other, id, update).await.unwrap();
    let log = env.history.get(id).await.unwrap().unwrap();
    assert_eq!(log.entries.len(), 1);
    assert_eq!(log.entries[0].actor.id, other.id);
    assert_eq!(log.entries[0].tag, None);
}

#[tokio::test]
async fn rapid_edits_by_one_actor_share_an_entry() {
    let provider = Uuid::now_v7();
    let request = sample_request(3, provider, Uuid::now_v7());
    let id = request.id;
    let env = TestEnv::new(FakeDirectory::default(), vec![request]);
    let actor = dispatcher(provider);

    env.service
        .update_request(
            &actor,
            id,
            RequestUpdate {
                tag: Some(RequestTag::Urgent),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    env.service
        .update_request(
            &actor,
            id,
            RequestUpdate {
                description: Some("Burst pipe".to_owned()),
                is_public: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let log = env.history.get(id).await.unwrap().unwrap();
    assert_eq!(log.entries.len(), 1);
    let fields: Vec<_> = log.entries[0]
        .changes
        .iter()
        .map(|c| c.field.as_str())
        .collect();
    assert_eq!(fields, vec!["description", "is_public", "tag"]);
    assert_eq!(log.entries[0].changes[2].display_value, "Urgent");
}

#[tokio::test]
async fn category_outside_tree_is_rejected_without_persisting() {
    let provider = Uuid::now_v7();
    let request = sample_request(4, provider, Uuid::now_v7());
    let id = request.id;
    let env = TestEnv::new(FakeDirectory::default(), vec![request.clone()]);

    let update = RequestUpdate {
        description: Some("changed".to_owned()),
        category: Some(CategorySelection {
            category: "plumbing".to_owned(),
            subcategory: Some("outage".to_owned()),
            work_area: None,
            actions: Vec::new(),
        }),
        ..Default::default()
    };
    let err = env
        .service
        .update_request(&dispatcher(provider), id, update)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation { .. }));
    assert_eq!(
        RequestsRepository::get(env.requests.as_ref(), id)
            .await
            .unwrap()
            .unwrap(),
        request
    );
}

#[tokio::test]
async fn inverted_desired_time_is_rejected() {
    let provider = Uuid::now_v7();
    let request = sample_request(5, provider, Uuid::now_v7());
    let id = request.id;
    let env = TestEnv::new(FakeDirectory::default(), vec![request]);
    let now = Utc::now();

    let update = RequestUpdate {
        desired_time: Some(DesiredTime {
            start: now + Duration::hours(2),
            end: now,
        }),
        ..Default::default()
    };
    let err = env
        .service
        .update_request(&dispatcher(provider), id, update)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "desired_time"));
}

#[tokio::test]
async fn related_link_writes_backlink() {
    let provider = Uuid::now_v7();
    let request = sample_request(6, provider, Uuid::now_v7());
    let other = sample_request(7, provider, Uuid::now_v7());
    let (id, other_id) = (request.id, other.id);
    let env = TestEnv::new(FakeDirectory::default(), vec![request, other]);

    let updated = env
        .service
        .update_request(
            &dispatcher(provider),
            id,
            RequestUpdate {
                related_request_id: Some(other_id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.relations.related, vec![other_id]);
    let other = RequestsRepository::get(env.requests.as_ref(), other_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(other.relations.related, vec![id]);
    let log = env.history.get(id).await.unwrap().unwrap();
    assert_eq!(log.entries[0].changes[0].display_value, "#7");
}

#[tokio::test]
async fn later_failure_unlinks_backlink_and_deletes_uploads() {
    let provider = Uuid::now_v7();
    let request = sample_request(8, provider, Uuid::now_v7());
    let other = sample_request(9, provider, Uuid::now_v7());
    let (id, other_id) = (request.id, other.id);
    let env = TestEnv::new(FakeDirectory::default(), vec![request.clone(), other]);

    let update = RequestUpdate {
        related_request_id: Some(other_id),
        execution_act: Some(FilesPatch {
            add: vec![NewFile {
                name: "act.pdf".to_owned(),
                content: vec![1, 2, 3],
            }],
            remove: Vec::new(),
        }),
        requester_attachments: Some(FilesPatch {
            add: Vec::new(),
            remove: vec![Uuid::now_v7()],
        }),
        ..Default::default()
    };
    let err = env
        .service
        .update_request(&dispatcher(provider), id, update)
        .await
        .unwrap_err();

    assert!(
        matches!(err, DomainError::Validation { ref field, .. } if field == "requester_attachments")
    );
    let other = RequestsRepository::get(env.requests.as_ref(), other_id)
        .await
        .unwrap()
        .unwrap();
    assert!(other.relations.related.is_empty());
    assert!(env.files.is_empty());
    assert_eq!(
        RequestsRepository::get(env.requests.as_ref(), id)
            .await
            .unwrap()
            .unwrap(),
        request
    );
}

#[tokio::test]
async fn unknown_related_request_is_a_validation_error() {
    let provider = Uuid::now_v7();
    let request = sample_request(10, provider, Uuid::now_v7());
    let id = request.id;
    let env = TestEnv::new(FakeDirectory::default(), vec![request]);

    let err = env
        .service
        .update_request(
            &dispatcher(provider),
            id,
            RequestUpdate {
                related_request_id: Some(Uuid::now_v7()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "relations.related"));
}

#[tokio::test]
async fn related_request_of_another_organization_is_rejected_untouched() {
    let provider = Uuid::now_v7();
    let request = sample_request(20, provider, Uuid::now_v7());
    let foreign = sample_request(21, Uuid::now_v7(), Uuid::now_v7());
    let (id, foreign_id) = (request.id, foreign.id);
    let env = TestEnv::new(FakeDirectory::default(), vec![request.clone(), foreign.clone()]);

    let err = env
        .service
        .update_request(
            &dispatcher(provider),
            id,
            RequestUpdate {
                related_request_id: Some(foreign_id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "relations.related"));
    let stored_foreign = RequestsRepository::get(env.requests.as_ref(), foreign_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_foreign, foreign);
    let stored = RequestsRepository::get(env.requests.as_ref(), id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, request);
    assert!(env.history.get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn template_of_another_organization_is_rejected() {
    let provider = Uuid::now_v7();
    let request = sample_request(22, provider, Uuid::now_v7());
    let foreign = sample_request(23, Uuid::now_v7(), Uuid::now_v7());
    let (id, foreign_id) = (request.id, foreign.id);
    let env = TestEnv::new(FakeDirectory::default(), vec![request, foreign]);

    let err = env
        .service
        .update_request(
            &dispatcher(provider),
            id,
            RequestUpdate {
                template_id: Some(Some(foreign_id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "relations.template"));
    assert!(env.history.get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn template_can_be_set_and_cleared() {
    let provider = Uuid::now_v7();
    let request = sample_request(25, provider, Uuid::now_v7());
    let template = sample_request(26, provider, Uuid::now_v7());
    let (id, template_id) = (request.id, template.id);
    let env = TestEnv::new(FakeDirectory::default(), vec![request, template]);
    let actor = dispatcher(provider);

    let updated = env
        .service
        .update_request(
            &actor,
            id,
            RequestUpdate {
                template_id: Some(Some(template_id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.relations.template_id, Some(template_id));

    let updated = env
        .service
        .update_request(
            &actor,
            id,
            RequestUpdate {
                template_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.relations.template_id, None);

    let log = env.history.get(id).await.unwrap().unwrap();
    let shown: Vec<_> = log
        .entries
        .iter()
        .flat_map(|e| e.changes.iter())
        .filter(|c| c.field == "relations.template")
        .map(|c| c.display_value.as_str())
        .collect();
    assert!(shown.contains(&"#26"));
    assert!(shown.contains(&"none"));
}

#[tokio::test]
async fn removing_a_file_the_request_does_not_hold_is_a_validation_error() {
    let provider = Uuid::now_v7();
    let request = sample_request(24, provider, Uuid::now_v7());
    let id = request.id;
    let env = TestEnv::new(FakeDirectory::default(), vec![request]);

    let err = env
        .service
        .update_request(
            &dispatcher(provider),
            id,
            RequestUpdate {
                requester_attachments: Some(FilesPatch {
                    add: Vec::new(),
                    remove: vec![Uuid::now_v7()],
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, DomainError::Validation { ref field, .. } if field == "requester_attachments")
    );
    assert!(matches!(
        RequestsError::from(err),
        RequestsError::Validation { .. }
    ));
}

#[tokio::test]
async fn uploaded_file_is_recorded_with_link_and_removed_after_commit() {
    let provider = Uuid::now_v7();
    let request = sample_request(11, provider, Uuid::now_v7());
    let id = request.id;
    let env = TestEnv::new(FakeDirectory::default(), vec![request]);
    let actor = dispatcher(provider);

    let updated = env
        .service
        .update_request(
            &actor,
            id,
            RequestUpdate {
                execution_attachments: Some(FilesPatch {
                    add: vec![NewFile {
                        name: "photo.jpg".to_owned(),
                        content: vec![9; 16],
                    }],
                    remove: Vec::new(),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let file = updated.execution.attachments[0].clone();
    assert_eq!(env.files.len(), 1);

    let log = env.history.get(id).await.unwrap().unwrap();
    let record = &log.entries[0].changes[0];
    assert_eq!(record.field, "execution.attachments");
    assert_eq!(record.link.as_deref(), Some(format!("/api/files/{}", file.id).as_str()));

    let updated = env
        .service
        .update_request(
            &actor,
            id,
            RequestUpdate {
                execution_attachments: Some(FilesPatch {
                    add: Vec::new(),
                    remove: vec![file.id],
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.execution.attachments.is_empty());
    assert!(env.files.is_empty());
}

#[tokio::test]
async fn tenant_cannot_change_staff_fields() {
    let author = tenant();
    let request = sample_request(12, Uuid::now_v7(), author.id);
    let id = request.id;
    let env = TestEnv::new(FakeDirectory::default(), vec![request]);

    let err = env
        .service
        .update_request(
            &author,
            id,
            RequestUpdate {
                tag: Some(RequestTag::Emergency),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    let updated = env
        .service
        .update_request(
            &author,
            id,
            RequestUpdate {
                description: Some("Also the lift".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "Also the lift");
}

#[tokio::test]
async fn staff_of_unbound_organization_is_forbidden() {
    let request = sample_request(13, Uuid::now_v7(), Uuid::now_v7());
    let id = request.id;
    let env = TestEnv::new(FakeDirectory::default(), vec![request]);

    let err = env
        .service
        .update_request(&dispatcher(Uuid::now_v7()), id, RequestUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));
}
