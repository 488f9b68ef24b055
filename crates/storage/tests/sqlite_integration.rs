use chrono::Duration;
use academy_core::model::{PageKind, ProgramPage, ProgressStatus, RichTextDraft};
use academy_core::time::fixed_now;
use academy_storage::repository::{
    AssignmentRepository, CommentRepository, EmployeeRepository, NewAssignmentPageRecord,
    NewAssignmentRecord, NewCommentRecord, NewPageRecord, NewProgramRecord, NewSubmissionRecord,
    PageRepository, ProgramRepository, StorageError, SubmissionRepository,
};
use academy_storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn content(body: &str) -> academy_core::model::RichText {
    RichTextDraft::text_only(body).validate().unwrap()
}

#[tokio::test]
async fn sqlite_roundtrips_program_pages_and_order() {
    let repo = connect("memdb_order").await;

    let program_id = repo
        .insert_program(NewProgramRecord {
            name: "Onboarding".into(),
            description: Some("First month".into()),
            created_at: fixed_now(),
        })
        .await
        .unwrap();

    let mut page_ids = Vec::new();
    for (i, title) in ["Welcome", "Tooling", "First task"].iter().enumerate() {
        let page_id = repo
            .insert_page(NewPageRecord {
                title: (*title).into(),
                kind: if i == 2 { PageKind::Task } else { PageKind::Theory },
                category_id: None,
                content: content("body"),
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        repo.attach_page(ProgramPage {
            program_id,
            page_id,
            order_index: i as u32,
            is_required: i == 0,
        })
        .await
        .unwrap();
        page_ids.push(page_id);
    }

    let rows = repo.list_program_pages(program_id).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].page_id, page_ids[0]);
    assert!(rows[0].is_required);
    assert_eq!(
        rows.iter().map(|r| r.order_index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    // Swap first and last the way persist-order does: one keyed update per row.
    repo.set_order_index(program_id, page_ids[0], 2).await.unwrap();
    repo.set_order_index(program_id, page_ids[2], 0).await.unwrap();
    let rows = repo.list_program_pages(program_id).await.unwrap();
    assert_eq!(rows[0].page_id, page_ids[2]);
    assert_eq!(rows[2].page_id, page_ids[0]);
}

#[tokio::test]
async fn sqlite_page_with_images_round_trips() {
    let repo = connect("memdb_images").await;

    let draft = RichTextDraft::new(
        "# Guide",
        vec!["https://files.example.com/pub/a.png".into()],
    );
    let page_id = repo
        .insert_page(NewPageRecord {
            title: "Guide".into(),
            kind: PageKind::Theory,
            category_id: None,
            content: draft.validate().unwrap(),
            created_at: fixed_now(),
        })
        .await
        .unwrap();

    let page = repo.get_page(page_id).await.unwrap().unwrap();
    assert_eq!(page.content().body(), "# Guide");
    assert_eq!(page.content().images().len(), 1);
}

#[tokio::test]
async fn sqlite_latest_assignment_and_status_updates() {
    let repo = connect("memdb_assign").await;

    let employee_id = repo
        .insert_employee("Dana Ivers".into(), "dana@quitcode.dev".into())
        .await
        .unwrap();
    let program_id = repo
        .insert_program(NewProgramRecord {
            name: "Rust basics".into(),
            description: None,
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    let page_id = repo
        .insert_page(NewPageRecord {
            title: "Ownership".into(),
            kind: PageKind::Task,
            category_id: None,
            content: content("read this"),
            created_at: fixed_now(),
        })
        .await
        .unwrap();

    let first = repo
        .insert_assignment(NewAssignmentRecord {
            employee_id,
            program_id,
            status: ProgressStatus::NotStarted,
            assigned_at: fixed_now(),
        })
        .await
        .unwrap();
    let second = repo
        .insert_assignment(NewAssignmentRecord {
            employee_id,
            program_id,
            status: ProgressStatus::NotStarted,
            assigned_at: fixed_now() + Duration::hours(1),
        })
        .await
        .unwrap();
    assert!(second > first);

    let latest = repo
        .latest_assignment(employee_id, program_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, second);

    let ap_id = repo
        .insert_assignment_page(NewAssignmentPageRecord {
            assignment_id: second,
            page_id,
            page_version_id: None,
            status: ProgressStatus::NotStarted,
        })
        .await
        .unwrap();

    repo.set_page_status(ap_id, ProgressStatus::ReadyForReview)
        .await
        .unwrap();
    let page = repo.get_assignment_page(ap_id).await.unwrap().unwrap();
    assert_eq!(page.status, ProgressStatus::ReadyForReview);

    let assigned = repo.assigned_page_ids(employee_id, program_id).await.unwrap();
    assert!(assigned.contains(&page_id));
}

#[tokio::test]
async fn sqlite_submissions_newest_first_and_comments_oldest_first() {
    let repo = connect("memdb_threads").await;

    let employee_id = repo
        .insert_employee("Riley Chen".into(), "riley@quitcode.dev".into())
        .await
        .unwrap();
    let program_id = repo
        .insert_program(NewProgramRecord {
            name: "P".into(),
            description: None,
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    let page_id = repo
        .insert_page(NewPageRecord {
            title: "T".into(),
            kind: PageKind::Task,
            category_id: None,
            content: content("task"),
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    let assignment_id = repo
        .insert_assignment(NewAssignmentRecord {
            employee_id,
            program_id,
            status: ProgressStatus::NotStarted,
            assigned_at: fixed_now(),
        })
        .await
        .unwrap();
    let ap_id = repo
        .insert_assignment_page(NewAssignmentPageRecord {
            assignment_id,
            page_id,
            page_version_id: None,
            status: ProgressStatus::InProgress,
        })
        .await
        .unwrap();

    let now = fixed_now();
    repo.insert_submission(NewSubmissionRecord {
        assignment_page_id: ap_id,
        body: "draft".into(),
        submitted_at: now,
    })
    .await
    .unwrap();
    repo.insert_submission(NewSubmissionRecord {
        assignment_page_id: ap_id,
        body: "final".into(),
        submitted_at: now + Duration::minutes(5),
    })
    .await
    .unwrap();

    let latest = repo.latest_submission(ap_id).await.unwrap().unwrap();
    assert_eq!(latest.body, "final");

    repo.insert_comment(NewCommentRecord {
        assignment_page_id: ap_id,
        author_id: employee_id,
        body: "looks good".into(),
        created_at: now,
    })
    .await
    .unwrap();
    repo.insert_comment(NewCommentRecord {
        assignment_page_id: ap_id,
        author_id: employee_id,
        body: "one nit".into(),
        created_at: now + Duration::minutes(1),
    })
    .await
    .unwrap();

    let thread = repo.list_comments(ap_id).await.unwrap();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].body, "looks good");
    assert_eq!(thread[1].body, "one nit");
}

#[tokio::test]
async fn sqlite_delete_page_requires_detach_first() {
    let repo = connect("memdb_delete").await;

    let program_id = repo
        .insert_program(NewProgramRecord {
            name: "P".into(),
            description: None,
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    let page_id = repo
        .insert_page(NewPageRecord {
            title: "Removable".into(),
            kind: PageKind::Theory,
            category_id: None,
            content: content("bye"),
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    repo.attach_page(ProgramPage {
        program_id,
        page_id,
        order_index: 0,
        is_required: false,
    })
    .await
    .unwrap();

    // Join rows reference the page; the service deletes them first.
    repo.detach_page_everywhere(page_id).await.unwrap();
    repo.delete_page(page_id).await.unwrap();

    assert!(repo.get_page(page_id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_page(page_id).await.unwrap_err(),
        StorageError::NotFound
    ));
}
