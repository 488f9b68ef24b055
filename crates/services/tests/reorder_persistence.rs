use std::sync::Arc;

use academy_core::model::{PageId, PageKind, ProgramId, RichTextDraft};
use academy_core::time::fixed_now;
use academy_services::{Clock, PageOrderEditor, ProgramService, ReorderOutcome};
use academy_storage::repository::Storage;

async fn seed(db: &str, pages: usize) -> (ProgramService, ProgramId, Vec<PageId>) {
    let storage = Storage::sqlite(db).await.expect("connect sqlite");
    let service = ProgramService::new(
        Clock::fixed(fixed_now()),
        Arc::clone(&storage.programs),
        Arc::clone(&storage.pages),
    );
    let program_id = service
        .create_program("Backend Onboarding".to_string(), None)
        .await
        .expect("create program");
    let mut page_ids = Vec::new();
    for i in 0..pages {
        let page_id = service
            .create_page(
                format!("Module {i}"),
                PageKind::Theory,
                None,
                RichTextDraft::text_only("body"),
            )
            .await
            .expect("create page");
        service
            .attach_page(program_id, page_id, false)
            .await
            .expect("attach page");
        page_ids.push(page_id);
    }
    (service, program_id, page_ids)
}

fn order(items: &[academy_core::model::ProgramPage]) -> Vec<PageId> {
    items.iter().map(|p| p.page_id).collect()
}

#[tokio::test]
async fn drag_gesture_persists_and_survives_reload() {
    let (service, program_id, ids) = seed(
        "sqlite:file:memdb_reorder_persist?mode=memory&cache=shared",
        4,
    )
    .await;
    let mut editor = PageOrderEditor::load(service.clone(), program_id)
        .await
        .expect("load editor");

    // Drag the last page up through the list to the top.
    editor.begin_drag(ids[3]);
    editor.hover_over(ids[2]);
    editor.hover_over(ids[1]);
    editor.hover_over(ids[0]);
    assert_eq!(order(editor.items()), vec![ids[3], ids[0], ids[1], ids[2]]);

    let outcome = editor.end_drag().await.expect("end drag");
    assert_eq!(outcome, ReorderOutcome::Persisted);

    // A fresh editor sees the same order with dense indexes.
    let reloaded = PageOrderEditor::load(service, program_id)
        .await
        .expect("reload editor");
    assert_eq!(order(reloaded.items()), vec![ids[3], ids[0], ids[1], ids[2]]);
    assert_eq!(
        reloaded
            .items()
            .iter()
            .map(|p| p.order_index)
            .collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
}

#[tokio::test]
async fn abandoned_gesture_leaves_the_store_untouched() {
    let (service, program_id, ids) = seed(
        "sqlite:file:memdb_reorder_cancel?mode=memory&cache=shared",
        3,
    )
    .await;
    let mut editor = PageOrderEditor::load(service.clone(), program_id)
        .await
        .expect("load editor");

    editor.begin_drag(ids[2]);
    editor.hover_over(ids[0]);
    editor.cancel_drag();
    assert_eq!(order(editor.items()), ids);

    let stored = service
        .list_program_pages(program_id)
        .await
        .expect("list pages");
    assert_eq!(order(&stored), ids);
}

#[tokio::test]
async fn hover_without_order_change_skips_persistence() {
    let (service, program_id, ids) = seed(
        "sqlite:file:memdb_reorder_clean?mode=memory&cache=shared",
        2,
    )
    .await;
    let mut editor = PageOrderEditor::load(service, program_id)
        .await
        .expect("load editor");

    editor.begin_drag(ids[0]);
    editor.hover_over(ids[0]);
    let outcome = editor.end_drag().await.expect("end drag");
    assert_eq!(outcome, ReorderOutcome::Unchanged);
}
