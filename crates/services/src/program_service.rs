use std::sync::Arc;

use academy_core::model::{
    Category, CategoryId, Page, PageId, PageKind, PageVersionId, Program, ProgramId, ProgramPage,
    RichTextDraft,
};
use academy_storage::repository::{
    NewPageRecord, NewProgramRecord, PageRepository, ProgramRepository,
};

use crate::Clock;
use crate::error::ProgramServiceError;

/// Administers programs, pages, and the page-order join rows.
#[derive(Clone)]
pub struct ProgramService {
    clock: Clock,
    programs: Arc<dyn ProgramRepository>,
    pages: Arc<dyn PageRepository>,
}

impl ProgramService {
    #[must_use]
    pub fn new(
        clock: Clock,
        programs: Arc<dyn ProgramRepository>,
        pages: Arc<dyn PageRepository>,
    ) -> Self {
        Self {
            clock,
            programs,
            pages,
        }
    }

    /// Create a new program and persist it.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Program` for validation failures.
    /// Returns `ProgramServiceError::Storage` if persistence fails.
    pub async fn create_program(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<ProgramId, ProgramServiceError> {
        let now = self.clock.now();
        // Validate before the round trip; the id is assigned by the store.
        Program::new(ProgramId::new(1), name.clone(), description.clone(), now)?;
        let id = self
            .programs
            .insert_program(NewProgramRecord {
                name,
                description,
                created_at: now,
            })
            .await?;
        Ok(id)
    }

    /// Rename a program and replace its description.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Program` for validation failures,
    /// `::Storage` if the program is missing or persistence fails.
    pub async fn rename_program(
        &self,
        id: ProgramId,
        name: String,
        description: Option<String>,
    ) -> Result<(), ProgramServiceError> {
        Program::new(id, name.clone(), description.clone(), self.clock.now())?;
        self.programs.update_program(id, name, description).await?;
        Ok(())
    }

    /// Fetch a program by id. Returns `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` if repository access fails.
    pub async fn get_program(
        &self,
        id: ProgramId,
    ) -> Result<Option<Program>, ProgramServiceError> {
        Ok(self.programs.get_program(id).await?)
    }

    /// List programs ordered by id, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` if repository access fails.
    pub async fn list_programs(&self, limit: u32) -> Result<Vec<Program>, ProgramServiceError> {
        Ok(self.programs.list_programs(limit).await?)
    }

    /// Create a page from an editor draft and persist it.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Content` or `::Page` for validation
    /// failures, `::Storage` if persistence fails.
    pub async fn create_page(
        &self,
        title: String,
        kind: PageKind,
        category_id: Option<CategoryId>,
        draft: RichTextDraft,
    ) -> Result<PageId, ProgramServiceError> {
        let now = self.clock.now();
        let content = draft.validate()?;
        Page::new(PageId::new(1), title.clone(), kind, category_id, content.clone(), now)?;
        let id = self
            .pages
            .insert_page(NewPageRecord {
                title,
                kind,
                category_id,
                content,
                created_at: now,
            })
            .await?;
        Ok(id)
    }

    /// Replace a page's content and snapshot the previous body as a version.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Content` for validation failures,
    /// `::Storage` if the page is missing or persistence fails.
    pub async fn update_page_content(
        &self,
        page_id: PageId,
        draft: RichTextDraft,
    ) -> Result<Option<PageVersionId>, ProgramServiceError> {
        let now = self.clock.now();
        let content = draft.validate()?;
        let snapshot = match self.pages.get_page(page_id).await? {
            Some(existing) => Some(
                self.pages
                    .snapshot_version(page_id, existing.content().clone(), now)
                    .await?,
            ),
            None => None,
        };
        self.pages.update_page_content(page_id, content).await?;
        Ok(snapshot)
    }

    /// Attach a page to the end of a program's order.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` on conflicts or failures.
    pub async fn attach_page(
        &self,
        program_id: ProgramId,
        page_id: PageId,
        is_required: bool,
    ) -> Result<(), ProgramServiceError> {
        let existing = self.programs.list_program_pages(program_id).await?;
        let order_index = u32::try_from(existing.len()).unwrap_or(u32::MAX);
        self.programs
            .attach_page(ProgramPage {
                program_id,
                page_id,
                order_index,
                is_required,
            })
            .await?;
        Ok(())
    }

    /// Toggle the required flag on a program's page.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` if the join row is missing.
    pub async fn set_required(
        &self,
        program_id: ProgramId,
        page_id: PageId,
        is_required: bool,
    ) -> Result<(), ProgramServiceError> {
        self.programs
            .set_required(program_id, page_id, is_required)
            .await?;
        Ok(())
    }

    /// Canonical page order for a program.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` if repository access fails.
    pub async fn list_program_pages(
        &self,
        program_id: ProgramId,
    ) -> Result<Vec<ProgramPage>, ProgramServiceError> {
        Ok(self.programs.list_program_pages(program_id).await?)
    }

    /// List all page categories.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` if repository access fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ProgramServiceError> {
        Ok(self.pages.list_categories().await?)
    }

    /// Create a page category.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` if persistence fails.
    pub async fn create_category(&self, name: String) -> Result<CategoryId, ProgramServiceError> {
        Ok(self.pages.insert_category(name).await?)
    }

    /// Delete a page: join rows first, then the page row itself.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` if the page is missing or a
    /// delete fails.
    pub async fn delete_page(&self, page_id: PageId) -> Result<(), ProgramServiceError> {
        self.programs.detach_page_everywhere(page_id).await?;
        self.pages.delete_page(page_id).await?;
        Ok(())
    }

    /// Persist a reordered page list and return the store's canonical order.
    ///
    /// Issues one update per row, keyed by page id. Individual row failures
    /// are deliberately not checked here; callers compare the re-fetched
    /// canonical order against their optimistic list and roll back on
    /// disagreement.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` only if the re-fetch fails.
    pub async fn persist_order(
        &self,
        program_id: ProgramId,
        items: &[ProgramPage],
    ) -> Result<Vec<ProgramPage>, ProgramServiceError> {
        for item in items {
            if let Err(err) = self
                .programs
                .set_order_index(program_id, item.page_id, item.order_index)
                .await
            {
                tracing::debug!(
                    page_id = item.page_id.value(),
                    order_index = item.order_index,
                    error = %err,
                    "order-index update failed; re-fetch will surface the drift"
                );
            }
        }
        Ok(self.programs.list_program_pages(program_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::time::fixed_clock;
    use academy_storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository) -> ProgramService {
        ProgramService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
    }

    async fn seed_program_with_pages(
        svc: &ProgramService,
        count: usize,
    ) -> (ProgramId, Vec<PageId>) {
        let program_id = svc
            .create_program("Onboarding".into(), None)
            .await
            .unwrap();
        let mut page_ids = Vec::new();
        for i in 0..count {
            let page_id = svc
                .create_page(
                    format!("Page {i}"),
                    PageKind::Theory,
                    None,
                    RichTextDraft::text_only("body"),
                )
                .await
                .unwrap();
            svc.attach_page(program_id, page_id, false).await.unwrap();
            page_ids.push(page_id);
        }
        (program_id, page_ids)
    }

    #[tokio::test]
    async fn rename_replaces_name_and_description() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let id = svc.create_program("Onboarding".into(), None).await.unwrap();

        svc.rename_program(id, "Backend Onboarding".into(), Some("Month one".into()))
            .await
            .unwrap();
        let program = svc.get_program(id).await.unwrap().unwrap();
        assert_eq!(program.name(), "Backend Onboarding");
        assert_eq!(program.description(), Some("Month one"));

        let err = svc.rename_program(id, "  ".into(), None).await.unwrap_err();
        assert!(matches!(err, ProgramServiceError::Program(_)));
    }

    #[tokio::test]
    async fn attach_appends_at_end_of_order() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let (program_id, page_ids) = seed_program_with_pages(&svc, 3).await;

        let rows = svc.list_program_pages(program_id).await.unwrap();
        assert_eq!(
            rows.iter().map(|r| r.page_id).collect::<Vec<_>>(),
            page_ids
        );
        assert_eq!(
            rows.iter().map(|r| r.order_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn persist_order_is_idempotent() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let (program_id, page_ids) = seed_program_with_pages(&svc, 3).await;

        let mut items = svc.list_program_pages(program_id).await.unwrap();
        items.swap(0, 2);
        academy_core::ordering::renumber(&mut items);

        let first = svc.persist_order(program_id, &items).await.unwrap();
        let second = svc.persist_order(program_id, &items).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].page_id, page_ids[2]);
        assert_eq!(
            first.iter().map(|r| r.order_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn delete_page_removes_join_rows_first() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let (program_id, page_ids) = seed_program_with_pages(&svc, 2).await;

        svc.delete_page(page_ids[0]).await.unwrap();
        let rows = svc.list_program_pages(program_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].page_id, page_ids[1]);
    }

    #[tokio::test]
    async fn updating_content_snapshots_previous_version() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let page_id = svc
            .create_page(
                "Guide".into(),
                PageKind::Theory,
                None,
                RichTextDraft::text_only("v1"),
            )
            .await
            .unwrap();

        let snapshot = svc
            .update_page_content(page_id, RichTextDraft::text_only("v2"))
            .await
            .unwrap();
        assert!(snapshot.is_some());

        use academy_storage::repository::PageRepository as _;
        let version = repo.latest_version(page_id).await.unwrap().unwrap();
        assert_eq!(version.content.body(), "v1");
        let page = repo.get_page(page_id).await.unwrap().unwrap();
        assert_eq!(page.content().body(), "v2");
    }
}
