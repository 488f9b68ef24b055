use std::sync::Arc;

use academy_core::model::{AssignmentPage, AssignmentPageId, ProgressStatus};
use academy_storage::repository::AssignmentRepository;

use crate::error::AssignmentServiceError;

/// Optimistic status editor over a loaded page list.
///
/// The visible list is mutated before the write is attempted so the change
/// appears instantly. A failed write restores the pre-edit snapshot, so the
/// visible state never drifts from the store for longer than one round trip.
pub struct StatusEditor {
    assignments: Arc<dyn AssignmentRepository>,
    pages: Vec<AssignmentPage>,
}

impl StatusEditor {
    #[must_use]
    pub fn new(assignments: Arc<dyn AssignmentRepository>, pages: Vec<AssignmentPage>) -> Self {
        Self { assignments, pages }
    }

    /// The list as currently displayed, optimistic edits included.
    #[must_use]
    pub fn pages(&self) -> &[AssignmentPage] {
        &self.pages
    }

    /// Set a page's status, applying the change locally first.
    ///
    /// Unknown ids are a no-op. Any status may replace any other; there is
    /// no transition guard.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` when the write fails; the
    /// local list has already been rolled back when this returns.
    pub async fn set(
        &mut self,
        id: AssignmentPageId,
        status: ProgressStatus,
    ) -> Result<(), AssignmentServiceError> {
        let Some(index) = self.pages.iter().position(|p| p.id == id) else {
            return Ok(());
        };
        let previous = self.pages[index].status;
        if previous == status {
            return Ok(());
        }

        self.pages[index].status = status;
        if let Err(err) = self.assignments.set_page_status(id, status).await {
            self.pages[index].status = previous;
            tracing::warn!(
                assignment_page_id = id.value(),
                status = status.as_str(),
                error = %err,
                "status write failed; local change rolled back"
            );
            return Err(err.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::model::{AssignmentId, PageId};
    use academy_storage::repository::{InMemoryRepository, StorageError};
    use async_trait::async_trait;

    fn page(id: u64) -> AssignmentPage {
        AssignmentPage {
            id: AssignmentPageId::new(id),
            assignment_id: AssignmentId::new(1),
            page_id: PageId::new(id),
            page_version_id: None,
            status: ProgressStatus::NotStarted,
            score: None,
        }
    }

    /// Delegates everything but fails every status write.
    #[derive(Clone)]
    struct FailingStatusWrites(InMemoryRepository);

    #[async_trait]
    impl AssignmentRepository for FailingStatusWrites {
        async fn latest_assignment(
            &self,
            employee_id: academy_core::model::EmployeeId,
            program_id: academy_core::model::ProgramId,
        ) -> Result<Option<academy_core::model::Assignment>, StorageError> {
            self.0.latest_assignment(employee_id, program_id).await
        }

        async fn insert_assignment(
            &self,
            record: academy_storage::repository::NewAssignmentRecord,
        ) -> Result<AssignmentId, StorageError> {
            self.0.insert_assignment(record).await
        }

        async fn assigned_page_ids(
            &self,
            employee_id: academy_core::model::EmployeeId,
            program_id: academy_core::model::ProgramId,
        ) -> Result<std::collections::HashSet<PageId>, StorageError> {
            self.0.assigned_page_ids(employee_id, program_id).await
        }

        async fn insert_assignment_page(
            &self,
            record: academy_storage::repository::NewAssignmentPageRecord,
        ) -> Result<AssignmentPageId, StorageError> {
            self.0.insert_assignment_page(record).await
        }

        async fn get_assignment_page(
            &self,
            id: AssignmentPageId,
        ) -> Result<Option<AssignmentPage>, StorageError> {
            self.0.get_assignment_page(id).await
        }

        async fn list_assignment_pages(
            &self,
            assignment_id: AssignmentId,
        ) -> Result<Vec<AssignmentPage>, StorageError> {
            self.0.list_assignment_pages(assignment_id).await
        }

        async fn set_page_status(
            &self,
            _id: AssignmentPageId,
            _status: ProgressStatus,
        ) -> Result<(), StorageError> {
            Err(StorageError::Connection("injected failure".into()))
        }

        async fn set_page_score(
            &self,
            id: AssignmentPageId,
            score: Option<u32>,
        ) -> Result<(), StorageError> {
            self.0.set_page_score(id, score).await
        }
    }

    #[tokio::test]
    async fn failed_write_restores_previous_status() {
        let repo = FailingStatusWrites(InMemoryRepository::new());
        let mut editor = StatusEditor::new(Arc::new(repo), vec![page(1), page(2)]);

        let err = editor
            .set(AssignmentPageId::new(2), ProgressStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentServiceError::Storage(_)));
        assert_eq!(editor.pages()[1].status, ProgressStatus::NotStarted);
    }

    #[tokio::test]
    async fn unknown_id_is_a_no_op() {
        let repo = FailingStatusWrites(InMemoryRepository::new());
        let mut editor = StatusEditor::new(Arc::new(repo), vec![page(1)]);

        editor
            .set(AssignmentPageId::new(99), ProgressStatus::Done)
            .await
            .unwrap();
        assert_eq!(editor.pages()[0].status, ProgressStatus::NotStarted);
    }

    #[tokio::test]
    async fn same_status_skips_the_round_trip() {
        // The repository would fail the write, so not erroring proves we
        // never issued it.
        let repo = FailingStatusWrites(InMemoryRepository::new());
        let mut editor = StatusEditor::new(Arc::new(repo), vec![page(1)]);

        editor
            .set(AssignmentPageId::new(1), ProgressStatus::NotStarted)
            .await
            .unwrap();
    }
}
