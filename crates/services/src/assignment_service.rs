use std::sync::Arc;

use academy_core::model::{
    Assignment, AssignmentId, AssignmentPage, AssignmentPageId, EmployeeId, PageId, ProgramId,
    ProgressStatus,
};
use academy_core::ordering::{order_map, sort_by_program_order};
use academy_core::progress::progress_percent;
use academy_storage::repository::{
    AssignmentRepository, NewAssignmentPageRecord, NewAssignmentRecord, PageRepository,
    ProgramRepository,
};

use crate::Clock;
use crate::error::AssignmentServiceError;

/// Result of an assign-pages request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// Pages were inserted; duplicates in the request were skipped silently.
    Assigned {
        assignment_id: AssignmentId,
        pages: Vec<AssignmentPageId>,
    },
    /// Every requested page was already assigned; nothing was inserted.
    /// Surfaced to the caller as a notice, not an error.
    AlreadyAssigned { assignment_id: AssignmentId },
}

/// Orchestrates assignments and per-page progress.
#[derive(Clone)]
pub struct AssignmentService {
    clock: Clock,
    assignments: Arc<dyn AssignmentRepository>,
    programs: Arc<dyn ProgramRepository>,
    pages: Arc<dyn PageRepository>,
}

impl AssignmentService {
    #[must_use]
    pub fn new(
        clock: Clock,
        assignments: Arc<dyn AssignmentRepository>,
        programs: Arc<dyn ProgramRepository>,
        pages: Arc<dyn PageRepository>,
    ) -> Self {
        Self {
            clock,
            assignments,
            programs,
            pages,
        }
    }

    /// Assign pages of a program to an employee.
    ///
    /// Looks up the most recent assignment for the pair and creates one
    /// (status `not_started`) if none exists. Page ids already assigned for
    /// this program are excluded up front and skipped silently. When a page
    /// has a version snapshot, the assignment pins the latest one.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::NoPagesRequested` when `page_ids` is
    /// empty (caught before any round trip), or `::Storage` when assignment
    /// creation or a page insert fails.
    pub async fn assign_pages(
        &self,
        employee_id: EmployeeId,
        program_id: ProgramId,
        page_ids: &[PageId],
    ) -> Result<AssignOutcome, AssignmentServiceError> {
        if page_ids.is_empty() {
            return Err(AssignmentServiceError::NoPagesRequested);
        }

        let assignment_id = match self
            .assignments
            .latest_assignment(employee_id, program_id)
            .await?
        {
            Some(existing) => existing.id,
            None => {
                self.assignments
                    .insert_assignment(NewAssignmentRecord {
                        employee_id,
                        program_id,
                        status: ProgressStatus::NotStarted,
                        assigned_at: self.clock.now(),
                    })
                    .await?
            }
        };

        let already = self
            .assignments
            .assigned_page_ids(employee_id, program_id)
            .await?;
        let mut to_insert: Vec<PageId> = Vec::new();
        for &page_id in page_ids {
            if !already.contains(&page_id) && !to_insert.contains(&page_id) {
                to_insert.push(page_id);
            }
        }

        if to_insert.is_empty() {
            return Ok(AssignOutcome::AlreadyAssigned { assignment_id });
        }

        let mut inserted = Vec::with_capacity(to_insert.len());
        for page_id in to_insert {
            let page_version_id = self
                .pages
                .latest_version(page_id)
                .await?
                .map(|v| v.id);
            let id = self
                .assignments
                .insert_assignment_page(NewAssignmentPageRecord {
                    assignment_id,
                    page_id,
                    page_version_id,
                    status: ProgressStatus::NotStarted,
                })
                .await?;
            inserted.push(id);
        }

        tracing::info!(
            employee_id = employee_id.value(),
            program_id = program_id.value(),
            assigned = inserted.len(),
            "pages assigned"
        );
        Ok(AssignOutcome::Assigned {
            assignment_id,
            pages: inserted,
        })
    }

    /// Most recent assignment for the pair, if any.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` on repository failures.
    pub async fn latest_assignment(
        &self,
        employee_id: EmployeeId,
        program_id: ProgramId,
    ) -> Result<Option<Assignment>, AssignmentServiceError> {
        Ok(self
            .assignments
            .latest_assignment(employee_id, program_id)
            .await?)
    }

    /// Write a page's status directly. No transition guard; any status may
    /// replace any other.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` if the row is missing or
    /// the write fails.
    pub async fn update_status(
        &self,
        assignment_page_id: AssignmentPageId,
        status: ProgressStatus,
    ) -> Result<(), AssignmentServiceError> {
        self.assignments
            .set_page_status(assignment_page_id, status)
            .await?;
        Ok(())
    }

    /// Record a reviewer's score for a page.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` if the row is missing or
    /// the write fails.
    pub async fn set_score(
        &self,
        assignment_page_id: AssignmentPageId,
        score: Option<u32>,
    ) -> Result<(), AssignmentServiceError> {
        self.assignments
            .set_page_score(assignment_page_id, score)
            .await?;
        Ok(())
    }

    /// Progress percentage for an assignment: done pages over all pages,
    /// rounded; 0 when no pages are assigned.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` on repository failures.
    pub async fn progress(
        &self,
        assignment_id: AssignmentId,
    ) -> Result<u8, AssignmentServiceError> {
        let pages = self
            .assignments
            .list_assignment_pages(assignment_id)
            .await?;
        let statuses: Vec<ProgressStatus> = pages.iter().map(|p| p.status).collect();
        Ok(progress_percent(&statuses))
    }

    /// The learner's page list in display order: program order first,
    /// entries missing from the order map last, ties by id.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` on repository failures.
    pub async fn page_list(
        &self,
        assignment_id: AssignmentId,
        program_id: ProgramId,
    ) -> Result<Vec<AssignmentPage>, AssignmentServiceError> {
        let mut pages = self
            .assignments
            .list_assignment_pages(assignment_id)
            .await?;
        let order = order_map(&self.programs.list_program_pages(program_id).await?);
        sort_by_program_order(&mut pages, &order);
        Ok(pages)
    }
}
