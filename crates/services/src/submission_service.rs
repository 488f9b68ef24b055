use std::sync::Arc;

use academy_core::model::{
    AssignmentPageId, Comment, CommentId, EmployeeId, Submission, SubmissionError, SubmissionId,
};
use academy_storage::repository::{
    CommentRepository, NewCommentRecord, NewSubmissionRecord, SubmissionRepository,
};

use crate::Clock;
use crate::error::SubmissionServiceError;

/// Task answers and their review threads.
///
/// Submissions and comments are both append-only. Submitting never changes
/// the page's status; moving to review is a separate, explicit action.
#[derive(Clone)]
pub struct SubmissionService {
    clock: Clock,
    submissions: Arc<dyn SubmissionRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl SubmissionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        submissions: Arc<dyn SubmissionRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            clock,
            submissions,
            comments,
        }
    }

    /// Record a new answer for a task page.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionServiceError::Submission` when the text is blank
    /// (caught before any round trip), or `::Storage` when the insert fails.
    pub async fn submit_task(
        &self,
        assignment_page_id: AssignmentPageId,
        body: String,
    ) -> Result<SubmissionId, SubmissionServiceError> {
        if body.trim().is_empty() {
            return Err(SubmissionError::EmptyBody.into());
        }
        let id = self
            .submissions
            .insert_submission(NewSubmissionRecord {
                assignment_page_id,
                body,
                submitted_at: self.clock.now(),
            })
            .await?;
        Ok(id)
    }

    /// The answer currently shown for a page: the newest submission, if any.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionServiceError::Storage` on repository failures.
    pub async fn current_submission(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Option<Submission>, SubmissionServiceError> {
        Ok(self.submissions.latest_submission(assignment_page_id).await?)
    }

    /// Full submission history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionServiceError::Storage` on repository failures.
    pub async fn history(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Vec<Submission>, SubmissionServiceError> {
        Ok(self.submissions.list_submissions(assignment_page_id).await?)
    }

    /// Append a comment to a page's review thread.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionServiceError::Comment` when the text is blank,
    /// or `::Storage` when the insert fails.
    pub async fn add_comment(
        &self,
        assignment_page_id: AssignmentPageId,
        author_id: EmployeeId,
        body: String,
    ) -> Result<CommentId, SubmissionServiceError> {
        let now = self.clock.now();
        Comment::new(CommentId::new(1), assignment_page_id, author_id, body.clone(), now)?;
        let id = self
            .comments
            .insert_comment(NewCommentRecord {
                assignment_page_id,
                author_id,
                body,
                created_at: now,
            })
            .await?;
        Ok(id)
    }

    /// The review thread, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionServiceError::Storage` on repository failures.
    pub async fn thread(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Vec<Comment>, SubmissionServiceError> {
        Ok(self.comments.list_comments(assignment_page_id).await?)
    }
}
