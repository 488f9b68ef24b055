use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{AssignmentPageId, CommentId, EmployeeId, SubmissionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("submission text cannot be empty")]
    EmptyBody,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommentError {
    #[error("comment text cannot be empty")]
    EmptyBody,
}

/// A free-text answer to a task page. Append-only; only the most recent
/// submission for an assignment page is shown as current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: SubmissionId,
    pub assignment_page_id: AssignmentPageId,
    pub body: String,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Creates a submission, rejecting blank text.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::EmptyBody` if the text is blank.
    pub fn new(
        id: SubmissionId,
        assignment_page_id: AssignmentPageId,
        body: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, SubmissionError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(SubmissionError::EmptyBody);
        }
        Ok(Self {
            id,
            assignment_page_id,
            body,
            submitted_at,
        })
    }
}

/// A threaded note on an assignment page. Append-only; no edit or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub assignment_page_id: AssignmentPageId,
    pub author_id: EmployeeId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment, rejecting blank text.
    ///
    /// # Errors
    ///
    /// Returns `CommentError::EmptyBody` if the text is blank.
    pub fn new(
        id: CommentId,
        assignment_page_id: AssignmentPageId,
        author_id: EmployeeId,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CommentError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(CommentError::EmptyBody);
        }
        Ok(Self {
            id,
            assignment_page_id,
            author_id,
            body,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn blank_submission_is_rejected() {
        let err = Submission::new(
            SubmissionId::new(1),
            AssignmentPageId::new(1),
            "  \n ",
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SubmissionError::EmptyBody);
    }

    #[test]
    fn blank_comment_is_rejected() {
        let err = Comment::new(
            CommentId::new(1),
            AssignmentPageId::new(1),
            EmployeeId::new(5),
            "",
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, CommentError::EmptyBody);
    }
}
