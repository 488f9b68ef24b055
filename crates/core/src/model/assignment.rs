use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{
    AssignmentId, AssignmentPageId, EmployeeId, PageId, PageVersionId, ProgramId,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssignmentError {
    #[error("unknown progress status: {0}")]
    UnknownStatus(String),
}

//
// ─── PROGRESS STATUS ───────────────────────────────────────────────────────────
//

/// Flat learner-visible status set, shared by assignments and their pages.
///
/// Transitions are deliberately unconstrained: the UI exposes all five as a
/// flat selector and any status may be written over any other, including
/// `Done` back to `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    ReadyForReview,
    RevisionNeeded,
    Done,
}

impl ProgressStatus {
    /// All statuses in selector order.
    pub const ALL: [ProgressStatus; 5] = [
        ProgressStatus::NotStarted,
        ProgressStatus::InProgress,
        ProgressStatus::ReadyForReview,
        ProgressStatus::RevisionNeeded,
        ProgressStatus::Done,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::ReadyForReview => "ready_for_review",
            ProgressStatus::RevisionNeeded => "revision_needed",
            ProgressStatus::Done => "done",
        }
    }

    /// Parses the persisted representation.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError::UnknownStatus` for values outside the set.
    pub fn parse(s: &str) -> Result<Self, AssignmentError> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "ready_for_review" => Ok(Self::ReadyForReview),
            "revision_needed" => Ok(Self::RevisionNeeded),
            "done" => Ok(Self::Done),
            other => Err(AssignmentError::UnknownStatus(other.to_string())),
        }
    }

    #[must_use]
    pub fn is_done(self) -> bool {
        matches!(self, ProgressStatus::Done)
    }
}

//
// ─── ASSIGNMENT ────────────────────────────────────────────────────────────────
//

/// A learner's enrollment in a program.
///
/// Created lazily: at most one active assignment per (employee, program)
/// pair, looked up by most-recent id before creating a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: AssignmentId,
    pub employee_id: EmployeeId,
    pub program_id: ProgramId,
    pub status: ProgressStatus,
    pub assigned_at: DateTime<Utc>,
}

/// The learner's per-page progress record within an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPage {
    pub id: AssignmentPageId,
    pub assignment_id: AssignmentId,
    pub page_id: PageId,
    pub page_version_id: Option<PageVersionId>,
    pub status: ProgressStatus,
    pub score: Option<u32>,
}
