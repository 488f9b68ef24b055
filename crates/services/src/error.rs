//! Shared error types for the services crate.

use thiserror::Error;

use academy_core::model::{
    AssignmentError, CommentError, PageError, ProgramError, RichTextError, SubmissionError,
};
use academy_storage::repository::StorageError;
use academy_storage::sqlite::SqliteInitError;

/// Errors emitted while resolving the session's employee.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no employee record matches session email {0}")]
    UnknownEmployee(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgramService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgramServiceError {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Content(#[from] RichTextError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AssignmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssignmentServiceError {
    #[error("no pages were selected for assignment")]
    NoPagesRequested,
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SubmissionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmissionServiceError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Comment(#[from] CommentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `UploadService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UploadError {
    #[error("uploads are not configured")]
    Disabled,
    #[error("upload endpoint returned an empty URL")]
    EmptyUrl,
    #[error("upload request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping the academy services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AcademyServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
