use thiserror::Error;

use crate::model::{AssignmentError, CommentError, PageError, ProgramError, SubmissionError};
use crate::model::content::RichTextError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    RichText(#[from] RichTextError),
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Comment(#[from] CommentError),
}
