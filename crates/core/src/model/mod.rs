mod assignment;
pub mod content;
mod employee;
mod ids;
mod page;
mod program;
mod submission;

pub use content::{RichText, RichTextDraft, RichTextError};
pub use ids::{
    AssignmentId, AssignmentPageId, CategoryId, CommentId, EmployeeId, PageId, PageVersionId,
    ProgramId, SubmissionId,
};

pub use assignment::{Assignment, AssignmentError, AssignmentPage, ProgressStatus};
pub use employee::Employee;
pub use page::{Category, Page, PageError, PageKind, PageVersion, ProgramPage};
pub use program::{Program, ProgramError};
pub use submission::{Comment, CommentError, Submission, SubmissionError};
