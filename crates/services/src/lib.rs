#![forbid(unsafe_code)]

//! Orchestration layer for the QuitCode academy: session context, program
//! and page administration, assignment workflow, optimistic editors, and
//! the upload client.

pub mod app_services;
pub mod assignment_service;
pub mod board;
pub mod error;
pub mod order_editor;
pub mod program_service;
pub mod session;
pub mod submission_service;
pub mod upload_service;

pub use academy_core::Clock;

pub use app_services::AcademyServices;
pub use assignment_service::{AssignOutcome, AssignmentService};
pub use board::StatusEditor;
pub use error::{
    AcademyServicesError, AssignmentServiceError, ProgramServiceError, SessionError,
    SubmissionServiceError, UploadError,
};
pub use order_editor::{PageOrderEditor, ReorderOutcome};
pub use program_service::ProgramService;
pub use session::SessionContext;
pub use submission_service::SubmissionService;
pub use upload_service::{UploadConfig, UploadService};
