use std::sync::Arc;

use academy_storage::repository::Storage;

use crate::Clock;
use crate::assignment_service::AssignmentService;
use crate::error::AcademyServicesError;
use crate::program_service::ProgramService;
use crate::session::SessionContext;
use crate::submission_service::SubmissionService;
use crate::upload_service::UploadService;

/// Assembles the academy services over one storage backend.
#[derive(Clone)]
pub struct AcademyServices {
    storage: Storage,
    programs: Arc<ProgramService>,
    assignments: Arc<AssignmentService>,
    submissions: Arc<SubmissionService>,
    uploads: Arc<UploadService>,
}

impl AcademyServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AcademyServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AcademyServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::over(storage, clock))
    }

    /// Build services over in-memory storage, for tests and prototyping.
    #[must_use]
    pub fn new_in_memory(clock: Clock) -> Self {
        Self::over(Storage::in_memory(), clock)
    }

    fn over(storage: Storage, clock: Clock) -> Self {
        let programs = Arc::new(ProgramService::new(
            clock,
            Arc::clone(&storage.programs),
            Arc::clone(&storage.pages),
        ));
        let assignments = Arc::new(AssignmentService::new(
            clock,
            Arc::clone(&storage.assignments),
            Arc::clone(&storage.programs),
            Arc::clone(&storage.pages),
        ));
        let submissions = Arc::new(SubmissionService::new(
            clock,
            Arc::clone(&storage.submissions),
            Arc::clone(&storage.comments),
        ));
        let uploads = Arc::new(UploadService::from_env());
        Self {
            storage,
            programs,
            assignments,
            submissions,
            uploads,
        }
    }

    /// Resolve the acting employee from the session email.
    ///
    /// # Errors
    ///
    /// Returns `AcademyServicesError::Session` when the email matches no
    /// employee row.
    pub async fn session(&self, email: &str) -> Result<SessionContext, AcademyServicesError> {
        Ok(SessionContext::resolve(email, &self.storage.employees).await?)
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn programs(&self) -> Arc<ProgramService> {
        Arc::clone(&self.programs)
    }

    #[must_use]
    pub fn assignments(&self) -> Arc<AssignmentService> {
        Arc::clone(&self.assignments)
    }

    #[must_use]
    pub fn submissions(&self) -> Arc<SubmissionService> {
        Arc::clone(&self.submissions)
    }

    #[must_use]
    pub fn uploads(&self) -> Arc<UploadService> {
        Arc::clone(&self.uploads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::time::fixed_clock;

    #[tokio::test]
    async fn unknown_session_email_surfaces_as_session_error() {
        let services = AcademyServices::new_in_memory(fixed_clock());
        let err = services.session("nobody@quitcode.dev").await.unwrap_err();
        assert!(matches!(err, AcademyServicesError::Session(_)));
    }

    #[tokio::test]
    async fn session_resolves_after_employee_insert() {
        let services = AcademyServices::new_in_memory(fixed_clock());
        services
            .storage()
            .employees
            .insert_employee("Dana Ivers".into(), "dana@quitcode.dev".into())
            .await
            .unwrap();
        let ctx = services.session("Dana@QuitCode.dev").await.unwrap();
        assert_eq!(ctx.employee().full_name, "Dana Ivers");
    }
}
