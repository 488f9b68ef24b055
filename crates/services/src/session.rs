use std::sync::Arc;

use academy_core::model::{Employee, EmployeeId};
use academy_storage::repository::EmployeeRepository;

use crate::error::SessionError;

/// Session-scoped actor identity.
///
/// The hosted auth layer yields a user email; the matching employee row is
/// resolved once when the context is built and then passed explicitly to
/// whatever needs it, instead of being re-fetched per view.
#[derive(Clone, Debug)]
pub struct SessionContext {
    employee: Employee,
}

impl SessionContext {
    /// Resolve the session email to an employee record.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownEmployee` when no employee row matches,
    /// or `SessionError::Storage` on repository failures.
    pub async fn resolve(
        email: &str,
        employees: &Arc<dyn EmployeeRepository>,
    ) -> Result<Self, SessionError> {
        let employee = employees
            .find_by_email(email)
            .await?
            .ok_or_else(|| SessionError::UnknownEmployee(email.to_string()))?;
        Ok(Self { employee })
    }

    #[must_use]
    pub fn employee(&self) -> &Employee {
        &self.employee
    }

    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.employee.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn resolves_employee_by_email_once() {
        let repo = InMemoryRepository::new();
        repo.insert_employee("Dana Ivers".into(), "dana@quitcode.dev".into())
            .await
            .unwrap();
        let employees: Arc<dyn EmployeeRepository> = Arc::new(repo);

        let ctx = SessionContext::resolve("dana@quitcode.dev", &employees)
            .await
            .unwrap();
        assert_eq!(ctx.employee().full_name, "Dana Ivers");
    }

    #[tokio::test]
    async fn unknown_email_is_an_error() {
        let repo = InMemoryRepository::new();
        let employees: Arc<dyn EmployeeRepository> = Arc::new(repo);

        let err = SessionContext::resolve("ghost@quitcode.dev", &employees)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownEmployee(_)));
    }
}
