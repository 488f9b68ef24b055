use academy_core::model::{Employee, EmployeeId};

use super::SqliteRepository;
use super::mapping::{employee_id_from_i64, id_to_i64, map_employee_row};
use crate::repository::{EmployeeRepository, StorageError};

#[async_trait::async_trait]
impl EmployeeRepository for SqliteRepository {
    async fn insert_employee(
        &self,
        full_name: String,
        email: String,
    ) -> Result<EmployeeId, StorageError> {
        let result = sqlx::query("INSERT INTO employees (full_name, email) VALUES (?1, ?2)")
            .bind(full_name)
            .bind(email)
            .execute(self.pool())
            .await;

        match result {
            Ok(done) => employee_id_from_i64(done.last_insert_rowid()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StorageError::Conflict)
            }
            Err(e) => Err(StorageError::Connection(e.to_string())),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StorageError> {
        let row = sqlx::query(
            "SELECT id, full_name, email FROM employees WHERE email = ?1 COLLATE NOCASE",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| map_employee_row(&r)).transpose()
    }

    async fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>, StorageError> {
        let row = sqlx::query("SELECT id, full_name, email FROM employees WHERE id = ?1")
            .bind(id_to_i64("employee_id", id.value())?)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| map_employee_row(&r)).transpose()
    }
}
