use std::collections::HashSet;

use academy_core::model::{
    Assignment, AssignmentId, AssignmentPage, AssignmentPageId, EmployeeId, PageId, ProgramId,
    ProgressStatus,
};

use super::SqliteRepository;
use super::mapping::{
    assignment_id_from_i64, assignment_page_id_from_i64, id_to_i64, map_assignment_page_row,
    map_assignment_row, page_id_from_i64, ser,
};
use crate::repository::{
    AssignmentRepository, NewAssignmentPageRecord, NewAssignmentRecord, StorageError,
};

#[async_trait::async_trait]
impl AssignmentRepository for SqliteRepository {
    async fn latest_assignment(
        &self,
        employee_id: EmployeeId,
        program_id: ProgramId,
    ) -> Result<Option<Assignment>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, employee_id, program_id, status, assigned_at
            FROM academy_assignments
            WHERE employee_id = ?1 AND program_id = ?2
            ORDER BY id DESC
            LIMIT 1
            ",
        )
        .bind(id_to_i64("employee_id", employee_id.value())?)
        .bind(id_to_i64("program_id", program_id.value())?)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| map_assignment_row(&r)).transpose()
    }

    async fn insert_assignment(
        &self,
        record: NewAssignmentRecord,
    ) -> Result<AssignmentId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO academy_assignments (employee_id, program_id, status, assigned_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(id_to_i64("employee_id", record.employee_id.value())?)
        .bind(id_to_i64("program_id", record.program_id.value())?)
        .bind(record.status.as_str())
        .bind(record.assigned_at)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        assignment_id_from_i64(result.last_insert_rowid())
    }

    async fn assigned_page_ids(
        &self,
        employee_id: EmployeeId,
        program_id: ProgramId,
    ) -> Result<HashSet<PageId>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT ap.page_id
            FROM academy_assignment_pages ap
            JOIN academy_assignments a ON a.id = ap.assignment_id
            WHERE a.employee_id = ?1 AND a.program_id = ?2
            ",
        )
        .bind(id_to_i64("employee_id", employee_id.value())?)
        .bind(id_to_i64("program_id", program_id.value())?)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut ids = HashSet::with_capacity(rows.len());
        for row in rows {
            use sqlx::Row;
            ids.insert(page_id_from_i64(row.try_get("page_id").map_err(ser)?)?);
        }
        Ok(ids)
    }

    async fn insert_assignment_page(
        &self,
        record: NewAssignmentPageRecord,
    ) -> Result<AssignmentPageId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO academy_assignment_pages
                (assignment_id, page_id, page_version_id, status, score)
            VALUES (?1, ?2, ?3, ?4, NULL)
            ",
        )
        .bind(id_to_i64("assignment_id", record.assignment_id.value())?)
        .bind(id_to_i64("page_id", record.page_id.value())?)
        .bind(
            record
                .page_version_id
                .map(|v| id_to_i64("page_version_id", v.value()))
                .transpose()?,
        )
        .bind(record.status.as_str())
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        assignment_page_id_from_i64(result.last_insert_rowid())
    }

    async fn get_assignment_page(
        &self,
        id: AssignmentPageId,
    ) -> Result<Option<AssignmentPage>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, assignment_id, page_id, page_version_id, status, score
            FROM academy_assignment_pages
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("assignment_page_id", id.value())?)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| map_assignment_page_row(&r)).transpose()
    }

    async fn list_assignment_pages(
        &self,
        assignment_id: AssignmentId,
    ) -> Result<Vec<AssignmentPage>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, assignment_id, page_id, page_version_id, status, score
            FROM academy_assignment_pages
            WHERE assignment_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("assignment_id", assignment_id.value())?)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_assignment_page_row).collect()
    }

    async fn set_page_status(
        &self,
        id: AssignmentPageId,
        status: ProgressStatus,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE academy_assignment_pages SET status = ?2 WHERE id = ?1")
            .bind(id_to_i64("assignment_page_id", id.value())?)
            .bind(status.as_str())
            .execute(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn set_page_score(
        &self,
        id: AssignmentPageId,
        score: Option<u32>,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE academy_assignment_pages SET score = ?2 WHERE id = ?1")
            .bind(id_to_i64("assignment_page_id", id.value())?)
            .bind(score.map(i64::from))
            .execute(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
