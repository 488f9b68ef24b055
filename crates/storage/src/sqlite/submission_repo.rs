use academy_core::model::{AssignmentPageId, Submission, SubmissionId};

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_submission_row};
use crate::repository::{NewSubmissionRecord, StorageError, SubmissionRepository};

#[async_trait::async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn insert_submission(
        &self,
        record: NewSubmissionRecord,
    ) -> Result<SubmissionId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO academy_task_submissions (assignment_page_id, body, submitted_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(id_to_i64("assignment_page_id", record.assignment_page_id.value())?)
        .bind(record.body)
        .bind(record.submitted_at)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let raw = u64::try_from(result.last_insert_rowid())
            .map_err(|_| StorageError::Serialization("submission_id sign overflow".into()))?;
        Ok(SubmissionId::new(raw))
    }

    async fn latest_submission(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Option<Submission>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, assignment_page_id, body, submitted_at
            FROM academy_task_submissions
            WHERE assignment_page_id = ?1
            ORDER BY submitted_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(id_to_i64("assignment_page_id", assignment_page_id.value())?)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| map_submission_row(&r)).transpose()
    }

    async fn list_submissions(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Vec<Submission>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, assignment_page_id, body, submitted_at
            FROM academy_task_submissions
            WHERE assignment_page_id = ?1
            ORDER BY submitted_at DESC, id DESC
            ",
        )
        .bind(id_to_i64("assignment_page_id", assignment_page_id.value())?)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_submission_row).collect()
    }
}
