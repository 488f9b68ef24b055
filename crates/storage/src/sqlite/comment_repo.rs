use academy_core::model::{AssignmentPageId, Comment, CommentId};

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_comment_row};
use crate::repository::{CommentRepository, NewCommentRecord, StorageError};

#[async_trait::async_trait]
impl CommentRepository for SqliteRepository {
    async fn insert_comment(&self, record: NewCommentRecord) -> Result<CommentId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO academy_task_comments (assignment_page_id, author_id, body, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(id_to_i64("assignment_page_id", record.assignment_page_id.value())?)
        .bind(id_to_i64("author_id", record.author_id.value())?)
        .bind(record.body)
        .bind(record.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let raw = u64::try_from(result.last_insert_rowid())
            .map_err(|_| StorageError::Serialization("comment_id sign overflow".into()))?;
        Ok(CommentId::new(raw))
    }

    async fn list_comments(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Vec<Comment>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, assignment_page_id, author_id, body, created_at
            FROM academy_task_comments
            WHERE assignment_page_id = ?1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(id_to_i64("assignment_page_id", assignment_page_id.value())?)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_comment_row).collect()
    }
}
