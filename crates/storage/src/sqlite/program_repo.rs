use academy_core::model::{PageId, Program, ProgramId, ProgramPage};

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_program_page_row, map_program_row, program_id_from_i64};
use crate::repository::{NewProgramRecord, ProgramRepository, StorageError};

#[async_trait::async_trait]
impl ProgramRepository for SqliteRepository {
    async fn insert_program(&self, record: NewProgramRecord) -> Result<ProgramId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO academy_programs (name, description, created_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(record.name)
        .bind(record.description)
        .bind(record.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        program_id_from_i64(result.last_insert_rowid())
    }

    async fn get_program(&self, id: ProgramId) -> Result<Option<Program>, StorageError> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at FROM academy_programs WHERE id = ?1",
        )
        .bind(id_to_i64("program_id", id.value())?)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| map_program_row(&r)).transpose()
    }

    async fn list_programs(&self, limit: u32) -> Result<Vec<Program>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, created_at
            FROM academy_programs
            ORDER BY id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_program_row).collect()
    }

    async fn update_program(
        &self,
        id: ProgramId,
        name: String,
        description: Option<String>,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            UPDATE academy_programs
            SET name = ?2, description = ?3
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("program_id", id.value())?)
        .bind(name)
        .bind(description)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn attach_page(&self, row: ProgramPage) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO academy_program_pages (program_id, page_id, order_index, is_required)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(id_to_i64("program_id", row.program_id.value())?)
        .bind(id_to_i64("page_id", row.page_id.value())?)
        .bind(i64::from(row.order_index))
        .bind(i64::from(row.is_required))
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StorageError::Conflict)
            }
            Err(e) => Err(StorageError::Connection(e.to_string())),
        }
    }

    async fn set_required(
        &self,
        program_id: ProgramId,
        page_id: PageId,
        is_required: bool,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            UPDATE academy_program_pages
            SET is_required = ?3
            WHERE program_id = ?1 AND page_id = ?2
            ",
        )
        .bind(id_to_i64("program_id", program_id.value())?)
        .bind(id_to_i64("page_id", page_id.value())?)
        .bind(i64::from(is_required))
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn set_order_index(
        &self,
        program_id: ProgramId,
        page_id: PageId,
        order_index: u32,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            UPDATE academy_program_pages
            SET order_index = ?3
            WHERE program_id = ?1 AND page_id = ?2
            ",
        )
        .bind(id_to_i64("program_id", program_id.value())?)
        .bind(id_to_i64("page_id", page_id.value())?)
        .bind(i64::from(order_index))
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_program_pages(
        &self,
        program_id: ProgramId,
    ) -> Result<Vec<ProgramPage>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT program_id, page_id, order_index, is_required
            FROM academy_program_pages
            WHERE program_id = ?1
            ORDER BY order_index ASC, page_id ASC
            ",
        )
        .bind(id_to_i64("program_id", program_id.value())?)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_program_page_row).collect()
    }

    async fn detach_page_everywhere(&self, page_id: PageId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM academy_program_pages WHERE page_id = ?1")
            .bind(id_to_i64("page_id", page_id.value())?)
            .execute(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
