use chrono::{DateTime, Utc};

use academy_core::model::{Category, CategoryId, Page, PageId, PageVersion, PageVersionId, RichText};

use super::SqliteRepository;
use super::mapping::{decode_content, encode_image_urls, id_to_i64, map_page_row, page_id_from_i64, ser};
use crate::repository::{NewPageRecord, PageRepository, StorageError};

#[async_trait::async_trait]
impl PageRepository for SqliteRepository {
    async fn insert_page(&self, record: NewPageRecord) -> Result<PageId, StorageError> {
        let image_urls = encode_image_urls(&record.content)?;
        let result = sqlx::query(
            r"
            INSERT INTO academy_pages (title, kind, category_id, body, image_urls, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(record.title)
        .bind(record.kind.as_str())
        .bind(
            record
                .category_id
                .map(|c| id_to_i64("category_id", c.value()))
                .transpose()?,
        )
        .bind(record.content.body().to_owned())
        .bind(image_urls)
        .bind(record.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        page_id_from_i64(result.last_insert_rowid())
    }

    async fn get_page(&self, id: PageId) -> Result<Option<Page>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, kind, category_id, body, image_urls, created_at
            FROM academy_pages
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("page_id", id.value())?)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| map_page_row(&r)).transpose()
    }

    async fn list_pages(&self, limit: u32) -> Result<Vec<Page>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, kind, category_id, body, image_urls, created_at
            FROM academy_pages
            ORDER BY id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_page_row).collect()
    }

    async fn update_page_content(
        &self,
        id: PageId,
        content: RichText,
    ) -> Result<(), StorageError> {
        let image_urls = encode_image_urls(&content)?;
        let result = sqlx::query(
            "UPDATE academy_pages SET body = ?2, image_urls = ?3 WHERE id = ?1",
        )
        .bind(id_to_i64("page_id", id.value())?)
        .bind(content.body().to_owned())
        .bind(image_urls)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_page(&self, id: PageId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM academy_pages WHERE id = ?1")
            .bind(id_to_i64("page_id", id.value())?)
            .execute(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn insert_category(&self, name: String) -> Result<CategoryId, StorageError> {
        let result = sqlx::query("INSERT INTO academy_page_categories (name) VALUES (?1)")
            .bind(name)
            .execute(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let raw = u64::try_from(result.last_insert_rowid())
            .map_err(|_| StorageError::Serialization("category_id sign overflow".into()))?;
        Ok(CategoryId::new(raw))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let rows = sqlx::query("SELECT id, name FROM academy_page_categories ORDER BY id ASC")
            .fetch_all(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter()
            .map(|row| {
                use sqlx::Row;
                let id_i64: i64 = row.try_get("id").map_err(ser)?;
                let raw = u64::try_from(id_i64)
                    .map_err(|_| StorageError::Serialization("category_id sign overflow".into()))?;
                Ok(Category {
                    id: CategoryId::new(raw),
                    name: row.try_get("name").map_err(ser)?,
                })
            })
            .collect()
    }

    async fn snapshot_version(
        &self,
        page_id: PageId,
        content: RichText,
        captured_at: DateTime<Utc>,
    ) -> Result<PageVersionId, StorageError> {
        let image_urls = encode_image_urls(&content)?;
        let result = sqlx::query(
            r"
            INSERT INTO academy_page_versions (page_id, body, image_urls, captured_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(id_to_i64("page_id", page_id.value())?)
        .bind(content.body().to_owned())
        .bind(image_urls)
        .bind(captured_at)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let raw = u64::try_from(result.last_insert_rowid())
            .map_err(|_| StorageError::Serialization("page_version_id sign overflow".into()))?;
        Ok(PageVersionId::new(raw))
    }

    async fn latest_version(
        &self,
        page_id: PageId,
    ) -> Result<Option<PageVersion>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, page_id, body, image_urls, captured_at
            FROM academy_page_versions
            WHERE page_id = ?1
            ORDER BY id DESC
            LIMIT 1
            ",
        )
        .bind(id_to_i64("page_id", page_id.value())?)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| {
            use sqlx::Row;
            let id_i64: i64 = r.try_get("id").map_err(ser)?;
            let raw = u64::try_from(id_i64)
                .map_err(|_| StorageError::Serialization("page_version_id sign overflow".into()))?;
            let content = decode_content(
                r.try_get::<String, _>("body").map_err(ser)?,
                &r.try_get::<String, _>("image_urls").map_err(ser)?,
            )?;
            Ok(PageVersion {
                id: PageVersionId::new(raw),
                page_id: page_id_from_i64(r.try_get("page_id").map_err(ser)?)?,
                content,
                captured_at: r.try_get("captured_at").map_err(ser)?,
            })
        })
        .transpose()
    }
}
