use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full academy schema: programs, pages, categories, the
/// program-page order join, versions, assignments, assignment pages,
/// submissions, comments, the employee directory, and indexes. Table names
/// match the hosted backend's so exported data maps one-to-one.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS employees (
                    id INTEGER PRIMARY KEY,
                    full_name TEXT NOT NULL,
                    email TEXT NOT NULL COLLATE NOCASE UNIQUE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS academy_programs (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT,
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS academy_page_categories (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS academy_pages (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    kind TEXT NOT NULL CHECK (kind IN ('THEORY', 'TASK')),
                    category_id INTEGER,
                    body TEXT NOT NULL,
                    image_urls TEXT NOT NULL DEFAULT '[]',
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (category_id) REFERENCES academy_page_categories(id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS academy_program_pages (
                    program_id INTEGER NOT NULL,
                    page_id INTEGER NOT NULL,
                    order_index INTEGER NOT NULL CHECK (order_index >= 0),
                    is_required INTEGER NOT NULL,
                    PRIMARY KEY (program_id, page_id),
                    FOREIGN KEY (program_id) REFERENCES academy_programs(id) ON DELETE CASCADE,
                    FOREIGN KEY (page_id) REFERENCES academy_pages(id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS academy_page_versions (
                    id INTEGER PRIMARY KEY,
                    page_id INTEGER NOT NULL,
                    body TEXT NOT NULL,
                    image_urls TEXT NOT NULL DEFAULT '[]',
                    captured_at TEXT NOT NULL,
                    FOREIGN KEY (page_id) REFERENCES academy_pages(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS academy_assignments (
                    id INTEGER PRIMARY KEY,
                    employee_id INTEGER NOT NULL,
                    program_id INTEGER NOT NULL,
                    status TEXT NOT NULL,
                    assigned_at TEXT NOT NULL,
                    FOREIGN KEY (employee_id) REFERENCES employees(id),
                    FOREIGN KEY (program_id) REFERENCES academy_programs(id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS academy_assignment_pages (
                    id INTEGER PRIMARY KEY,
                    assignment_id INTEGER NOT NULL,
                    page_id INTEGER NOT NULL,
                    page_version_id INTEGER,
                    status TEXT NOT NULL,
                    score INTEGER,
                    FOREIGN KEY (assignment_id) REFERENCES academy_assignments(id) ON DELETE CASCADE,
                    FOREIGN KEY (page_id) REFERENCES academy_pages(id),
                    FOREIGN KEY (page_version_id) REFERENCES academy_page_versions(id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS academy_task_submissions (
                    id INTEGER PRIMARY KEY,
                    assignment_page_id INTEGER NOT NULL,
                    body TEXT NOT NULL,
                    submitted_at TEXT NOT NULL,
                    FOREIGN KEY (assignment_page_id) REFERENCES academy_assignment_pages(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS academy_task_comments (
                    id INTEGER PRIMARY KEY,
                    assignment_page_id INTEGER NOT NULL,
                    author_id INTEGER NOT NULL,
                    body TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (assignment_page_id) REFERENCES academy_assignment_pages(id) ON DELETE CASCADE,
                    FOREIGN KEY (author_id) REFERENCES employees(id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_program_pages_order
                    ON academy_program_pages(program_id, order_index);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_assignments_pair
                    ON academy_assignments(employee_id, program_id, id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_assignment_pages_assignment
                    ON academy_assignment_pages(assignment_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_submissions_page_time
                    ON academy_task_submissions(assignment_page_id, submitted_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_comments_page_time
                    ON academy_task_comments(assignment_page_id, created_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(1_i64)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}
