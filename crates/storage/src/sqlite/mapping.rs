use academy_core::model::{
    Assignment, AssignmentId, AssignmentPage, AssignmentPageId, CategoryId, CommentId, Employee,
    EmployeeId, Page, PageId, PageKind, PageVersionId, Program, ProgramId, ProgramPage,
    ProgressStatus, RichText, Submission, SubmissionId,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn program_id_from_i64(v: i64) -> Result<ProgramId, StorageError> {
    Ok(ProgramId::new(i64_to_u64("program_id", v)?))
}

pub(crate) fn page_id_from_i64(v: i64) -> Result<PageId, StorageError> {
    Ok(PageId::new(i64_to_u64("page_id", v)?))
}

pub(crate) fn assignment_id_from_i64(v: i64) -> Result<AssignmentId, StorageError> {
    Ok(AssignmentId::new(i64_to_u64("assignment_id", v)?))
}

pub(crate) fn assignment_page_id_from_i64(v: i64) -> Result<AssignmentPageId, StorageError> {
    Ok(AssignmentPageId::new(i64_to_u64("assignment_page_id", v)?))
}

pub(crate) fn employee_id_from_i64(v: i64) -> Result<EmployeeId, StorageError> {
    Ok(EmployeeId::new(i64_to_u64("employee_id", v)?))
}

pub(crate) fn parse_status(s: &str) -> Result<ProgressStatus, StorageError> {
    ProgressStatus::parse(s).map_err(ser)
}

/// Image URL lists are persisted as a JSON array of strings.
pub(crate) fn encode_image_urls(content: &RichText) -> Result<String, StorageError> {
    let urls: Vec<&str> = content.images().iter().map(|u| u.as_str()).collect();
    serde_json::to_string(&urls).map_err(ser)
}

pub(crate) fn decode_content(body: String, image_urls: &str) -> Result<RichText, StorageError> {
    let urls: Vec<String> = serde_json::from_str(image_urls).map_err(ser)?;
    RichText::from_persisted(body, urls).map_err(ser)
}

pub(crate) fn map_program_row(row: &sqlx::sqlite::SqliteRow) -> Result<Program, StorageError> {
    let id = program_id_from_i64(row.try_get("id").map_err(ser)?)?;
    Program::new(
        id,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_page_row(row: &sqlx::sqlite::SqliteRow) -> Result<Page, StorageError> {
    let id = page_id_from_i64(row.try_get("id").map_err(ser)?)?;
    let kind_str: String = row.try_get("kind").map_err(ser)?;
    let kind = PageKind::parse(&kind_str).map_err(ser)?;
    let category_id = row
        .try_get::<Option<i64>, _>("category_id")
        .map_err(ser)?
        .map(|v| i64_to_u64("category_id", v).map(CategoryId::new))
        .transpose()?;
    let content = decode_content(
        row.try_get::<String, _>("body").map_err(ser)?,
        &row.try_get::<String, _>("image_urls").map_err(ser)?,
    )?;

    Page::new(
        id,
        row.try_get::<String, _>("title").map_err(ser)?,
        kind,
        category_id,
        content,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_program_page_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgramPage, StorageError> {
    let order_index_i64: i64 = row.try_get("order_index").map_err(ser)?;
    let order_index = u32::try_from(order_index_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid order_index: {order_index_i64}")))?;
    Ok(ProgramPage {
        program_id: program_id_from_i64(row.try_get("program_id").map_err(ser)?)?,
        page_id: page_id_from_i64(row.try_get("page_id").map_err(ser)?)?,
        order_index,
        is_required: row.try_get::<i64, _>("is_required").map_err(ser)? != 0,
    })
}

pub(crate) fn map_assignment_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<Assignment, StorageError> {
    let status_str: String = row.try_get("status").map_err(ser)?;
    Ok(Assignment {
        id: assignment_id_from_i64(row.try_get("id").map_err(ser)?)?,
        employee_id: employee_id_from_i64(row.try_get("employee_id").map_err(ser)?)?,
        program_id: program_id_from_i64(row.try_get("program_id").map_err(ser)?)?,
        status: parse_status(&status_str)?,
        assigned_at: row.try_get("assigned_at").map_err(ser)?,
    })
}

pub(crate) fn map_assignment_page_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<AssignmentPage, StorageError> {
    let status_str: String = row.try_get("status").map_err(ser)?;
    let page_version_id = row
        .try_get::<Option<i64>, _>("page_version_id")
        .map_err(ser)?
        .map(|v| i64_to_u64("page_version_id", v).map(PageVersionId::new))
        .transpose()?;
    let score = row
        .try_get::<Option<i64>, _>("score")
        .map_err(ser)?
        .map(|v| {
            u32::try_from(v)
                .map_err(|_| StorageError::Serialization(format!("invalid score: {v}")))
        })
        .transpose()?;
    Ok(AssignmentPage {
        id: assignment_page_id_from_i64(row.try_get("id").map_err(ser)?)?,
        assignment_id: assignment_id_from_i64(row.try_get("assignment_id").map_err(ser)?)?,
        page_id: page_id_from_i64(row.try_get("page_id").map_err(ser)?)?,
        page_version_id,
        status: parse_status(&status_str)?,
        score,
    })
}

pub(crate) fn map_submission_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<Submission, StorageError> {
    let id = SubmissionId::new(i64_to_u64("submission_id", row.try_get("id").map_err(ser)?)?);
    Submission::new(
        id,
        assignment_page_id_from_i64(row.try_get("assignment_page_id").map_err(ser)?)?,
        row.try_get::<String, _>("body").map_err(ser)?,
        row.try_get("submitted_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_comment_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<academy_core::model::Comment, StorageError> {
    let id = CommentId::new(i64_to_u64("comment_id", row.try_get("id").map_err(ser)?)?);
    academy_core::model::Comment::new(
        id,
        assignment_page_id_from_i64(row.try_get("assignment_page_id").map_err(ser)?)?,
        employee_id_from_i64(row.try_get("author_id").map_err(ser)?)?,
        row.try_get::<String, _>("body").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_employee_row(row: &sqlx::sqlite::SqliteRow) -> Result<Employee, StorageError> {
    Ok(Employee {
        id: employee_id_from_i64(row.try_get("id").map_err(ser)?)?,
        full_name: row.try_get("full_name").map_err(ser)?,
        email: row.try_get("email").map_err(ser)?,
    })
}
