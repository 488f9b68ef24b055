use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::content::RichText;
use crate::model::ids::{CategoryId, PageId, PageVersionId, ProgramId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PageError {
    #[error("page title cannot be empty")]
    EmptyTitle,

    #[error("unknown page kind: {0}")]
    UnknownKind(String),
}

//
// ─── PAGE KIND ─────────────────────────────────────────────────────────────────
//

/// What a page asks of the learner.
///
/// - `Theory`: reading material, no answer expected
/// - `Task`: expects a free-text submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Theory,
    Task,
}

impl PageKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Theory => "THEORY",
            PageKind::Task => "TASK",
        }
    }

    /// Parses the persisted representation.
    ///
    /// # Errors
    ///
    /// Returns `PageError::UnknownKind` for anything but `THEORY`/`TASK`.
    pub fn parse(s: &str) -> Result<Self, PageError> {
        match s {
            "THEORY" => Ok(Self::Theory),
            "TASK" => Ok(Self::Task),
            other => Err(PageError::UnknownKind(other.to_string())),
        }
    }
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Optional grouping for pages on the settings surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

//
// ─── PAGE ──────────────────────────────────────────────────────────────────────
//

/// A unit of content (theory or task), optionally categorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    id: PageId,
    title: String,
    kind: PageKind,
    category_id: Option<CategoryId>,
    content: RichText,
    created_at: DateTime<Utc>,
}

impl Page {
    /// Creates a page, validating the title.
    ///
    /// # Errors
    ///
    /// Returns `PageError::EmptyTitle` if the title is blank.
    pub fn new(
        id: PageId,
        title: impl Into<String>,
        kind: PageKind,
        category_id: Option<CategoryId>,
        content: RichText,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PageError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(PageError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            kind,
            category_id,
            content,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> PageId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    #[must_use]
    pub fn content(&self) -> &RichText {
        &self.content
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── PROGRAM PAGE ──────────────────────────────────────────────────────────────
//

/// Join row fixing a page's position within a program.
///
/// Invariant: after any completed reorder, the `order_index` values of a
/// program's rows form the dense sequence `0..n` with no duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramPage {
    pub program_id: ProgramId,
    pub page_id: PageId,
    pub order_index: u32,
    pub is_required: bool,
}

//
// ─── PAGE VERSION ──────────────────────────────────────────────────────────────
//

/// Snapshot of a page's content at a point in time.
///
/// Assignments pin the version current at assignment time so later edits do
/// not rewrite what a learner was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageVersion {
    pub id: PageVersionId,
    pub page_id: PageId,
    pub content: RichText,
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::RichTextDraft;
    use crate::time::fixed_now;

    #[test]
    fn page_kind_round_trips() {
        assert_eq!(PageKind::parse("THEORY").unwrap(), PageKind::Theory);
        assert_eq!(PageKind::parse(PageKind::Task.as_str()).unwrap(), PageKind::Task);
        assert!(matches!(
            PageKind::parse("quiz").unwrap_err(),
            PageError::UnknownKind(_)
        ));
    }

    #[test]
    fn blank_title_is_rejected() {
        let content = RichTextDraft::text_only("body").validate().unwrap();
        let err = Page::new(
            PageId::new(1),
            " ",
            PageKind::Theory,
            None,
            content,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, PageError::EmptyTitle);
    }
}
