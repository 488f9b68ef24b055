use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use academy_core::model::{
    Assignment, AssignmentId, AssignmentPage, AssignmentPageId, Category, CategoryId, Comment,
    CommentId, Employee, EmployeeId, Page, PageId, PageKind, PageVersion, PageVersionId, Program,
    ProgramId, ProgramPage, ProgressStatus, RichText, Submission, SubmissionId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── INSERT RECORDS ────────────────────────────────────────────────────────────
//

/// Insert shape for a program; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewProgramRecord {
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a page; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewPageRecord {
    pub title: String,
    pub kind: PageKind,
    pub category_id: Option<CategoryId>,
    pub content: RichText,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for an assignment; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAssignmentRecord {
    pub employee_id: EmployeeId,
    pub program_id: ProgramId,
    pub status: ProgressStatus,
    pub assigned_at: DateTime<Utc>,
}

/// Insert shape for an assignment page; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAssignmentPageRecord {
    pub assignment_id: AssignmentId,
    pub page_id: PageId,
    pub page_version_id: Option<PageVersionId>,
    pub status: ProgressStatus,
}

/// Insert shape for a submission; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewSubmissionRecord {
    pub assignment_page_id: AssignmentPageId,
    pub body: String,
    pub submitted_at: DateTime<Utc>,
}

/// Insert shape for a comment; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCommentRecord {
    pub assignment_page_id: AssignmentPageId,
    pub author_id: EmployeeId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Programs and their page-order join rows.
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Persist a new program and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the program cannot be stored.
    async fn insert_program(&self, record: NewProgramRecord) -> Result<ProgramId, StorageError>;

    /// Fetch a program by id. Returns `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_program(&self, id: ProgramId) -> Result<Option<Program>, StorageError>;

    /// List programs ordered by id, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_programs(&self, limit: u32) -> Result<Vec<Program>, StorageError>;

    /// Replace a program's name and description.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the program does not exist.
    async fn update_program(
        &self,
        id: ProgramId,
        name: String,
        description: Option<String>,
    ) -> Result<(), StorageError>;

    /// Attach a page to a program at the given order index.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the page is already attached.
    async fn attach_page(&self, row: ProgramPage) -> Result<(), StorageError>;

    /// Update the required flag on a join row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the join row does not exist.
    async fn set_required(
        &self,
        program_id: ProgramId,
        page_id: PageId,
        is_required: bool,
    ) -> Result<(), StorageError>;

    /// Update a single join row's order index, keyed by page id.
    ///
    /// Called once per row when persisting a reorder; each call is
    /// independent and the completion order is irrelevant.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the join row does not exist.
    async fn set_order_index(
        &self,
        program_id: ProgramId,
        page_id: PageId,
        order_index: u32,
    ) -> Result<(), StorageError>;

    /// Canonical page order for a program: join rows sorted by order index.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_program_pages(
        &self,
        program_id: ProgramId,
    ) -> Result<Vec<ProgramPage>, StorageError>;

    /// Delete every join row referencing the given page, across programs.
    ///
    /// Runs before the page itself is deleted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn detach_page_everywhere(&self, page_id: PageId) -> Result<(), StorageError>;
}

/// Pages, categories, and content version snapshots.
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Persist a new page and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the page cannot be stored.
    async fn insert_page(&self, record: NewPageRecord) -> Result<PageId, StorageError>;

    /// Fetch a page by id. Returns `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_page(&self, id: PageId) -> Result<Option<Page>, StorageError>;

    /// List pages ordered by id, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_pages(&self, limit: u32) -> Result<Vec<Page>, StorageError>;

    /// Replace a page's content body.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the page does not exist.
    async fn update_page_content(
        &self,
        id: PageId,
        content: RichText,
    ) -> Result<(), StorageError>;

    /// Delete a page row. Join rows must already be gone.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the page does not exist.
    async fn delete_page(&self, id: PageId) -> Result<(), StorageError>;

    /// Persist a new category and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the category cannot be stored.
    async fn insert_category(&self, name: String) -> Result<CategoryId, StorageError>;

    /// List all categories ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_categories(&self) -> Result<Vec<Category>, StorageError>;

    /// Snapshot a page's current content as a new version.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn snapshot_version(
        &self,
        page_id: PageId,
        content: RichText,
        captured_at: DateTime<Utc>,
    ) -> Result<PageVersionId, StorageError>;

    /// Most recent version snapshot for a page, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn latest_version(&self, page_id: PageId)
        -> Result<Option<PageVersion>, StorageError>;
}

/// Assignments and per-page progress records.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Most recent assignment for the (employee, program) pair, by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn latest_assignment(
        &self,
        employee_id: EmployeeId,
        program_id: ProgramId,
    ) -> Result<Option<Assignment>, StorageError>;

    /// Persist a new assignment and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the assignment cannot be stored.
    async fn insert_assignment(
        &self,
        record: NewAssignmentRecord,
    ) -> Result<AssignmentId, StorageError>;

    /// Page ids already assigned to the employee for this program, across
    /// all of the pair's assignments.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn assigned_page_ids(
        &self,
        employee_id: EmployeeId,
        program_id: ProgramId,
    ) -> Result<HashSet<PageId>, StorageError>;

    /// Persist a new assignment page and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_assignment_page(
        &self,
        record: NewAssignmentPageRecord,
    ) -> Result<AssignmentPageId, StorageError>;

    /// Fetch an assignment page by id. Returns `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_assignment_page(
        &self,
        id: AssignmentPageId,
    ) -> Result<Option<AssignmentPage>, StorageError>;

    /// All pages of an assignment, unordered; callers apply display order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_assignment_pages(
        &self,
        assignment_id: AssignmentId,
    ) -> Result<Vec<AssignmentPage>, StorageError>;

    /// Write a page's status. No transition guard; last write wins.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the row does not exist.
    async fn set_page_status(
        &self,
        id: AssignmentPageId,
        status: ProgressStatus,
    ) -> Result<(), StorageError>;

    /// Write a page's score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the row does not exist.
    async fn set_page_score(
        &self,
        id: AssignmentPageId,
        score: Option<u32>,
    ) -> Result<(), StorageError>;
}

/// Append-only task submissions.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Append a submission and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_submission(
        &self,
        record: NewSubmissionRecord,
    ) -> Result<SubmissionId, StorageError>;

    /// Most recent submission for an assignment page.
    ///
    /// Ordered by `submitted_at` descending, first row wins on ties.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn latest_submission(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Option<Submission>, StorageError>;

    /// Full submission history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_submissions(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Vec<Submission>, StorageError>;
}

/// Append-only comment threads.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Append a comment and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_comment(&self, record: NewCommentRecord) -> Result<CommentId, StorageError>;

    /// Comment thread for an assignment page, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_comments(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Vec<Comment>, StorageError>;
}

/// Team directory lookups.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Persist a new employee and return their id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_employee(
        &self,
        full_name: String,
        email: String,
    ) -> Result<EmployeeId, StorageError>;

    /// Resolve an employee from a session email. Returns `Ok(None)` when no
    /// row matches.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StorageError>;

    /// Fetch an employee by id. Returns `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>, StorageError>;
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates the academy repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub programs: Arc<dyn ProgramRepository>,
    pub pages: Arc<dyn PageRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            programs: Arc::new(repo.clone()),
            pages: Arc::new(repo.clone()),
            assignments: Arc::new(repo.clone()),
            submissions: Arc::new(repo.clone()),
            comments: Arc::new(repo.clone()),
            employees: Arc::new(repo),
        }
    }
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

#[derive(Default)]
struct InMemoryState {
    next_id: u64,
    programs: HashMap<ProgramId, Program>,
    pages: HashMap<PageId, Page>,
    program_pages: Vec<ProgramPage>,
    categories: Vec<Category>,
    versions: Vec<PageVersion>,
    assignments: HashMap<AssignmentId, Assignment>,
    assignment_pages: HashMap<AssignmentPageId, AssignmentPage>,
    submissions: Vec<Submission>,
    comments: Vec<Comment>,
    employees: HashMap<EmployeeId, Employee>,
}

impl InMemoryState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProgramRepository for InMemoryRepository {
    async fn insert_program(&self, record: NewProgramRecord) -> Result<ProgramId, StorageError> {
        let mut state = self.lock()?;
        let id = ProgramId::new(state.next_id());
        let program = Program::new(id, record.name, record.description, record.created_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.programs.insert(id, program);
        Ok(id)
    }

    async fn get_program(&self, id: ProgramId) -> Result<Option<Program>, StorageError> {
        Ok(self.lock()?.programs.get(&id).cloned())
    }

    async fn list_programs(&self, limit: u32) -> Result<Vec<Program>, StorageError> {
        let state = self.lock()?;
        let mut programs: Vec<Program> = state.programs.values().cloned().collect();
        programs.sort_by_key(Program::id);
        programs.truncate(limit as usize);
        Ok(programs)
    }

    async fn update_program(
        &self,
        id: ProgramId,
        name: String,
        description: Option<String>,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let existing = state.programs.get(&id).ok_or(StorageError::NotFound)?;
        let updated = Program::new(id, name, description, existing.created_at())
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.programs.insert(id, updated);
        Ok(())
    }

    async fn attach_page(&self, row: ProgramPage) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let exists = state
            .program_pages
            .iter()
            .any(|p| p.program_id == row.program_id && p.page_id == row.page_id);
        if exists {
            return Err(StorageError::Conflict);
        }
        state.program_pages.push(row);
        Ok(())
    }

    async fn set_required(
        &self,
        program_id: ProgramId,
        page_id: PageId,
        is_required: bool,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let row = state
            .program_pages
            .iter_mut()
            .find(|p| p.program_id == program_id && p.page_id == page_id)
            .ok_or(StorageError::NotFound)?;
        row.is_required = is_required;
        Ok(())
    }

    async fn set_order_index(
        &self,
        program_id: ProgramId,
        page_id: PageId,
        order_index: u32,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let row = state
            .program_pages
            .iter_mut()
            .find(|p| p.program_id == program_id && p.page_id == page_id)
            .ok_or(StorageError::NotFound)?;
        row.order_index = order_index;
        Ok(())
    }

    async fn list_program_pages(
        &self,
        program_id: ProgramId,
    ) -> Result<Vec<ProgramPage>, StorageError> {
        let state = self.lock()?;
        let mut rows: Vec<ProgramPage> = state
            .program_pages
            .iter()
            .filter(|p| p.program_id == program_id)
            .copied()
            .collect();
        rows.sort_by_key(|p| (p.order_index, p.page_id));
        Ok(rows)
    }

    async fn detach_page_everywhere(&self, page_id: PageId) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        state.program_pages.retain(|p| p.page_id != page_id);
        Ok(())
    }
}

#[async_trait]
impl PageRepository for InMemoryRepository {
    async fn insert_page(&self, record: NewPageRecord) -> Result<PageId, StorageError> {
        let mut state = self.lock()?;
        let id = PageId::new(state.next_id());
        let page = Page::new(
            id,
            record.title,
            record.kind,
            record.category_id,
            record.content,
            record.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.pages.insert(id, page);
        Ok(id)
    }

    async fn get_page(&self, id: PageId) -> Result<Option<Page>, StorageError> {
        Ok(self.lock()?.pages.get(&id).cloned())
    }

    async fn list_pages(&self, limit: u32) -> Result<Vec<Page>, StorageError> {
        let state = self.lock()?;
        let mut pages: Vec<Page> = state.pages.values().cloned().collect();
        pages.sort_by_key(Page::id);
        pages.truncate(limit as usize);
        Ok(pages)
    }

    async fn update_page_content(
        &self,
        id: PageId,
        content: RichText,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let page = state.pages.get(&id).ok_or(StorageError::NotFound)?;
        let updated = Page::new(
            page.id(),
            page.title(),
            page.kind(),
            page.category_id(),
            content,
            page.created_at(),
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.pages.insert(id, updated);
        Ok(())
    }

    async fn delete_page(&self, id: PageId) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        state.pages.remove(&id).ok_or(StorageError::NotFound)?;
        Ok(())
    }

    async fn insert_category(&self, name: String) -> Result<CategoryId, StorageError> {
        let mut state = self.lock()?;
        let id = CategoryId::new(state.next_id());
        state.categories.push(Category { id, name });
        Ok(id)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        Ok(self.lock()?.categories.clone())
    }

    async fn snapshot_version(
        &self,
        page_id: PageId,
        content: RichText,
        captured_at: DateTime<Utc>,
    ) -> Result<PageVersionId, StorageError> {
        let mut state = self.lock()?;
        let id = PageVersionId::new(state.next_id());
        state.versions.push(PageVersion {
            id,
            page_id,
            content,
            captured_at,
        });
        Ok(id)
    }

    async fn latest_version(
        &self,
        page_id: PageId,
    ) -> Result<Option<PageVersion>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .versions
            .iter()
            .filter(|v| v.page_id == page_id)
            .max_by_key(|v| v.id)
            .cloned())
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryRepository {
    async fn latest_assignment(
        &self,
        employee_id: EmployeeId,
        program_id: ProgramId,
    ) -> Result<Option<Assignment>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .assignments
            .values()
            .filter(|a| a.employee_id == employee_id && a.program_id == program_id)
            .max_by_key(|a| a.id)
            .cloned())
    }

    async fn insert_assignment(
        &self,
        record: NewAssignmentRecord,
    ) -> Result<AssignmentId, StorageError> {
        let mut state = self.lock()?;
        let id = AssignmentId::new(state.next_id());
        state.assignments.insert(
            id,
            Assignment {
                id,
                employee_id: record.employee_id,
                program_id: record.program_id,
                status: record.status,
                assigned_at: record.assigned_at,
            },
        );
        Ok(id)
    }

    async fn assigned_page_ids(
        &self,
        employee_id: EmployeeId,
        program_id: ProgramId,
    ) -> Result<HashSet<PageId>, StorageError> {
        let state = self.lock()?;
        let assignment_ids: HashSet<AssignmentId> = state
            .assignments
            .values()
            .filter(|a| a.employee_id == employee_id && a.program_id == program_id)
            .map(|a| a.id)
            .collect();
        Ok(state
            .assignment_pages
            .values()
            .filter(|p| assignment_ids.contains(&p.assignment_id))
            .map(|p| p.page_id)
            .collect())
    }

    async fn insert_assignment_page(
        &self,
        record: NewAssignmentPageRecord,
    ) -> Result<AssignmentPageId, StorageError> {
        let mut state = self.lock()?;
        let id = AssignmentPageId::new(state.next_id());
        state.assignment_pages.insert(
            id,
            AssignmentPage {
                id,
                assignment_id: record.assignment_id,
                page_id: record.page_id,
                page_version_id: record.page_version_id,
                status: record.status,
                score: None,
            },
        );
        Ok(id)
    }

    async fn get_assignment_page(
        &self,
        id: AssignmentPageId,
    ) -> Result<Option<AssignmentPage>, StorageError> {
        Ok(self.lock()?.assignment_pages.get(&id).cloned())
    }

    async fn list_assignment_pages(
        &self,
        assignment_id: AssignmentId,
    ) -> Result<Vec<AssignmentPage>, StorageError> {
        let state = self.lock()?;
        let mut pages: Vec<AssignmentPage> = state
            .assignment_pages
            .values()
            .filter(|p| p.assignment_id == assignment_id)
            .cloned()
            .collect();
        pages.sort_by_key(|p| p.id);
        Ok(pages)
    }

    async fn set_page_status(
        &self,
        id: AssignmentPageId,
        status: ProgressStatus,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let page = state
            .assignment_pages
            .get_mut(&id)
            .ok_or(StorageError::NotFound)?;
        page.status = status;
        Ok(())
    }

    async fn set_page_score(
        &self,
        id: AssignmentPageId,
        score: Option<u32>,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let page = state
            .assignment_pages
            .get_mut(&id)
            .ok_or(StorageError::NotFound)?;
        page.score = score;
        Ok(())
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryRepository {
    async fn insert_submission(
        &self,
        record: NewSubmissionRecord,
    ) -> Result<SubmissionId, StorageError> {
        let mut state = self.lock()?;
        let id = SubmissionId::new(state.next_id());
        let submission = Submission::new(
            id,
            record.assignment_page_id,
            record.body,
            record.submitted_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.submissions.push(submission);
        Ok(id)
    }

    async fn latest_submission(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Option<Submission>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .submissions
            .iter()
            .filter(|s| s.assignment_page_id == assignment_page_id)
            .max_by_key(|s| (s.submitted_at, s.id))
            .cloned())
    }

    async fn list_submissions(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Vec<Submission>, StorageError> {
        let state = self.lock()?;
        let mut rows: Vec<Submission> = state
            .submissions
            .iter()
            .filter(|s| s.assignment_page_id == assignment_page_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| std::cmp::Reverse((s.submitted_at, s.id)));
        Ok(rows)
    }
}

#[async_trait]
impl CommentRepository for InMemoryRepository {
    async fn insert_comment(&self, record: NewCommentRecord) -> Result<CommentId, StorageError> {
        let mut state = self.lock()?;
        let id = CommentId::new(state.next_id());
        let comment = Comment::new(
            id,
            record.assignment_page_id,
            record.author_id,
            record.body,
            record.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.comments.push(comment);
        Ok(id)
    }

    async fn list_comments(
        &self,
        assignment_page_id: AssignmentPageId,
    ) -> Result<Vec<Comment>, StorageError> {
        let state = self.lock()?;
        let mut rows: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.assignment_page_id == assignment_page_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.created_at, c.id));
        Ok(rows)
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryRepository {
    async fn insert_employee(
        &self,
        full_name: String,
        email: String,
    ) -> Result<EmployeeId, StorageError> {
        let mut state = self.lock()?;
        if state
            .employees
            .values()
            .any(|e| e.email.eq_ignore_ascii_case(&email))
        {
            return Err(StorageError::Conflict);
        }
        let id = EmployeeId::new(state.next_id());
        state.employees.insert(
            id,
            Employee {
                id,
                full_name,
                email,
            },
        );
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .employees
            .values()
            .find(|e| e.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>, StorageError> {
        Ok(self.lock()?.employees.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::model::RichTextDraft;
    use academy_core::time::fixed_now;

    fn content(body: &str) -> RichText {
        RichTextDraft::text_only(body).validate().unwrap()
    }

    #[tokio::test]
    async fn attach_page_twice_conflicts() {
        let repo = InMemoryRepository::new();
        let program_id = repo
            .insert_program(NewProgramRecord {
                name: "Onboarding".into(),
                description: None,
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        let page_id = repo
            .insert_page(NewPageRecord {
                title: "Intro".into(),
                kind: PageKind::Theory,
                category_id: None,
                content: content("welcome"),
                created_at: fixed_now(),
            })
            .await
            .unwrap();

        let row = ProgramPage {
            program_id,
            page_id,
            order_index: 0,
            is_required: true,
        };
        repo.attach_page(row).await.unwrap();
        assert!(matches!(
            repo.attach_page(row).await.unwrap_err(),
            StorageError::Conflict
        ));
    }

    #[tokio::test]
    async fn latest_assignment_wins_by_id() {
        let repo = InMemoryRepository::new();
        let employee_id = EmployeeId::new(5);
        let program_id = ProgramId::new(2);

        let first = repo
            .insert_assignment(NewAssignmentRecord {
                employee_id,
                program_id,
                status: ProgressStatus::NotStarted,
                assigned_at: fixed_now(),
            })
            .await
            .unwrap();
        let second = repo
            .insert_assignment(NewAssignmentRecord {
                employee_id,
                program_id,
                status: ProgressStatus::NotStarted,
                assigned_at: fixed_now(),
            })
            .await
            .unwrap();
        assert!(second > first);

        let latest = repo
            .latest_assignment(employee_id, program_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, second);
    }

    #[tokio::test]
    async fn latest_submission_breaks_timestamp_ties_by_newest_row() {
        let repo = InMemoryRepository::new();
        let page = AssignmentPageId::new(9);
        let now = fixed_now();

        repo.insert_submission(NewSubmissionRecord {
            assignment_page_id: page,
            body: "first".into(),
            submitted_at: now,
        })
        .await
        .unwrap();
        repo.insert_submission(NewSubmissionRecord {
            assignment_page_id: page,
            body: "second".into(),
            submitted_at: now,
        })
        .await
        .unwrap();

        let latest = repo.latest_submission(page).await.unwrap().unwrap();
        assert_eq!(latest.body, "second");
    }

    #[tokio::test]
    async fn employee_email_match_is_case_insensitive() {
        let repo = InMemoryRepository::new();
        repo.insert_employee("Dana Ivers".into(), "dana@quitcode.dev".into())
            .await
            .unwrap();
        let found = repo.find_by_email("Dana@QuitCode.dev").await.unwrap();
        assert!(found.is_some());
    }
}
