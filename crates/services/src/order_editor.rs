use academy_core::model::{PageId, ProgramId, ProgramPage};
use academy_core::ordering::reorder_locally;

use crate::error::ProgramServiceError;
use crate::program_service::ProgramService;

/// How a drag gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// The gesture never changed the order; nothing was written.
    Unchanged,
    /// The store's canonical order matches the optimistic list.
    Persisted,
    /// The store disagreed after the writes; the list was reverted to its
    /// pre-drag state.
    RolledBack,
}

/// Drag-and-drop reordering over a program's page list.
///
/// The list is reordered locally on every hover so the UI tracks the cursor.
/// Persistence happens once, when the drag ends, and only if some hover
/// actually changed the order. After persisting, the canonical order is
/// re-fetched and compared against the optimistic list; a mismatch reverts
/// to the snapshot taken when the drag began.
pub struct PageOrderEditor {
    service: ProgramService,
    program_id: ProgramId,
    items: Vec<ProgramPage>,
    drag: Option<DragState>,
}

struct DragState {
    dragged: PageId,
    snapshot: Vec<ProgramPage>,
    dirty: bool,
}

impl PageOrderEditor {
    #[must_use]
    pub fn new(service: ProgramService, program_id: ProgramId, items: Vec<ProgramPage>) -> Self {
        Self {
            service,
            program_id,
            items,
            drag: None,
        }
    }

    /// Load the editor from the store's canonical order.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` if the fetch fails.
    pub async fn load(
        service: ProgramService,
        program_id: ProgramId,
    ) -> Result<Self, ProgramServiceError> {
        let items = service.list_program_pages(program_id).await?;
        Ok(Self::new(service, program_id, items))
    }

    /// The list as currently displayed, optimistic reordering included.
    #[must_use]
    pub fn items(&self) -> &[ProgramPage] {
        &self.items
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start dragging a page. Snapshots the current order for rollback.
    /// Unknown ids are ignored.
    pub fn begin_drag(&mut self, page_id: PageId) {
        if !self.items.iter().any(|p| p.page_id == page_id) {
            return;
        }
        self.drag = Some(DragState {
            dragged: page_id,
            snapshot: self.items.clone(),
            dirty: false,
        });
    }

    /// Hover the dragged page over a target. Reorders the local list so the
    /// dragged page lands immediately before the target's current slot, then
    /// renumbers densely. No-op outside a drag or for identity hovers.
    pub fn hover_over(&mut self, target_id: PageId) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let reordered = reorder_locally(&self.items, drag.dragged, target_id);
        if reordered != self.items {
            self.items = reordered;
            drag.dirty = true;
        }
    }

    /// Abandon the drag and restore the pre-drag order.
    pub fn cancel_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.items = drag.snapshot;
        }
    }

    /// Finish the drag. Persists the optimistic order only if some hover
    /// changed it, then reconciles against the store's canonical order.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` if the canonical re-fetch
    /// fails; the list has been reverted to its pre-drag state first.
    pub async fn end_drag(&mut self) -> Result<ReorderOutcome, ProgramServiceError> {
        let Some(drag) = self.drag.take() else {
            return Ok(ReorderOutcome::Unchanged);
        };
        if !drag.dirty {
            return Ok(ReorderOutcome::Unchanged);
        }

        let canonical = match self.service.persist_order(self.program_id, &self.items).await {
            Ok(canonical) => canonical,
            Err(err) => {
                self.items = drag.snapshot;
                return Err(err);
            }
        };

        if canonical == self.items {
            Ok(ReorderOutcome::Persisted)
        } else {
            tracing::warn!(
                program_id = self.program_id.value(),
                "canonical order disagrees with optimistic list; reverting"
            );
            self.items = drag.snapshot;
            Ok(ReorderOutcome::RolledBack)
        }
    }
}
