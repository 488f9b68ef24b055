//! Pure page-ordering logic.
//!
//! The drag-and-drop surface calls [`reorder_locally`] on every hover event
//! for live preview; persistence happens once, on drag end, outside this
//! module. Keeping the reducer pure keeps it trivially testable.

use std::collections::HashMap;

use crate::model::{AssignmentPage, PageId, ProgramPage};

/// Order assigned to entries missing from a program's order map when sorting
/// a learner's page list. Missing entries sort last.
pub const MISSING_ORDER: u32 = 9999;

/// Moves the dragged page immediately before the target page and renumbers.
///
/// Removes the dragged entry from its current position and reinserts it at
/// the target's position in the reduced list, then rewrites every
/// `order_index` to its new zero-based position, so `order[i] == i` holds
/// after any successful call.
///
/// Dragging a page onto itself, or naming an id not present in the list,
/// returns the input unchanged.
#[must_use]
pub fn reorder_locally(
    items: &[ProgramPage],
    dragged_id: PageId,
    target_id: PageId,
) -> Vec<ProgramPage> {
    if dragged_id == target_id {
        return items.to_vec();
    }
    let Some(from) = items.iter().position(|p| p.page_id == dragged_id) else {
        return items.to_vec();
    };
    if !items.iter().any(|p| p.page_id == target_id) {
        return items.to_vec();
    }

    let mut reordered = items.to_vec();
    let dragged = reordered.remove(from);
    // Target is looked up after removal so the dragged page always lands
    // immediately before it, whichever direction the drag came from.
    let to = reordered
        .iter()
        .position(|p| p.page_id == target_id)
        .unwrap_or(reordered.len());
    reordered.insert(to, dragged);

    renumber(&mut reordered);
    reordered
}

/// Rewrites `order_index` to the dense sequence `0..n`.
pub fn renumber(items: &mut [ProgramPage]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.order_index = u32::try_from(index).unwrap_or(u32::MAX);
    }
}

/// Builds the page-id → order-index map for a program's canonical order.
#[must_use]
pub fn order_map(items: &[ProgramPage]) -> HashMap<PageId, u32> {
    items.iter().map(|p| (p.page_id, p.order_index)).collect()
}

/// Sorts a learner's page list by the program's order map.
///
/// Entries not found in the map sort last (treated as [`MISSING_ORDER`]);
/// ties break by assignment-page id ascending.
pub fn sort_by_program_order(pages: &mut [AssignmentPage], order: &HashMap<PageId, u32>) {
    pages.sort_by_key(|p| {
        (
            order.get(&p.page_id).copied().unwrap_or(MISSING_ORDER),
            p.id,
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssignmentId, AssignmentPageId, ProgramId, ProgressStatus};

    fn row(page_id: u64, order_index: u32) -> ProgramPage {
        ProgramPage {
            program_id: ProgramId::new(1),
            page_id: PageId::new(page_id),
            order_index,
            is_required: false,
        }
    }

    fn ids(items: &[ProgramPage]) -> Vec<u64> {
        items.iter().map(|p| p.page_id.value()).collect()
    }

    #[test]
    fn drag_last_onto_first_moves_to_front() {
        let items = vec![row(10, 0), row(20, 1), row(30, 2)];
        let result = reorder_locally(&items, PageId::new(30), PageId::new(10));
        assert_eq!(ids(&result), vec![30, 10, 20]);
        let orders: Vec<u32> = result.iter().map(|p| p.order_index).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn drag_down_lands_immediately_before_target() {
        let items = vec![row(10, 0), row(20, 1), row(30, 2)];
        let result = reorder_locally(&items, PageId::new(10), PageId::new(30));
        assert_eq!(ids(&result), vec![20, 10, 30]);
    }

    #[test]
    fn self_drag_is_identity() {
        let items = vec![row(10, 0), row(20, 1)];
        let result = reorder_locally(&items, PageId::new(10), PageId::new(10));
        assert_eq!(result, items);
    }

    #[test]
    fn unknown_dragged_id_is_identity() {
        let items = vec![row(10, 0), row(20, 1)];
        let result = reorder_locally(&items, PageId::new(99), PageId::new(10));
        assert_eq!(result, items);
    }

    #[test]
    fn unknown_target_id_is_identity() {
        let items = vec![row(10, 0), row(20, 1)];
        let result = reorder_locally(&items, PageId::new(10), PageId::new(99));
        assert_eq!(result, items);
    }

    #[test]
    fn result_is_a_permutation_with_dense_indexes() {
        let items = vec![row(1, 0), row(2, 1), row(3, 2), row(4, 3), row(5, 4)];
        for dragged in 1..=5u64 {
            for target in 1..=5u64 {
                if dragged == target {
                    continue;
                }
                let result =
                    reorder_locally(&items, PageId::new(dragged), PageId::new(target));
                let mut sorted = ids(&result);
                sorted.sort_unstable();
                assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
                for (i, page) in result.iter().enumerate() {
                    assert_eq!(page.order_index as usize, i);
                }
                // Dragged sits immediately before the target.
                let d = result
                    .iter()
                    .position(|p| p.page_id.value() == dragged)
                    .unwrap();
                let t = result
                    .iter()
                    .position(|p| p.page_id.value() == target)
                    .unwrap();
                assert_eq!(d + 1, t);
            }
        }
    }

    #[test]
    fn learner_list_sorts_missing_entries_last_with_id_tiebreak() {
        let order = order_map(&[row(10, 0), row(20, 1)]);
        let page = |id: u64, page_id: u64| AssignmentPage {
            id: AssignmentPageId::new(id),
            assignment_id: AssignmentId::new(1),
            page_id: PageId::new(page_id),
            page_version_id: None,
            status: ProgressStatus::NotStarted,
            score: None,
        };
        let mut pages = vec![page(3, 77), page(2, 20), page(1, 88), page(4, 10)];
        sort_by_program_order(&mut pages, &order);
        let listed: Vec<u64> = pages.iter().map(|p| p.id.value()).collect();
        // 10 (order 0), 20 (order 1), then unmapped pages by assignment-page id.
        assert_eq!(listed, vec![4, 2, 1, 3]);
    }
}
