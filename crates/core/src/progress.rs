//! Aggregate progress over an assignment's pages.

use crate::model::ProgressStatus;

/// Percentage of pages marked done, rounded half-up to the nearest integer.
///
/// A program with zero assigned pages has progress 0.
#[must_use]
pub fn progress_percent(statuses: &[ProgressStatus]) -> u8 {
    let total = statuses.len() as u64;
    if total == 0 {
        return 0;
    }
    let done = statuses.iter().filter(|s| s.is_done()).count() as u64;
    // round(100 * done / total) in integer arithmetic
    let percent = (200 * done + total) / (2 * total);
    percent as u8
}
