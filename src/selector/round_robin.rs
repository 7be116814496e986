//! Round-robin selection strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::pool::UpstreamView;

/// Rotate through the candidate tier. Candidates arrive pre-filtered and in
/// stable address order (snapshot order), so the cursor walks the same ring
/// as long as membership is unchanged.
pub(crate) fn pick<'a>(
    candidates: &[&'a UpstreamView],
    cursor: &AtomicUsize,
) -> Option<&'a UpstreamView> {
    if candidates.is_empty() {
        return None;
    }
    let index = cursor.fetch_add(1, Ordering::Relaxed) % candidates.len();
    Some(candidates[index])
}
