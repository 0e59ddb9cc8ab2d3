use std::sync::atomic::{AtomicUsize, Ordering};

// Single static counter for all edits, so debug dumps can tell apart
// edits that share a display name
static NEXT_EDIT_ID: AtomicUsize = AtomicUsize::new(1);

pub fn next_edit_id() -> usize {
    NEXT_EDIT_ID.fetch_add(1, Ordering::SeqCst)
}
