//! src/model/session_state.rs
//! ============================================================================
//! # SessionState: Dedup Ledger and Poll Cursor
//!
//! Session-scoped bookkeeping for the polling pipeline: the append-only set
//! of file ids that already produced a slide, and the pagination cursor for
//! the listing collaborator. Created once at startup, lives until the
//! process exits; there is no reset path.

use std::collections::HashSet;

use crate::remote::file_meta::FileMeta;

/// Dedup ledger plus listing cursor for one session.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Ids of files already materialized into the slide sequence.
    /// Append-only; no eviction for the lifetime of the session.
    seen: HashSet<String>,
    /// Pagination token from the most recent paginated listing response.
    page_cursor: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Records `id` in the ledger. Idempotent; returns whether the id was
    /// newly inserted.
    pub fn mark_seen(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_owned())
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Files from a listing result that have no slide yet, in listing order.
    pub fn delta(&self, files: &[FileMeta]) -> Vec<FileMeta> {
        files
            .iter()
            .filter(|file| !self.seen.contains(&file.id))
            .cloned()
            .collect()
    }

    pub fn page_cursor(&self) -> Option<&str> {
        self.page_cursor.as_deref()
    }

    /// Replaces the cursor with the one from the latest paginated response.
    pub fn set_page_cursor(&mut self, cursor: Option<String>) {
        self.page_cursor = cursor;
    }
}

// ------------------------------------------------------------------------- //
// Tests
// ------------------------------------------------------------------------- //
