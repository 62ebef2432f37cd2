//! src/model/app_state.rs
//! ============================================================================
//! # AppState: Shared Session State
//!
//! Everything the background tasks and the event loop share: configuration,
//! the dedup ledger + poll cursor, and the slide sequence. Lives behind
//! `Arc<tokio::sync::Mutex<_>>`; the commit path below is the single place
//! where the ledger and the slide sequence are mutated together, which keeps
//! the "recorded in the ledger iff a slide exists" invariant.

use std::sync::Arc;

use crate::config::Config;
use crate::model::session_state::SessionState;
use crate::model::slideshow_state::SlideshowState;
use crate::remote::file_meta::FileMeta;

pub struct AppState {
    pub config: Arc<Config>,
    pub session: SessionState,
    pub slideshow: SlideshowState,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        AppState {
            config,
            session: SessionState::new(),
            slideshow: SlideshowState::new(),
        }
    }

    /// Commit half of a materialization: idempotent insert keyed by file id,
    /// re-validated here — the last possible point before the mutation — and
    /// the ledger record in the same critical section. Returns the new
    /// slide's position, or `None` when another attempt already landed it.
    pub fn commit_slide(&mut self, file: FileMeta, width: u32, height: u32) -> Option<usize> {
        let id: String = file.id.clone();
        let position: usize = self.slideshow.insert_slide(file, width, height)?;
        self.session.mark_seen(&id);
        Some(position)
    }
}

// ------------------------------------------------------------------------- //
// Tests
// ------------------------------------------------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn meta(id: &str) -> FileMeta {
        FileMeta {
            id: id.to_string(),
            name: format!("{id}.jpg"),
            thumbnail_link: format!("https://lh3.example.com/{id}=s220"),
            created_time: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[test]
    fn duplicate_commits_produce_one_slide() {
        let mut app: AppState = AppState::new(Arc::new(Config::default()));

        assert_eq!(app.commit_slide(meta("A"), 640, 480), Some(0));
        assert_eq!(app.commit_slide(meta("A"), 640, 480), None);

        assert_eq!(app.slideshow.len(), 1);
        assert_eq!(app.session.seen_count(), 1);
    }

    #[test]
    fn ledger_and_sequence_stay_in_lockstep() {
        let mut app: AppState = AppState::new(Arc::new(Config::default()));

        for id in ["A", "B", "C"] {
            app.commit_slide(meta(id), 640, 480);
        }

        assert_eq!(app.slideshow.len(), app.session.seen_count());
        for slide in app.slideshow.slides() {
            assert!(app.session.has_seen(&slide.file.id));
        }
    }
}
