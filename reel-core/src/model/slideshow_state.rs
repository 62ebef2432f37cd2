//! src/model/slideshow_state.rs
//! ============================================================================
//! # SlideshowState: Ordered Slide Sequence and Auto-Advance Cursor
//!
//! The navigable sequence of materialized slides. Slides are appended in
//! completion order (the fan-out does not await one load before starting the
//! next, so this is not necessarily listing order), never mutated, and never
//! removed. Insertion is idempotent and keyed by file id; that is the
//! correctness mechanism for the check-then-act gap between a delta
//! computation and the actual append.

use crate::remote::file_meta::FileMeta;

/// One materialized slide. Anchors mirror the prev/next navigation chrome:
/// the first slide has no previous anchor, and the next anchor always points
/// one past the current position (dangling until the next slide lands).
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub file: FileMeta,
    /// 0-based position in materialization order.
    pub position: usize,
    pub width: u32,
    pub height: u32,
    pub prev_anchor: Option<usize>,
    pub next_anchor: usize,
}

/// Navigation entry pointing at one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub target: usize,
    pub label: String,
}

#[derive(Debug, Default)]
pub struct SlideshowState {
    slides: Vec<Slide>,
    nav_entries: Vec<NavEntry>,
    auto_cursor: usize,
}

impl SlideshowState {
    pub fn new() -> Self {
        SlideshowState::default()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn nav_entries(&self) -> &[NavEntry] {
        &self.nav_entries
    }

    pub fn in_range(&self, index: usize) -> bool {
        index < self.slides.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slides.iter().any(|slide| slide.file.id == id)
    }

    /// Appends a slide for `file` at the next position and records its
    /// navigation entry. Idempotent: a second insert for the same id is a
    /// no-op returning `None`.
    pub fn insert_slide(&mut self, file: FileMeta, width: u32, height: u32) -> Option<usize> {
        if self.contains(&file.id) {
            return None;
        }

        let position: usize = self.slides.len();
        self.slides.push(Slide {
            file,
            position,
            width,
            height,
            prev_anchor: position.checked_sub(1),
            next_anchor: position + 1,
        });
        self.nav_entries.push(NavEntry {
            target: position,
            label: format!("Go to slide {}", position + 1),
        });

        Some(position)
    }

    /// One auto-advance tick: visit the slide under the cursor and step
    /// forward, wrapping to 0 past the end. No-op on an empty sequence.
    /// The cursor is untouched by the jump-to-newest behavior.
    pub fn auto_advance_tick(&mut self) -> Option<usize> {
        if self.auto_cursor >= self.slides.len() {
            self.auto_cursor = 0;
        }
        if self.slides.is_empty() {
            return None;
        }

        let visited: usize = self.auto_cursor;
        self.auto_cursor += 1;
        Some(visited)
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
    fn insert_is_idempotent_per_id() {
        let mut show: SlideshowState = SlideshowState::new();
        assert_eq!(show.insert_slide(meta("A"), 640, 480), Some(0));
        assert_eq!(show.insert_slide(meta("A"), 640, 480), None);
        assert_eq!(show.len(), 1);
        assert_eq!(show.nav_entries().len(), 1);
    }

    #[test]
    fn anchors_skip_prev_on_first_slide_only() {
        let mut show: SlideshowState = SlideshowState::new();
        show.insert_slide(meta("A"), 640, 480);
        show.insert_slide(meta("B"), 640, 480);

        let first: &Slide = show.get(0).unwrap();
        assert_eq!(first.prev_anchor, None);
        assert_eq!(first.next_anchor, 1);

        let second: &Slide = show.get(1).unwrap();
        assert_eq!(second.prev_anchor, Some(0));
        assert_eq!(second.next_anchor, 2);
    }

    #[test]
    fn auto_advance_wraps_after_the_last_slide() {
        let mut show: SlideshowState = SlideshowState::new();
        show.insert_slide(meta("A"), 640, 480);
        show.insert_slide(meta("B"), 640, 480);
        show.insert_slide(meta("C"), 640, 480);

        let visited: Vec<Option<usize>> = (0..4).map(|_| show.auto_advance_tick()).collect();
        assert_eq!(visited, vec![Some(0), Some(1), Some(2), Some(0)]);
    }

    #[test]
    fn auto_advance_is_a_no_op_while_empty() {
        let mut show: SlideshowState = SlideshowState::new();
        assert_eq!(show.auto_advance_tick(), None);
        assert_eq!(show.auto_advance_tick(), None);

        // first slide arrives later; the cursor starts from it
        show.insert_slide(meta("A"), 640, 480);
        assert_eq!(show.auto_advance_tick(), Some(0));
    }

    #[test]
    fn navigation_labels_are_one_based() {
        let mut show: SlideshowState = SlideshowState::new();
        show.insert_slide(meta("A"), 640, 480);
        show.insert_slide(meta("B"), 640, 480);
        assert_eq!(show.nav_entries()[1].label, "Go to slide 2");
        assert_eq!(show.nav_entries()[1].target, 1);
    }
}
