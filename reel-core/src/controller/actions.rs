//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Application Commands
//!
//! Defines the `Action` enum, which represents all timer ticks, operator
//! triggers, and background-task completions the event loop responds to.
//! This provides a single, clear interface for the `EventLoop` to process.

use crate::remote::file_meta::FileMeta;
use crate::view::surface::NoticeLevel;

#[derive(Debug, Clone)]
pub enum Action {
    /// Scheduled poll tick.
    PollTick,
    /// Operator's "fetch images now" trigger.
    FetchNow,
    /// Auto-advance timer tick.
    AdvanceTick,
    /// Authorization code handed over by the operator.
    Authorize { code: String },
    /// A materializer finished loading and decoding an image.
    SlideLoaded {
        file: FileMeta,
        width: u32,
        height: u32,
    },
    /// A materializer ran out of retries for one file.
    SlideFailed {
        id: String,
        name: String,
        attempts: u32,
        error: String,
    },
    /// User-facing notice from a background task.
    Notice {
        level: NoticeLevel,
        message: String,
    },
    /// End the session.
    Quit,
}
