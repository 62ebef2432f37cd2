//! src/view/surface.rs
//! ============================================================================
//! # Surface: Rendering Seam
//!
//! The pipeline never draws anything itself; it announces slide and
//! navigation changes through [`RenderSurface`]. `ConsoleSurface` narrates
//! the carousel through the log stream.

use tracing::{error, info, warn};

use crate::model::slideshow_state::Slide;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

pub trait RenderSurface: Send + Sync {
    /// A new slide was appended at `slide.position`.
    fn on_new_slide(&self, slide: &Slide);

    /// Bring the slide at `index` into view.
    fn on_advance(&self, index: usize);

    /// User-facing notice: auth prompts, listing failures, per-file errors.
    fn on_notice(&self, level: NoticeLevel, message: &str);
}

pub struct ConsoleSurface;

impl RenderSurface for ConsoleSurface {
    fn on_new_slide(&self, slide: &Slide) {
        info!(
            position = slide.position,
            name = %slide.file.name,
            width = slide.width,
            height = slide.height,
            "slide attached"
        );
    }

    fn on_advance(&self, index: usize) {
        info!(index, "showing slide");
    }

    fn on_notice(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => info!("{message}"),
            NoticeLevel::Warning => warn!("{message}"),
            NoticeLevel::Error => error!("{message}"),
        }
    }
}
