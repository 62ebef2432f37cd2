//! lib.rs — Library Entry for the Carousel Engine
//! -----------------------------------------------
//! Exposes the pipeline modules: remote collaborators, session/slideshow
//! state, background tasks, and the event loop controller.
//! Only re-export what you want public in the library crate root.

pub mod error;

pub mod config;

/// --- Controller/event loop (main async event handling) ---
pub mod controller {
    pub mod actions;
    pub use actions::Action;

    pub mod event_loop;
    pub use event_loop::EventLoop;
}

/// --- State/data models ---
pub mod model {
    pub mod app_state;

    pub mod session_state;
    pub use session_state::SessionState;

    pub mod slideshow_state;
    pub use slideshow_state::{NavEntry, Slide, SlideshowState};
}

/// --- Remote collaborators: auth, listing, image fetch ---
pub mod remote {
    pub mod auth;
    pub use auth::{AccessBroker, AccessToken, AuthError, OAuthBroker, TokenSet};

    pub mod fetch;
    pub use fetch::{FetchError, HttpImageFetcher, ImageFetcher};

    pub mod file_meta;
    pub use file_meta::FileMeta;

    pub mod listing;
    pub use listing::{DriveListing, FileListing, ListingError, ListingPage, PageQuery};

    pub mod token_store;
    pub use token_store::{StoredTokens, TokenStore};
}

/// --- Background/async tasks ---
pub mod tasks {
    pub mod materialize_task;
    pub mod poll_task;
}

/// --- Rendering seam ---
pub mod view {
    pub mod surface;
    pub use surface::{ConsoleSurface, NoticeLevel, RenderSurface};
}

pub mod util {
    pub mod backoff;
}

pub mod logging;
pub use logging::Logger;

pub use error::AppError;

pub use model::{app_state::AppState, session_state::SessionState, slideshow_state::SlideshowState};
