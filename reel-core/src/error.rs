//! src/error.rs
//! ============================================================================
//! # AppError: Unified Error Type for the Carousel Engine
//!
//! This module defines the comprehensive error enum (`AppError`) used across
//! the crate. Per-file failures (image loads) and per-cycle failures (auth,
//! listing) are separate variants so callers can keep their blast radius
//! apart; nothing here is fatal to the running session.

use std::{io, path::PathBuf};
use thiserror::Error;

use crate::remote::{auth::AuthError, fetch::FetchError, listing::ListingError};

/// Unified error type for all carousel-engine operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No usable token; at most one refresh round is attempted upstream.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Transport or API failure while listing the remote folder. Aborts the
    /// current poll cycle only; the next scheduled poll retries.
    #[error("listing failed: {0}")]
    Listing(#[from] ListingError),

    /// Single-file load failure after the bounded retry budget. Non-fatal;
    /// sibling loads are unaffected.
    #[error("image load failed for {id} after {attempts} attempts: {source}")]
    ImageLoad {
        id: String,
        attempts: u32,
        #[source]
        source: FetchError,
    },

    /// TOML config parsing error.
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("config serialize error: {0}")]
    ConfigSer(#[from] toml::ser::Error),

    /// Config file I/O error with path.
    #[error("failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serialization or deserialization error (e.g., persisted tokens).
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// HTTP transport failure outside the typed collaborator errors.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Async task failure or join error.
    #[error("async task failed: {0}")]
    Task(String),

    /// Any other error, with description.
    #[error("unexpected error: {0}")]
    Other(String),
}

impl AppError {
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> AppError {
        AppError::Other(format!("{}: {}", ctx.into(), self))
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Other(e.to_string())
    }
}
