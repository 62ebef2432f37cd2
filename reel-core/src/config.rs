//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver (directories only)
//!
//! Manages all user-editable settings for the carousel engine: the remote
//! folder, the two timer intervals, the retry policy, pagination knobs, and
//! the OAuth client. Loads and saves settings as TOML from the proper
//! cross-platform config path using the
//! [`directories`](https://docs.rs/directories) crate.
//!
//! ## Features
//! - XDG-compliant config discovery and writing (Linux, macOS, Windows)
//! - Robust defaulting if no config file exists
//! - Async load/save for smooth integration with Tokio
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::util::backoff::RetryPolicy;

/// Retry knobs for single-image loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Tries per image before giving up on it for good.
    pub max_attempts: u32,
    /// First backoff delay; doubles per attempt.
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    /// Ceiling on the pre-jitter backoff delay.
    #[serde(with = "humantime_serde")]
    pub cap_delay: Duration,
    /// Upper bound (exclusive) of the uniform jitter added to each delay.
    #[serde(with = "humantime_serde")]
    pub jitter_max: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            cap_delay: Duration::from_millis(10_000),
            jitter_max: Duration::from_millis(1000),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: cfg.max_attempts,
            base_delay: cfg.base_delay,
            cap_delay: cfg.cap_delay,
            jitter_max: cfg.jitter_max,
        }
    }
}

/// OAuth2 client settings for the authorization-code flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        OAuthConfig {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:5500".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/drive.readonly".to_string()],
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote folder whose image files feed the carousel.
    pub folder_id: String,
    /// REST listing endpoint of the storage API.
    pub listing_endpoint: String,
    /// How often the folder is re-listed.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Auto-advance cadence of the slideshow.
    #[serde(with = "humantime_serde")]
    pub advance_interval: Duration,
    /// Page size requested from the listing endpoint (API max 1000).
    pub page_size: u32,
    /// Materialized-slide count past which pagination metadata is requested.
    pub page_threshold: usize,
    /// Size suffix substituted into thumbnail URIs for the full-size load.
    pub hi_res_suffix: String,
    pub retry: RetryConfig,
    pub oauth: OAuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            folder_id: String::new(),
            listing_endpoint: "https://www.googleapis.com/drive/v3/files".to_string(),
            poll_interval: Duration::from_secs(15),
            advance_interval: Duration::from_secs(5),
            page_size: 1000,
            page_threshold: 900,
            hi_res_suffix: "s4000".to_string(),
            retry: RetryConfig::default(),
            oauth: OAuthConfig::default(),
        }
    }
}

impl Config {
    /// Loads config from TOML file at the XDG-compliant app config dir, or
    /// returns defaults.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/Reel/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> Result<Self, AppError> {
        let path: PathBuf = Self::config_path()?;
        if path.exists() {
            let text: String =
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| AppError::ConfigIo {
                        path: path.clone(),
                        source,
                    })?;
            let cfg: Config = toml::from_str(&text)?;
            Ok(cfg)
        } else {
            Ok(Config::default())
        }
    }

    /// Saves config to TOML file at the XDG-compliant app config dir.
    pub async fn save(&self) -> Result<(), AppError> {
        let path: PathBuf = Self::config_path()?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let toml_str: String = toml::to_string_pretty(self)?;
        tokio::fs::write(&path, toml_str).await?;
        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> Result<PathBuf, AppError> {
        let proj_dirs: ProjectDirs = ProjectDirs::from("org", "example", "Reel")
            .ok_or_else(|| AppError::Other("Could not determine config directory.".to_string()))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Returns the data directory used for session-durable state (tokens).
    pub fn data_dir() -> Result<PathBuf, AppError> {
        let proj_dirs = ProjectDirs::from("org", "example", "Reel")
            .ok_or_else(|| AppError::Other("Could not determine data directory.".to_string()))?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }
}
