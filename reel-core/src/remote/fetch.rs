//! src/remote/fetch.rs
//! ============================================================================
//! # Fetch: Image Byte Fetch and Decode
//!
//! The load half of a materialization: pull the image bytes over HTTP and
//! decode them. A load only counts once the bytes decode as an image, which
//! is what the retry engine keys success on.

use async_trait::async_trait;
use image::GenericImageView;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("image request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image endpoint returned {0}")]
    Endpoint(reqwest::StatusCode),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decode task failed: {0}")]
    DecodeTask(String),
}

/// Seam for loading one image. Tests substitute scripted fetchers; the
/// production implementation goes over HTTP.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch and decode the image at `url`, returning its pixel dimensions.
    async fn fetch_image(&self, url: &str) -> Result<(u32, u32), FetchError>;
}

pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        HttpImageFetcher {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        HttpImageFetcher::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<(u32, u32), FetchError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Endpoint(status));
        }

        let bytes = response.bytes().await?;
        // Decode runs on the blocking pool.
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| FetchError::DecodeTask(e.to_string()))??;

        let (width, height) = decoded.dimensions();
        debug!(width, height, "image decoded");
        Ok((width, height))
    }
}
