//! src/remote/listing.rs
//! ============================================================================
//! # Listing: Remote Folder Listing Collaborator
//!
//! The file-listing capability the poller consumes, behind the
//! [`FileListing`] trait. `DriveListing` is the production REST client:
//! image files of one folder, ordered by creation time ascending, with
//! pagination metadata only when asked for.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::remote::auth::AccessToken;
use crate::remote::file_meta::FileMeta;

#[derive(Debug, Error)]
pub enum ListingError {
    /// The endpoint rejected the bearer token. The poller answers this with
    /// exactly one refresh round.
    #[error("listing request unauthorized")]
    Unauthorized,

    #[error("listing endpoint returned {0}")]
    Endpoint(StatusCode),

    #[error("listing transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One page of the remote folder listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    #[serde(default)]
    pub files: Vec<FileMeta>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Pagination parameters for one listing call.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    /// Ask the endpoint to include `nextPageToken` in the response.
    pub want_next_token: bool,
    /// Cursor from an earlier paginated response.
    pub page_token: Option<String>,
}

#[async_trait]
pub trait FileListing: Send + Sync {
    async fn list_image_files(
        &self,
        token: &AccessToken,
        folder_id: &str,
        page: PageQuery,
    ) -> Result<ListingPage, ListingError>;
}

pub struct DriveListing {
    http: reqwest::Client,
    endpoint: String,
    page_size: u32,
}

impl DriveListing {
    pub fn new(endpoint: String, page_size: u32) -> Self {
        DriveListing {
            http: reqwest::Client::new(),
            endpoint,
            page_size,
        }
    }
}

#[async_trait]
impl FileListing for DriveListing {
    async fn list_image_files(
        &self,
        token: &AccessToken,
        folder_id: &str,
        page: PageQuery,
    ) -> Result<ListingPage, ListingError> {
        let query: String = format!("'{folder_id}' in parents and mimeType contains 'image/'");
        let fields: &str = if page.want_next_token {
            "nextPageToken, files(id,name,thumbnailLink,createdTime)"
        } else {
            "files(id,name,thumbnailLink,createdTime)"
        };
        let page_size: String = self.page_size.to_string();

        let mut params: Vec<(&str, &str)> = vec![
            ("q", query.as_str()),
            ("orderBy", "createdTime"),
            ("fields", fields),
            ("pageSize", page_size.as_str()),
        ];
        if page.want_next_token
            && let Some(ref cursor) = page.page_token
        {
            params.push(("pageToken", cursor.as_str()));
        }

        let response = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status: StatusCode = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ListingError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ListingError::Endpoint(status));
        }

        let listing: ListingPage = response.json().await?;
        debug!(
            files = listing.files.len(),
            paged = listing.next_page_token.is_some(),
            "listing page received"
        );
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_page_parses_with_and_without_cursor() {
        let json = r#"{
            "nextPageToken": "tok-1",
            "files": [{
                "id": "1xYz",
                "name": "beach.png",
                "thumbnailLink": "https://lh3.example.com/1xYz=s220",
                "createdTime": "2024-01-15T10:30:00Z"
            }]
        }"#;
        let page: ListingPage = serde_json::from_str(json).expect("parse");
        assert_eq!(page.files.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("tok-1"));

        let bare: ListingPage = serde_json::from_str(r#"{"files": []}"#).expect("parse");
        assert!(bare.files.is_empty());
        assert_eq!(bare.next_page_token, None);
    }
}
