//! src/remote/token_store.rs
//! ============================================================================
//! # TokenStore: Session-Durable Token Persistence
//!
//! JSON-file-backed storage for the OAuth token pair under the platform data
//! dir. Read and written only by the auth collaborator.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Access/refresh token pair as persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store at the canonical platform data path, e.g.
    /// `$XDG_DATA_HOME/Reel/tokens.json` on Linux.
    pub fn at_default_path() -> Result<Self, AppError> {
        let proj_dirs: ProjectDirs = ProjectDirs::from("org", "example", "Reel")
            .ok_or_else(|| AppError::Other("Could not determine data directory.".to_string()))?;
        Ok(TokenStore {
            path: proj_dirs.data_dir().join("tokens.json"),
        })
    }

    /// Store at an explicit path (tests, portable setups).
    pub fn at_path(path: PathBuf) -> Self {
        TokenStore { path }
    }

    pub async fn load(&self) -> Result<Option<StoredTokens>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text: String = tokio::fs::read_to_string(&self.path).await?;
        let tokens: StoredTokens = serde_json::from_str(&text)?;
        Ok(Some(tokens))
    }

    pub async fn save(&self, tokens: &StoredTokens) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text: String = serde_json::to_string_pretty(tokens)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

// ------------------------------------------------------------------------- //
// Tests
// ------------------------------------------------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_returns_none_when_nothing_was_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store: TokenStore = TokenStore::at_path(dir.path().join("tokens.json"));

        assert_eq!(store.load().await.expect("load"), None);
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store: TokenStore = TokenStore::at_path(dir.path().join("nested").join("tokens.json"));

        let tokens: StoredTokens = StoredTokens {
            access_token: "at-123".to_string(),
            refresh_token: Some("rt-456".to_string()),
        };
        store.save(&tokens).await.expect("save");

        let loaded: Option<StoredTokens> = store.load().await.expect("load");
        assert_eq!(loaded, Some(tokens));
    }
}
