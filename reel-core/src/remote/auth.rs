//! src/remote/auth.rs
//! ============================================================================
//! # Auth: OAuth2 Access Broker
//!
//! The auth collaborator consumed by the polling pipeline. The pipeline only
//! needs three capabilities — current token, one refresh round, and the
//! authorization-code exchange — so they sit behind the [`AccessBroker`]
//! trait; `OAuthBroker` is the production implementation talking to an
//! OAuth2 token endpoint with form-encoded requests.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::config::OAuthConfig;
use crate::remote::token_store::{StoredTokens, TokenStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No usable token and no automatic way to obtain one. The operator has
    /// to run the authorization flow again.
    #[error("authorization required: no usable access token")]
    Required,

    #[error("token refresh rejected: {0}")]
    RefreshRejected(String),

    #[error("authorization code exchange rejected: {0}")]
    ExchangeRejected(String),

    #[error("token endpoint transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token store error: {0}")]
    Store(String),
}

/// Opaque bearer token handed to the listing collaborator.
#[derive(Debug, Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(secret: impl Into<String>) -> Self {
        AccessToken(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Token endpoint response for both the code exchange and the refresh grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// What the pipeline needs from the auth side, nothing more.
#[async_trait]
pub trait AccessBroker: Send + Sync {
    /// Currently stored access token, or `AuthError::Required`.
    async fn valid_access_token(&self) -> Result<AccessToken, AuthError>;

    /// One refresh round against the token endpoint; persists and returns
    /// the fresh token.
    async fn refresh_access_token(&self) -> Result<AccessToken, AuthError>;

    /// Authorization-code exchange; persists the granted token pair.
    async fn exchange_code(&self, code: &str) -> Result<(), AuthError>;
}

pub struct OAuthBroker {
    http: reqwest::Client,
    settings: OAuthConfig,
    store: TokenStore,
}

impl OAuthBroker {
    pub fn new(settings: OAuthConfig, store: TokenStore) -> Self {
        OAuthBroker {
            http: reqwest::Client::new(),
            settings,
            store,
        }
    }

    async fn stored(&self) -> Result<Option<StoredTokens>, AuthError> {
        self.store
            .load()
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }

    async fn persist(&self, tokens: &StoredTokens) -> Result<(), AuthError> {
        self.store
            .save(tokens)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }
}

#[async_trait]
impl AccessBroker for OAuthBroker {
    async fn valid_access_token(&self) -> Result<AccessToken, AuthError> {
        // A stored token counts as valid; the listing path downgrades to a
        // refresh round when the endpoint rejects it with 401.
        self.stored()
            .await?
            .map(|tokens| AccessToken::new(tokens.access_token))
            .ok_or(AuthError::Required)
    }

    async fn refresh_access_token(&self) -> Result<AccessToken, AuthError> {
        let stored: StoredTokens = self.stored().await?.ok_or(AuthError::Required)?;
        let refresh_token: String = stored.refresh_token.clone().ok_or(AuthError::Required)?;

        let params: [(&str, &str); 4] = [
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::RefreshRejected(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let fresh: TokenSet = response.json().await?;
        self.persist(&StoredTokens {
            access_token: fresh.access_token.clone(),
            // refresh grants usually omit the refresh token; keep the old one
            refresh_token: fresh.refresh_token.or(stored.refresh_token),
        })
        .await?;

        info!("access token refreshed");
        Ok(AccessToken::new(fresh.access_token))
    }

    async fn exchange_code(&self, code: &str) -> Result<(), AuthError> {
        let params: [(&str, &str); 5] = [
            ("code", code),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];
        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::ExchangeRejected(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let granted: TokenSet = response.json().await?;
        self.persist(&StoredTokens {
            access_token: granted.access_token,
            refresh_token: granted.refresh_token,
        })
        .await?;

        info!("authorization code exchanged, tokens persisted");
        Ok(())
    }
}

// ------------------------------------------------------------------------- //
// Tests
// ------------------------------------------------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;

    fn broker_with_empty_store(dir: &tempfile::TempDir) -> OAuthBroker {
        OAuthBroker::new(
            OAuthConfig::default(),
            TokenStore::at_path(dir.path().join("tokens.json")),
        )
    }

    #[tokio::test]
    async fn valid_access_token_requires_a_stored_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        let broker: OAuthBroker = broker_with_empty_store(&dir);

        let err: AuthError = broker
            .valid_access_token()
            .await
            .expect_err("must be gated");
        assert!(matches!(err, AuthError::Required));
    }

    #[tokio::test]
    async fn refresh_without_a_refresh_token_is_rejected_locally() {
        let dir = tempfile::tempdir().expect("tempdir");
        let broker: OAuthBroker = broker_with_empty_store(&dir);

        // nothing stored at all
        assert!(matches!(
            broker.refresh_access_token().await,
            Err(AuthError::Required)
        ));

        // access token stored but no refresh token; never reaches the wire
        let store: TokenStore = TokenStore::at_path(dir.path().join("tokens.json"));
        store
            .save(&StoredTokens {
                access_token: "at-only".to_string(),
                refresh_token: None,
            })
            .await
            .expect("save");
        assert!(matches!(
            broker.refresh_access_token().await,
            Err(AuthError::Required)
        ));
    }

    #[tokio::test]
    async fn stored_token_is_returned_as_is() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store: TokenStore = TokenStore::at_path(dir.path().join("tokens.json"));
        store
            .save(&StoredTokens {
                access_token: "at-123".to_string(),
                refresh_token: Some("rt-456".to_string()),
            })
            .await
            .expect("save");

        let broker: OAuthBroker = OAuthBroker::new(OAuthConfig::default(), store);
        let token: AccessToken = broker.valid_access_token().await.expect("token");
        assert_eq!(token.as_str(), "at-123");
    }
}
