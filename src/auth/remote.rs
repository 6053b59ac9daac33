//! Client for the remote identity service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::errors::AuthError;
use super::types::{Credentials, RefreshRequest, TokenPair};

/// Login and refresh endpoints of the identity service.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST {base}/auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthError>;

    /// `POST {base}/auth/refresh`
    async fn refresh(&self, request: &RefreshRequest) -> Result<TokenPair, AuthError>;
}

/// [`AuthApi`] over HTTP. One attempt per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

impl HttpAuthApi {
    /// Create a client for the identity service rooted at `base_url`
    /// (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<TokenPair, AuthError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(url = %url, "Calling identity service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(AuthError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected(status));
        }

        response
            .json::<TokenPair>()
            .await
            .map_err(AuthError::InvalidResponse)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthError> {
        self.post_json("/auth/login", credentials).await
    }

    async fn refresh(&self, request: &RefreshRequest) -> Result<TokenPair, AuthError> {
        self.post_json("/auth/refresh", request).await
    }
}
