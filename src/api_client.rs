//! Authorized JSON client for downstream services.
//!
//! Every request carries `Authorization: Bearer <token>` when the orchestrator
//! can produce a valid token. A 401 is reported as
//! [`ApiClientError::Unauthorized`], whose [`ClientAction`] tells the caller
//! to send the user to the login page.

use std::sync::Arc;

use reqwest::{Client, Method, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::auth::{AuthOrchestrator, CredentialStore};
use crate::guard::LOGIN_PATH;

/// What the calling layer should do after a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    Proceed,
    Redirect { target: &'static str },
}

#[derive(Debug)]
pub enum ApiClientError {
    /// The service answered 401
    Unauthorized,
    /// Any other non-success status
    Status(StatusCode),
    /// The service could not be reached
    Transport(reqwest::Error),
    /// The response body could not be decoded
    Decode(reqwest::Error),
}

impl ApiClientError {
    /// Navigation the caller should perform for this error.
    pub fn action(&self) -> ClientAction {
        match self {
            ApiClientError::Unauthorized => ClientAction::Redirect { target: LOGIN_PATH },
            _ => ClientAction::Proceed,
        }
    }
}

impl std::fmt::Display for ApiClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiClientError::Unauthorized => write!(f, "Unauthorized"),
            ApiClientError::Status(status) => write!(f, "API Error: {}", status.as_u16()),
            ApiClientError::Transport(e) => write!(f, "API request failed: {}", e),
            ApiClientError::Decode(e) => write!(f, "Invalid API response: {}", e),
        }
    }
}

impl std::error::Error for ApiClientError {}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth: Arc<AuthOrchestrator>,
}

impl ApiClient {
    pub fn new(base_url: &str, auth: Arc<AuthOrchestrator>) -> Self {
        Self::with_client(Client::new(), base_url, auth)
    }

    pub fn with_client(http: Client, base_url: &str, auth: Arc<AuthOrchestrator>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// Send a JSON request to `{base}{endpoint}` and decode the JSON response.
    pub async fn request<T, B, S>(
        &self,
        store: &S,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
        S: CredentialStore + ?Sized,
    {
        let token = self.auth.get_valid_token(store).await;
        self.request_with_token(token.as_deref(), method, endpoint, body)
            .await
    }

    /// Like [`request`](Self::request), with a token the caller already
    /// resolved for this request. Never touches the identity service.
    pub async fn request_with_token<T, B>(
        &self,
        token: Option<&str>,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(method = %method, url = %url, authorized = token.is_some(), "API request");

        let mut builder = self
            .http
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ApiClientError::Transport)?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(ApiClientError::Unauthorized),
            status if !status.is_success() => Err(ApiClientError::Status(status)),
            _ => response.json().await.map_err(ApiClientError::Decode),
        }
    }

    pub async fn get<T, S>(&self, store: &S, endpoint: &str) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        S: CredentialStore + ?Sized,
    {
        self.request::<T, (), S>(store, Method::GET, endpoint, None)
            .await
    }

    pub async fn post<T, B, S>(
        &self,
        store: &S,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
        S: CredentialStore + ?Sized,
    {
        self.request(store, Method::POST, endpoint, body).await
    }

    pub async fn put<T, B, S>(
        &self,
        store: &S,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
        S: CredentialStore + ?Sized,
    {
        self.request(store, Method::PUT, endpoint, body).await
    }

    pub async fn delete<T, S>(&self, store: &S, endpoint: &str) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        S: CredentialStore + ?Sized,
    {
        self.request::<T, (), S>(store, Method::DELETE, endpoint, None)
            .await
    }
}
