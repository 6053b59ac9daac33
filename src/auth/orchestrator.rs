//! Token lifecycle: login, refresh, and refresh-ahead token reads.
//!
//! The orchestrator never writes to the credential store. Pairs returned by
//! [`AuthOrchestrator::login`] and [`AuthOrchestrator::refresh`] are persisted
//! by the caller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cookie::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, USER_COOKIE_NAME};
use super::errors::AuthError;
use super::remote::AuthApi;
use super::store::CredentialStore;
use super::types::{Credentials, RefreshRequest, Session, TokenPair, UserRecord};
use crate::clock::Clock;
use crate::token::{self, REFRESH_AHEAD_SECS};

/// Outcome of a successful token lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedToken {
    /// The stored token is outside the refresh-ahead window
    Current(String),
    /// The stored token was refreshed; the new pair is not yet persisted
    Refreshed(TokenPair),
}

impl ResolvedToken {
    pub fn into_token(self) -> String {
        match self {
            ResolvedToken::Current(token) => token,
            ResolvedToken::Refreshed(pair) => pair.access_token,
        }
    }
}

pub struct AuthOrchestrator {
    api: Arc<dyn AuthApi>,
    clock: Arc<dyn Clock>,
}

impl AuthOrchestrator {
    pub fn new(api: Arc<dyn AuthApi>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Exchange credentials for a token pair. Single attempt.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthError> {
        let pair = self.api.login(credentials).await?;
        info!(user = %pair.user.id, tenant = %pair.user.tenant_id, "Login succeeded");
        Ok(pair)
    }

    /// Exchange the stored token pair for a new one.
    ///
    /// Returns `None` without calling the identity service when either token is
    /// missing, and `None` on any refresh failure.
    pub async fn refresh<S: CredentialStore + ?Sized>(&self, store: &S) -> Option<TokenPair> {
        let (Some(token), Some(refresh_token)) =
            (store.get(ACCESS_COOKIE_NAME), store.get(REFRESH_COOKIE_NAME))
        else {
            debug!("No stored token pair to refresh");
            return None;
        };

        let request = RefreshRequest {
            token: token.to_string(),
            refresh_token: refresh_token.to_string(),
        };

        match self.api.refresh(&request).await {
            Ok(pair) => {
                debug!(user = %pair.user.id, "Token refreshed");
                Some(pair)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                None
            }
        }
    }

    /// Return an access token that is not known to expire within the
    /// refresh-ahead window, refreshing if needed.
    pub async fn get_valid_token<S: CredentialStore + ?Sized>(&self, store: &S) -> Option<String> {
        self.resolve_token(store).await.map(ResolvedToken::into_token)
    }

    /// Like [`get_valid_token`](Self::get_valid_token), but hands back the
    /// whole pair when a refresh happened so the caller can persist it.
    pub async fn resolve_token<S: CredentialStore + ?Sized>(
        &self,
        store: &S,
    ) -> Option<ResolvedToken> {
        let token = store.get(ACCESS_COOKIE_NAME)?;

        let needs_refresh = match token::decode(token) {
            Ok(claims) => claims.expires_within(self.clock.unix_now(), REFRESH_AHEAD_SECS),
            Err(e) => {
                debug!(error = %e, "Stored access token is malformed");
                true
            }
        };

        if !needs_refresh {
            return Some(ResolvedToken::Current(token.to_string()));
        }

        self.refresh(store).await.map(ResolvedToken::Refreshed)
    }

    /// Read the cached user record.
    pub fn get_current_user<S: CredentialStore + ?Sized>(&self, store: &S) -> Option<UserRecord> {
        let raw = store.get(USER_COOKIE_NAME)?;
        match serde_json::from_str(raw) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!(error = %e, "Cached user record is unreadable");
                None
            }
        }
    }

    /// Derive the session for the current request.
    pub async fn session<S: CredentialStore + ?Sized>(&self, store: &S) -> Session {
        let user = self.get_current_user(store);
        let token = self.get_valid_token(store).await;
        Session::new(user, token)
    }
}
