//! Shared application state.

use std::sync::Arc;

use crate::api_client::ApiClient;
use crate::auth::{AuthOrchestrator, CookieOptions, HasAuthState};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthOrchestrator>,
    /// Client for downstream services, authorized through `auth`
    pub api: ApiClient,
    pub cookies: CookieOptions,
    pub refresh_max_age: i64,
}

impl HasAuthState for AppState {
    fn auth(&self) -> &AuthOrchestrator {
        &self.auth
    }

    fn cookie_options(&self) -> CookieOptions {
        self.cookies
    }
}
