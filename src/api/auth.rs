//! Authentication endpoints.
//!
//! - POST `/login` - Exchange credentials for a token pair stored in cookies
//! - POST `/refresh` - Rotate the stored token pair
//! - POST `/logout` - Clear the credential cookies
//! - GET `/session` - Current session (user and authentication flag)

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;

use super::error::ApiError;
use crate::auth::{
    CookieJar, CredentialStore, Credentials, Session, UserRecord, persist_token_pair,
};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/session", get(session))
        .with_state(state)
}

#[derive(Serialize)]
struct UserResponse {
    user: UserRecord,
}

async fn login(
    State(state): State<AppState>,
    mut jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<(CookieJar, Json<UserResponse>), ApiError> {
    let pair = state.auth.login(&credentials).await?;

    persist_token_pair(&mut jar, &pair, state.refresh_max_age)
        .map_err(|e| ApiError::cookie_error("Failed to serialize user", e))?;

    Ok((jar, Json(UserResponse { user: pair.user })))
}

async fn refresh(
    State(state): State<AppState>,
    mut jar: CookieJar,
) -> Result<(CookieJar, Json<UserResponse>), ApiError> {
    let pair = state
        .auth
        .refresh(&jar)
        .await
        .ok_or_else(|| ApiError::unauthorized("Could not refresh"))?;

    persist_token_pair(&mut jar, &pair, state.refresh_max_age)
        .map_err(|e| ApiError::cookie_error("Failed to serialize user", e))?;

    Ok((jar, Json(UserResponse { user: pair.user })))
}

async fn logout(mut jar: CookieJar) -> (CookieJar, StatusCode) {
    jar.clear_credentials();
    (jar, StatusCode::NO_CONTENT)
}

async fn session(State(state): State<AppState>, jar: CookieJar) -> Json<Session> {
    Json(state.auth.session(&jar).await)
}
