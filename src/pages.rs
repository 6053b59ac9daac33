//! Page endpoints behind the route guard.
//!
//! Pages render as small JSON documents; the guard has already decided that
//! the request may reach them.

use axum::{
    Json, Router,
    extract::State,
    http::Method,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::api_client::ClientAction;
use crate::auth::{CookieJar, ResolvedToken, Session, UserRecord, persist_token_pair};
use crate::state::AppState;

/// Downstream endpoint backing the profile page.
const PROFILE_ENDPOINT: &str = "/users/me";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page))
        .route("/register", get(register_page))
        .route("/dashboard", get(dashboard))
        .route("/admin", get(admin))
        .route("/profile", get(profile))
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    page: &'static str,
    is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<Value>,
}

impl Page {
    fn new(page: &'static str, session: Session) -> Self {
        Self {
            page,
            is_authenticated: session.is_authenticated,
            user: session.user,
            profile: None,
        }
    }
}

/// Derive the session, persisting the new pair if the access token was
/// refreshed on the way.
async fn load_session(state: &AppState, jar: &mut CookieJar) -> Session {
    let mut user = state.auth.get_current_user(&*jar);

    let resolved = state.auth.resolve_token(&*jar).await;
    let token = match resolved {
        Some(ResolvedToken::Refreshed(pair)) => {
            if let Err(e) = persist_token_pair(jar, &pair, state.refresh_max_age) {
                warn!(error = %e, "Failed to persist refreshed tokens");
            }
            user = Some(pair.user);
            Some(pair.access_token)
        }
        Some(ResolvedToken::Current(token)) => Some(token),
        None => None,
    };

    Session::new(user, token)
}

async fn home(State(state): State<AppState>, mut jar: CookieJar) -> (CookieJar, Json<Page>) {
    let session = load_session(&state, &mut jar).await;
    (jar, Json(Page::new("home", session)))
}

async fn login_page() -> Json<Page> {
    Json(Page::new("login", Session::new(None, None)))
}

async fn register_page() -> Json<Page> {
    Json(Page::new("register", Session::new(None, None)))
}

async fn dashboard(State(state): State<AppState>, mut jar: CookieJar) -> (CookieJar, Json<Page>) {
    let session = load_session(&state, &mut jar).await;
    (jar, Json(Page::new("dashboard", session)))
}

async fn admin(State(state): State<AppState>, mut jar: CookieJar) -> (CookieJar, Json<Page>) {
    let session = load_session(&state, &mut jar).await;
    (jar, Json(Page::new("admin", session)))
}

/// Profile page: cached user plus the downstream profile document.
/// A 401 from downstream sends the user to the login page.
async fn profile(State(state): State<AppState>, mut jar: CookieJar) -> Response {
    let session = load_session(&state, &mut jar).await;
    let token = session.token.clone();
    let mut page = Page::new("profile", session);

    // Already resolved: at most one refresh per request
    let profile = state
        .api
        .request_with_token::<Value, ()>(token.as_deref(), Method::GET, PROFILE_ENDPOINT, None)
        .await;
    match profile {
        Ok(profile) => page.profile = Some(profile),
        Err(e) => match e.action() {
            ClientAction::Redirect { target } => {
                return (jar, Redirect::temporary(target)).into_response();
            }
            ClientAction::Proceed => warn!(error = %e, "Failed to load profile"),
        },
    }

    (jar, Json(page)).into_response()
}
