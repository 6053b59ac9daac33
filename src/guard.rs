//! Route guard: decides whether a request may reach its page.
//!
//! [`decide`] is a pure function of the path, the raw access token and the
//! current time. [`route_guard`] is the axum middleware that executes the
//! decision, clearing credential cookies when told to.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::auth::{ACCESS_COOKIE_NAME, CookieJar, CredentialStore, HasAuthState};
use crate::clock::Clock;
use crate::token;

/// Paths that require a valid, unexpired token.
pub const PROTECTED_PREFIXES: [&str; 3] = ["/dashboard", "/profile", "/admin"];

/// Paths meant only for unauthenticated users.
pub const AUTH_ONLY_PREFIXES: [&str; 2] = ["/login", "/register"];

/// Paths the guard never looks at: the API namespace, static assets, the favicon.
pub const EXCLUDED_PREFIXES: [&str; 3] = ["/api", "/static", "/favicon.ico"];

/// Login surface.
pub const LOGIN_PATH: &str = "/login";

/// Landing page for authenticated users.
pub const HOME_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Protected,
    AuthOnly,
    Neutral,
}

/// Classify a path by prefix.
pub fn classify(path: &str) -> RouteClass {
    if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteClass::Protected
    } else if AUTH_ONLY_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteClass::AuthOnly
    } else {
        RouteClass::Neutral
    }
}

/// True if the guard applies to this path at all.
pub fn is_intercepted(path: &str) -> bool {
    !EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Redirect {
        target: &'static str,
        /// Remove all three credential cookies along with the redirect
        clear_cookies: bool,
    },
}

impl Decision {
    fn to_login(clear_cookies: bool) -> Self {
        Decision::Redirect {
            target: LOGIN_PATH,
            clear_cookies,
        }
    }
}

/// Decide what to do with a request for `path` carrying `token` at time `now`.
pub fn decide(path: &str, token: Option<&str>, now: f64) -> Decision {
    match classify(path) {
        RouteClass::Protected => {
            let Some(token) = token else {
                return Decision::to_login(false);
            };
            match token::decode(token) {
                Err(_) => Decision::to_login(true),
                Ok(claims) if claims.has_lapsed(now) => Decision::to_login(true),
                Ok(_) => Decision::Continue,
            }
        }
        RouteClass::AuthOnly => match token.map(token::decode) {
            Some(Ok(claims)) if claims.is_live(now) => Decision::Redirect {
                target: HOME_PATH,
                clear_cookies: false,
            },
            _ => Decision::Continue,
        },
        RouteClass::Neutral => Decision::Continue,
    }
}

/// Middleware applying [`decide`] to every intercepted request.
pub async fn route_guard<S>(State(state): State<S>, request: Request, next: Next) -> Response
where
    S: HasAuthState + Clone + Send + Sync + 'static,
{
    let path = request.uri().path();
    if !is_intercepted(path) {
        return next.run(request).await;
    }

    let mut jar = CookieJar::from_headers(request.headers(), state.cookie_options());
    let now = state.auth().clock().unix_now();
    let decision = decide(path, jar.get(ACCESS_COOKIE_NAME), now);

    match decision {
        Decision::Continue => next.run(request).await,
        Decision::Redirect {
            target,
            clear_cookies,
        } => {
            debug!(path = %path, redirect_to = target, clear_cookies, "Route guard redirect");
            if clear_cookies {
                jar.clear_credentials();
            }
            (jar, Redirect::temporary(target)).into_response()
        }
    }
}
