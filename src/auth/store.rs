//! Request-scoped credential storage.
//!
//! Credentials live in three cookies. A [`CookieJar`] is built from the inbound
//! `Cookie` header, and every write or removal is queued as a `Set-Cookie`
//! header for the outbound response.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header, request::Parts},
    response::{IntoResponseParts, ResponseParts},
};
use tracing::warn;

use super::cookie::{
    ACCESS_COOKIE_NAME, CREDENTIAL_COOKIES, CookieOptions, REFRESH_COOKIE_NAME, USER_COOKIE_NAME,
};
use super::state::HasAuthState;
use super::types::TokenPair;

/// Key/value store holding the credentials of a single request.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<&str>;
    fn set(&mut self, key: &str, value: &str, max_age: i64);
    fn remove(&mut self, key: &str);

    /// Remove the access token, refresh token and cached user together.
    fn clear_credentials(&mut self) {
        for name in CREDENTIAL_COOKIES {
            self.remove(name);
        }
    }
}

/// Cookie-backed [`CredentialStore`].
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    values: HashMap<String, String>,
    outgoing: Vec<String>,
    options: CookieOptions,
}

impl CookieJar {
    /// Create an empty jar.
    pub fn new(options: CookieOptions) -> Self {
        Self {
            values: HashMap::new(),
            outgoing: Vec::new(),
            options,
        }
    }

    /// Read the credential cookies from request headers.
    /// Values are percent-decoded; undecodable values are kept raw.
    pub fn from_headers(headers: &HeaderMap, options: CookieOptions) -> Self {
        let mut jar = Self::new(options);
        for header_value in headers.get_all(header::COOKIE) {
            let Ok(cookies) = header_value.to_str() else {
                continue;
            };
            for part in cookies.split(';') {
                let Some((key, value)) = part.trim().split_once('=') else {
                    continue;
                };
                let key = key.trim();
                if !CREDENTIAL_COOKIES.contains(&key) || jar.values.contains_key(key) {
                    continue;
                }
                let value = value.trim();
                let decoded = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                if !decoded.is_empty() {
                    jar.values.insert(key.to_string(), decoded);
                }
            }
        }
        jar
    }

    /// Pending `Set-Cookie` header values, in the order they were queued.
    pub fn outgoing(&self) -> &[String] {
        &self.outgoing
    }

    /// Append the pending `Set-Cookie` headers to a header map.
    pub fn write_to(&self, headers: &mut HeaderMap) {
        for cookie in &self.outgoing {
            match HeaderValue::from_str(cookie) {
                Ok(value) => {
                    headers.append(header::SET_COOKIE, value);
                }
                Err(e) => warn!(error = %e, "Dropping invalid Set-Cookie header"),
            }
        }
    }
}

impl CredentialStore for CookieJar {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: &str, max_age: i64) {
        self.outgoing
            .push(self.options.set_cookie(key, value, max_age));
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.outgoing.push(self.options.clear_cookie(key));
        self.values.remove(key);
    }
}

impl<S> FromRequestParts<S> for CookieJar
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(CookieJar::from_headers(&parts.headers, state.cookie_options()))
    }
}

impl IntoResponseParts for CookieJar {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.write_to(res.headers_mut());
        Ok(res)
    }
}

/// Persist a freshly issued token pair.
///
/// All three cookies live for `refresh_max_age` seconds. The access token's
/// own `exp` claim decides when it needs refreshing, so it must outlive its
/// expiry for the refresh to be possible.
pub fn persist_token_pair<S: CredentialStore + ?Sized>(
    store: &mut S,
    pair: &TokenPair,
    refresh_max_age: i64,
) -> Result<(), serde_json::Error> {
    let user = serde_json::to_string(&pair.user)?;

    store.set(ACCESS_COOKIE_NAME, &pair.access_token, refresh_max_age);
    store.set(REFRESH_COOKIE_NAME, &pair.refresh_token, refresh_max_age);
    store.set(USER_COOKIE_NAME, &user, refresh_max_age);
    Ok(())
}
