//! Cookie names and `Set-Cookie` formatting for credentials.

/// Cookie name for the access token.
pub const ACCESS_COOKIE_NAME: &str = "auth-token";

/// Cookie name for the refresh token.
pub const REFRESH_COOKIE_NAME: &str = "refresh-token";

/// Cookie name for the cached, JSON-serialized user record.
pub const USER_COOKIE_NAME: &str = "user-info";

/// All credential cookies. Cleared together, never one at a time.
pub const CREDENTIAL_COOKIES: [&str; 3] = [ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, USER_COOKIE_NAME];

/// Default lifetime of the refresh token and user cookies: 7 days.
pub const DEFAULT_REFRESH_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Attributes applied to every credential cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieOptions {
    /// Add the `Secure` attribute (production deployments behind HTTPS)
    pub secure: bool,
}

impl CookieOptions {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Format a `Set-Cookie` value. The value is percent-encoded.
    pub fn set_cookie(&self, name: &str, value: &str, max_age: i64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
            name,
            urlencoding::encode(value),
            max_age.max(0),
            secure
        )
    }

    /// Format a `Set-Cookie` value that deletes the cookie.
    pub fn clear_cookie(&self, name: &str) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0{}",
            name, secure
        )
    }
}
