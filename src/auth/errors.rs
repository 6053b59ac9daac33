//! Authentication error types.

use axum::http::StatusCode;

/// Login failure. The only authentication failure surfaced as a hard error.
#[derive(Debug)]
pub enum AuthError {
    /// The identity service answered with a non-success status
    Rejected(StatusCode),
    /// The identity service could not be reached
    Transport(reqwest::Error),
    /// The identity service answered 200 with a body that is not a token pair
    InvalidResponse(reqwest::Error),
}

impl AuthError {
    /// True if the identity service rejected the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AuthError::Rejected(_))
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Rejected(status) => write!(f, "Login failed with status {}", status),
            AuthError::Transport(e) => write!(f, "Identity service unreachable: {}", e),
            AuthError::InvalidResponse(e) => write!(f, "Invalid identity service response: {}", e),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Rejected(_) => None,
            AuthError::Transport(e) | AuthError::InvalidResponse(e) => Some(e),
        }
    }
}
