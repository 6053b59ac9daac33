//! Bearer token decoding and expiry checks.
//!
//! Tokens are decoded WITHOUT verifying their signature, issuer or algorithm.
//! The claims are advisory: they drive refresh scheduling and route decisions,
//! but nothing here proves that the issuer produced them.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Refresh-ahead window: tokens expiring within 5 minutes are refreshed.
pub const REFRESH_AHEAD_SECS: i64 = 5 * 60;

/// Claims carried in a token payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiration time (Unix timestamp, fractional seconds allowed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Any other claims the issuer included
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// True if the token carries an expiry at or before `now`.
    pub fn is_expired(&self, now: f64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }

    /// True if the token carries an expiry less than `window_secs` away from `now`.
    /// Already expired tokens are included.
    pub fn expires_within(&self, now: f64, window_secs: i64) -> bool {
        self.exp.is_some_and(|exp| exp - now < window_secs as f64)
    }

    /// True if the expiry lies strictly before `now`.
    pub fn has_lapsed(&self, now: f64) -> bool {
        self.exp.is_some_and(|exp| exp < now)
    }

    /// True if the token carries an expiry strictly after `now`.
    pub fn is_live(&self, now: f64) -> bool {
        self.exp.is_some_and(|exp| exp > now)
    }
}

/// Decode the payload segment of a `header.payload.signature` token.
pub fn decode(token: &str) -> Result<TokenClaims, TokenError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(header), Some(payload)) if !header.is_empty() && !payload.is_empty() => payload,
        _ => return Err(TokenError::MissingPayload),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(TokenError::Base64)?;

    serde_json::from_slice(&bytes).map_err(TokenError::Json)
}

/// Errors that can occur while decoding a token.
#[derive(Debug)]
pub enum TokenError {
    /// The token has no payload segment
    MissingPayload,
    /// The payload is not valid base64url
    Base64(base64::DecodeError),
    /// The payload is not a JSON claims object
    Json(serde_json::Error),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::MissingPayload => write!(f, "Malformed token: missing payload"),
            TokenError::Base64(e) => write!(f, "Malformed token: invalid encoding: {}", e),
            TokenError::Json(e) => write!(f, "Malformed token: invalid claims: {}", e),
        }
    }
}

impl std::error::Error for TokenError {}
