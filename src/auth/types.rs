//! Authentication data types shared with the identity service.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login input. Never persisted.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
    pub tenant: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .field("tenant", &self.tenant)
            .finish()
    }
}

/// Token pair issued by login and refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Bearer access token
    #[serde(rename = "token")]
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of the access token
    #[serde(rename = "expires")]
    pub expires_at: DateTime<Utc>,
    pub user: UserRecord,
}

/// Snapshot of the authenticated user, cached in a cookie.
/// May go stale relative to the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tenant_id: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Integer-coded capabilities
    #[serde(default)]
    pub permissions: BTreeSet<i64>,
}

/// Body of the refresh call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub token: String,
    pub refresh_token: String,
}

/// Derived view of the current request's authentication state.
///
/// `is_authenticated` is true iff both user and token are present. The token
/// is not re-checked for expiry here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<UserRecord>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub is_authenticated: bool,
}

impl Session {
    pub fn new(user: Option<UserRecord>, token: Option<String>) -> Self {
        let is_authenticated = user.is_some() && token.is_some();
        Self {
            user,
            token,
            is_authenticated,
        }
    }
}
