//! Bearer token lifecycle backed by cookies.
//!
//! The identity service issues an access/refresh token pair. Handlers persist
//! the pair into three HTTP-only cookies; the orchestrator reads them back,
//! refreshing the access token when it is malformed or expires within the
//! refresh-ahead window.

mod cookie;
mod errors;
mod orchestrator;
mod remote;
mod state;
mod store;
mod types;

pub use cookie::{
    ACCESS_COOKIE_NAME, CREDENTIAL_COOKIES, CookieOptions, DEFAULT_REFRESH_MAX_AGE_SECS,
    REFRESH_COOKIE_NAME, USER_COOKIE_NAME,
};
pub use errors::AuthError;
pub use orchestrator::{AuthOrchestrator, ResolvedToken};
pub use remote::{AuthApi, HttpAuthApi};
pub use state::HasAuthState;
pub use store::{CookieJar, CredentialStore, persist_token_pair};
pub use types::{Credentials, RefreshRequest, Session, TokenPair, UserRecord};
