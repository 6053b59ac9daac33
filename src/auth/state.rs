//! Authentication state trait.

use super::cookie::CookieOptions;
use super::orchestrator::AuthOrchestrator;

/// Trait for state types that provide the orchestrator and cookie settings
/// to handlers, extractors and the route guard.
pub trait HasAuthState {
    fn auth(&self) -> &AuthOrchestrator;
    fn cookie_options(&self) -> CookieOptions;
}
