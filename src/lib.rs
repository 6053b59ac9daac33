pub mod api;
pub mod api_client;
pub mod auth;
pub mod cli;
pub mod clock;
pub mod guard;
pub mod pages;
pub mod state;
pub mod token;

use std::net::SocketAddr;
use std::sync::Arc;

use api::create_api_router;
use api_client::ApiClient;
use auth::{AuthOrchestrator, CookieOptions, HttpAuthApi};
use axum::{Router, http::StatusCode, middleware};
use clock::SystemClock;
use state::AppState;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Base URL of the identity service and downstream API (e.g., "http://localhost:5000/api")
    pub api_url: String,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
    /// Lifetime of the refresh token and cached user cookies, in seconds
    pub refresh_max_age: i64,
}

/// Build the shared state for a deployment talking to the real identity service.
pub fn build_state(config: &ServerConfig) -> AppState {
    let http = reqwest::Client::new();

    let auth = Arc::new(AuthOrchestrator::new(
        Arc::new(HttpAuthApi::with_client(http.clone(), &config.api_url)),
        Arc::new(SystemClock),
    ));

    AppState {
        api: ApiClient::with_client(http, &config.api_url, auth.clone()),
        auth,
        cookies: CookieOptions::new(config.secure_cookies),
        refresh_max_age: config.refresh_max_age,
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    create_router(build_state(config))
}

/// Assemble the router around an existing state.
///
/// The route guard wraps every route, including the fallback, so unknown
/// paths under a protected prefix are still redirected.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_api_router(state.clone()))
        .merge(pages::router(state.clone()))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn_with_state(
            state,
            guard::route_guard::<AppState>,
        ))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
