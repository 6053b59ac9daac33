//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::auth::DEFAULT_REFRESH_MAX_AGE_SECS;
use clap::Parser;
use tracing::error;
use url::Url;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "authgate",
    about = "Cookie-based bearer token gateway with route guarding"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    pub port: u16,

    /// Base URL of the identity service and downstream API
    #[arg(long, env = "API_URL", default_value = "http://localhost:5000/api")]
    pub api_url: String,

    /// Set the Secure flag on credential cookies (enable in production behind HTTPS)
    #[arg(long, env = "SECURE_COOKIES")]
    pub secure_cookies: bool,

    /// Lifetime of the refresh token and cached user cookies, in seconds
    #[arg(long, default_value_t = DEFAULT_REFRESH_MAX_AGE_SECS, value_parser = clap::value_parser!(i64).range(1..))]
    pub refresh_max_age: i64,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Parse and validate the upstream API URL.
/// Returns None and logs an error if validation fails.
pub fn validate_api_url(api_url: &str) -> Option<Url> {
    let url = match Url::parse(api_url) {
        Ok(url) => url,
        Err(e) => {
            error!(url = %api_url, error = %e, "Invalid api-url");
            return None;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        error!(url = %api_url, "api-url must use http or https");
        return None;
    }

    if url.cannot_be_a_base() || url.host_str().is_none() {
        error!(url = %api_url, "api-url must include a host");
        return None;
    }

    Some(url)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(api_url: Url, secure_cookies: bool, refresh_max_age: i64) -> ServerConfig {
    ServerConfig {
        api_url: api_url.as_str().trim_end_matches('/').to_string(),
        secure_cookies,
        refresh_max_age,
    }
}
