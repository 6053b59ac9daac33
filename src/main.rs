use authgate::cli::{Args, build_config, init_logging, validate_api_url};
use authgate::create_app;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(api_url) = validate_api_url(&args.api_url) else {
        std::process::exit(1);
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = match listener.local_addr() {
        Ok(local_addr) => local_addr,
        Err(e) => {
            error!(error = %e, "Failed to read listener address");
            std::process::exit(1);
        }
    };

    let config = build_config(api_url, args.secure_cookies, args.refresh_max_age);
    let app = create_app(&config);

    info!(
        address = %local_addr,
        api_url = %config.api_url,
        secure_cookies = config.secure_cookies,
        "Listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
