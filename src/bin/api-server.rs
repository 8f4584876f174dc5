//! findscan API Server
//!
//! Loads the OHLCV batch once and serves the bar series, Bollinger Bands
//! and chart overlay directives over HTTP.

use dotenvy::dotenv;
use findscan::config::ServerConfig;
use findscan::core::http::start_server;
use findscan::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = ServerConfig::from_env();
    let env = findscan::config::get_environment();
    info!("Starting findscan API Server");
    info!(environment = %env, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);
    info!(data_path = %config.data_path.display(), "OHLCV data source");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
            info!("API server stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
