//! CCTV Request Service - Main Entry Point

mod settings;
mod wiring;

use anyhow::Result;
use cctv_api_rpc::{request_body_limit, RpcServer, RpcServerConfig};
use cctv_infra_sqlite::{create_pool, run_migrations};
use settings::Settings;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging() -> Result<()> {
    let log_format = std::env::var("CCTV_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("cctv=info"))?;

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    init_logging()?;
    info!("CCTV request service v{} starting...", VERSION);

    // 2. Configuration
    let settings = Settings::load()?;

    // 3. Database
    wiring::ensure_database_dir(&settings)?;
    info!(url = %settings.database.url, "Initializing database...");
    let pool = create_pool(&settings.database.url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. DI wiring
    let service = Arc::new(wiring::build_service(&settings, pool.clone())?);
    info!(
        policy = ?service.policy(),
        utc_offset_hours = settings.lifecycle.utc_offset_hours,
        "Request service ready"
    );

    // 5. JSON-RPC server
    let staff_token = settings.rpc.staff_token.clone().filter(|t| !t.is_empty());
    if staff_token.is_none() {
        warn!("No staff token configured; staff methods are open to any caller");
    }
    let rpc_config = RpcServerConfig {
        host: settings.rpc.host.clone(),
        port: settings.rpc.port,
        staff_token,
        rate_limit_burst: settings.rpc.rate_limit_burst,
        rate_limit_per_sec: settings.rpc.rate_limit_per_sec,
        max_request_body_size: request_body_limit(&settings.upload.limits()),
        max_response_body_size: settings.rpc.max_response_body_size,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, service)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}
