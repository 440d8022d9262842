//! QA Dashboard API server binary.

use std::net::SocketAddr;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "qadash_server", about = "QA Dashboard API server")]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 8001)]
    port: u16,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/qadash"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 10)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,qadash_api=debug,qadash_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    info!(port = args.port, host = %args.host, "starting qadash_server");
    info!(max_connections = args.max_connections, "configuring connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    qadash_api::migrate(&pool).await?;

    let config = qadash_api::config::ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        pg_connection_url: args.database_url,
        ..qadash_api::config::ApiConfig::from_env()
    };
    if config.mail.provider == "log" {
        warn!("no mail provider configured; reset and invite links are written to the log");
    }
    if !config.rate_limit_enabled {
        warn!("rate limiting is disabled");
    }

    let bind_addr = config.bind_addr.clone();
    let app = qadash_api::router(qadash_api::AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    // Connect info feeds the per-IP rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
