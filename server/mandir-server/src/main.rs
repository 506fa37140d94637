use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use error_common::{MandirError, Result};
use mandir_server::{create_app, server::ServerConfig, MandirServer};

/// Mandir ERP HTTP Server
#[derive(Parser, Debug)]
#[command(name = "mandir-server")]
#[command(about = "Temple management platform HTTP API server")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8080", env = "MANDIR_PORT")]
    port: u16,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// JWT signing secret
    #[arg(long, env = "MANDIR_JWT_SECRET")]
    jwt_secret: String,

    /// Access token lifetime in seconds
    #[arg(long, default_value = "28800", env = "MANDIR_TOKEN_TTL")]
    token_ttl: i64,

    /// Maximum database connections
    #[arg(long, default_value = "20", env = "MANDIR_DB_MAX_CONNECTIONS")]
    max_connections: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    info!("Starting Mandir ERP HTTP Server");
    info!(version = env!("CARGO_PKG_VERSION"), "Build");

    let config = ServerConfig {
        name: "Mandir ERP".to_string(),
        database_url: args.database_url,
        jwt_secret: args.jwt_secret,
        token_ttl_seconds: args.token_ttl,
        max_connections: args.max_connections,
    };

    let server = MandirServer::new(config)
        .await
        .map_err(|e| MandirError::ServerError(format!("Server init failed: {}", e)))?;

    let app = create_app(server);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MandirError::NetworkError(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Mandir ERP server running on http://{}:{}", args.host, args.port);
    info!("Health check: http://{}:{}/health", args.host, args.port);
    info!("API v1: http://{}:{}/api/v1", args.host, args.port);
    info!("Swagger UI: http://{}:{}/docs", args.host, args.port);

    axum::serve(listener, app)
        .await
        .map_err(|e| MandirError::ServerError(format!("HTTP server error: {}", e)))?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "mandir_server={level},accounting_service={level},tower_http=info,sqlx=warn",
            level = default_level
        )
        .into()
    });

    let is_production =
        std::env::var("MANDIR_ENV").unwrap_or_else(|_| "development".to_string()) == "production";

    if is_production {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .json(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true),
            )
            .init();
    }
}
