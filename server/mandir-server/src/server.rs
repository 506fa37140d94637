use anyhow::Result;
use database_layer::DatabasePool;
use sqlx::PgPool;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name
    pub name: String,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Secret used to sign and verify JWT access tokens
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub token_ttl_seconds: i64,
    /// Maximum database connections
    pub max_connections: u32,
}

/// Main Mandir server state, shared by every handler
#[derive(Clone)]
pub struct MandirServer {
    /// Server configuration
    pub config: ServerConfig,
    /// Database pool wrapper
    pub database: DatabasePool,
    /// Raw pool handle for sqlx queries
    pub db_pool: PgPool,
}

impl MandirServer {
    /// Create a new server instance and connect the database pool
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let database =
            DatabasePool::with_max_connections(&config.database_url, config.max_connections)
                .await?;
        let db_pool = database.pool().clone();

        Ok(Self {
            config,
            database,
            db_pool,
        })
    }
}
