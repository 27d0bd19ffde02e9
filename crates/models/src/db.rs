use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(3600),
            sqlx_logging: false,
        }
    }
}

impl DatabaseConfig {
    /// Single-connection in-memory SQLite; each sqlite memory connection is a separate database.
    pub fn in_memory() -> Self {
        Self { url: "sqlite::memory:".to_string(), max_connections: 1, min_connections: 1, ..Self::default() }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }
}

impl From<&configs::DatabaseConfig> for DatabaseConfig {
    fn from(cfg: &configs::DatabaseConfig) -> Self {
        Self {
            url: cfg.url.clone(),
            max_connections: cfg.max_connections,
            min_connections: cfg.min_connections,
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.acquire_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.idle_timeout_secs),
            max_lifetime: Duration::from_secs(cfg.max_lifetime_secs),
            sqlx_logging: cfg.sqlx_logging,
        }
    }
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(cfg.connect_timeout)
        .acquire_timeout(cfg.acquire_timeout)
        .idle_timeout(cfg.idle_timeout)
        .max_lifetime(cfg.max_lifetime)
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opts).await?;
    info!(max_connections = cfg.max_connections, sqlite = cfg.is_sqlite(), "database connected");
    Ok(db)
}
