use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use sea_orm::DatabaseConnection;
use tracing::{info, info_span};

use configs::{AppConfig, AuthSettings};
use service::auth::{password::Argon2Params, repo::SeaOrmAuthRepository, AuthConfig, AuthService};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

pub fn auth_config(settings: &AuthSettings) -> AuthConfig {
    AuthConfig {
        token_ttl: Duration::from_secs(settings.token_ttl_secs),
        hashing: Argon2Params::new(
            settings.argon2_memory_kib,
            settings.argon2_iterations,
            settings.argon2_parallelism,
        ),
    }
}

/// Wire the auth service over an existing connection.
pub fn state_from_db(db: DatabaseConnection, cfg: AuthConfig) -> ServerState {
    let repo = Arc::new(SeaOrmAuthRepository::new(db));
    let service = AuthService::new(
        info_span!("auth_service"),
        Arc::clone(&repo),
        Arc::clone(&repo),
        repo,
        cfg,
    );
    ServerState { auth: Arc::new(service) }
}

pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    let db_cfg = models::db::DatabaseConfig::from(&cfg.database);
    let db = models::db::connect_with_config(&db_cfg).await?;
    Ok(state_from_db(db, auth_config(&cfg.auth)))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Build the app and serve until `shutdown` resolves
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = bind_addr(&cfg)?;
    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.to_string(), source })?;
    info!(%addr, "sso server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    info!("sso server stopped");
    Ok(())
}
