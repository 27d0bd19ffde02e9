#![cfg(test)]
use std::sync::Arc;
use std::time::Duration;

use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use sea_orm::DatabaseConnection;

use crate::auth::domain::App;
use crate::auth::password::Argon2Params;
use crate::auth::repository::mock::MockAuthRepository;
use crate::auth::{AuthConfig, AuthService};

/// Fresh in-memory database with migrations applied; every test gets its own.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&DatabaseConfig::in_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Low-cost hashing so tests stay fast.
pub fn fast_config() -> AuthConfig {
    AuthConfig { token_ttl: Duration::from_secs(3600), hashing: Argon2Params::new(1024, 1, 1) }
}

pub fn test_app() -> App {
    App { id: 1, name: "test".into(), secret: "test-secret".into() }
}

pub type MockService = AuthService<MockAuthRepository, MockAuthRepository, MockAuthRepository>;

/// Service over a single mock repository that already knows `test_app()`.
pub fn mock_service() -> (Arc<MockAuthRepository>, MockService) {
    let repo = Arc::new(MockAuthRepository::default());
    repo.insert_app(test_app());
    let svc = AuthService::new(tracing::Span::none(), repo.clone(), repo.clone(), repo.clone(), fast_config());
    (repo, svc)
}
