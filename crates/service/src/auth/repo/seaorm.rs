use sea_orm::DatabaseConnection;

use models::errors::ModelError;

use crate::auth::domain::{App, User};
use crate::auth::errors::{AuthError, AuthErrorKind};
use crate::auth::repository::{AppProvider, UserProvider, UserSaver};

/// SeaORM implementation of all three persistence capabilities.
///
/// Driver errors are classified here; nothing above this type sees a `DbErr`.
#[derive(Clone)]
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_user(m: models::user::Model) -> User {
    User { id: m.id, email: m.email, password_hash: m.password_hash, is_admin: m.is_admin }
}

#[async_trait::async_trait]
impl UserSaver for SeaOrmAuthRepository {
    async fn save_user(&self, email: &str, password_hash: &str) -> Result<i64, AuthError> {
        const OP: &str = "storage.save_user";
        models::user::create(&self.db, email, password_hash)
            .await
            .map_err(|e| match e {
                ModelError::Conflict(_) => AuthError::at(OP, AuthErrorKind::UserExists),
                other => AuthError::storage(OP, other),
            })
    }
}

#[async_trait::async_trait]
impl UserProvider for SeaOrmAuthRepository {
    async fn user(&self, email: &str) -> Result<User, AuthError> {
        const OP: &str = "storage.user";
        models::user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::storage(OP, e))?
            .map(to_user)
            .ok_or_else(|| AuthError::at(OP, AuthErrorKind::UserNotFound))
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        const OP: &str = "storage.is_admin";
        models::user::find_by_id(&self.db, user_id)
            .await
            .map_err(|e| AuthError::storage(OP, e))?
            .map(|u| u.is_admin)
            .ok_or_else(|| AuthError::at(OP, AuthErrorKind::UserNotFound))
    }
}

#[async_trait::async_trait]
impl AppProvider for SeaOrmAuthRepository {
    async fn app(&self, app_id: i32) -> Result<App, AuthError> {
        const OP: &str = "storage.app";
        models::app::find_by_id(&self.db, app_id)
            .await
            .map_err(|e| AuthError::storage(OP, e))?
            .map(|a| App { id: a.id, name: a.name, secret: a.secret })
            .ok_or_else(|| AuthError::at(OP, AuthErrorKind::AppNotFound))
    }
}
