use async_trait::async_trait;

use super::domain::{App, User};
use super::errors::AuthError;

/// Persists newly registered users.
#[async_trait]
pub trait UserSaver: Send + Sync {
    /// Insert a user and return its store-assigned id.
    /// A duplicate email fails with `AuthErrorKind::UserExists`.
    async fn save_user(&self, email: &str, password_hash: &str) -> Result<i64, AuthError>;
}

/// Read access to users.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Full user record. Fails with `AuthErrorKind::UserNotFound` when no row matches.
    async fn user(&self, email: &str) -> Result<User, AuthError>;
    /// Fails with `AuthErrorKind::UserNotFound` when the id does not exist.
    async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError>;
}

/// Read access to registered applications.
#[async_trait]
pub trait AppProvider: Send + Sync {
    /// Fails with `AuthErrorKind::AppNotFound` when the id does not exist.
    async fn app(&self, app_id: i32) -> Result<App, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use crate::auth::errors::AuthErrorKind;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    struct State {
        users: HashMap<String, User>, // key: email
        apps: HashMap<i32, App>,
        last_id: i64,
    }

    #[derive(Default)]
    pub struct MockAuthRepository {
        state: Mutex<State>,
    }

    impl MockAuthRepository {
        fn lock(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        /// Provision an application.
        pub fn insert_app(&self, app: App) {
            self.lock().apps.insert(app.id, app);
        }

        /// Set the admin flag; returns false when the user does not exist.
        pub fn set_admin(&self, user_id: i64, is_admin: bool) -> bool {
            let mut state = self.lock();
            match state.users.values_mut().find(|u| u.id == user_id) {
                Some(user) => {
                    user.is_admin = is_admin;
                    true
                }
                None => false,
            }
        }

        pub fn user_count(&self) -> usize {
            self.lock().users.len()
        }
    }

    #[async_trait]
    impl UserSaver for MockAuthRepository {
        async fn save_user(&self, email: &str, password_hash: &str) -> Result<i64, AuthError> {
            // check and insert under one lock, like a unique index would
            let mut state = self.lock();
            if state.users.contains_key(email) {
                return Err(AuthError::at("mock.save_user", AuthErrorKind::UserExists));
            }
            state.last_id += 1;
            let user = User {
                id: state.last_id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                is_admin: false,
            };
            state.users.insert(email.to_string(), user);
            Ok(state.last_id)
        }
    }

    #[async_trait]
    impl UserProvider for MockAuthRepository {
        async fn user(&self, email: &str) -> Result<User, AuthError> {
            self.lock()
                .users
                .get(email)
                .cloned()
                .ok_or_else(|| AuthError::at("mock.user", AuthErrorKind::UserNotFound))
        }

        async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
            self.lock()
                .users
                .values()
                .find(|u| u.id == user_id)
                .map(|u| u.is_admin)
                .ok_or_else(|| AuthError::at("mock.is_admin", AuthErrorKind::UserNotFound))
        }
    }

    #[async_trait]
    impl AppProvider for MockAuthRepository {
        async fn app(&self, app_id: i32) -> Result<App, AuthError> {
            self.lock()
                .apps
                .get(&app_id)
                .cloned()
                .ok_or_else(|| AuthError::at("mock.app", AuthErrorKind::AppNotFound))
        }
    }
}
