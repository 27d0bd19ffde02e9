use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tracing::{error, info, instrument, warn, Span};

use super::domain::{LoginInput, RegisterInput};
use super::errors::{AuthError, AuthErrorKind};
use super::password::{self, Argon2Params};
use super::repository::{AppProvider, UserProvider, UserSaver};
use super::token;

/// Verified against when the email is unknown.
const DUMMY_PASSWORD: &str = "sso-dummy-password";

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token_ttl: Duration,
    pub hashing: Argon2Params,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { token_ttl: Duration::from_secs(3600), hashing: Argon2Params::default() }
    }
}

/// Operations exposed to the transport layer.
#[async_trait]
pub trait Auth: Send + Sync {
    async fn login(&self, input: LoginInput) -> Result<String, AuthError>;
    async fn register_new_user(&self, input: RegisterInput) -> Result<i64, AuthError>;
    async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError>;
}

/// Auth business service independent of transport and store.
///
/// `log` is the parent span of every operation span, so the caller decides
/// where this component's events land.
pub struct AuthService<S, P, A> {
    log: Span,
    dummy_hash: Arc<OnceCell<String>>,
    saver: Arc<S>,
    users: Arc<P>,
    apps: Arc<A>,
    cfg: AuthConfig,
}

impl<S, P, A> AuthService<S, P, A>
where
    S: UserSaver,
    P: UserProvider,
    A: AppProvider,
{
    pub fn new(log: Span, saver: Arc<S>, users: Arc<P>, apps: Arc<A>, cfg: AuthConfig) -> Self {
        Self { log, dummy_hash: Arc::new(OnceCell::new()), saver, users, apps, cfg }
    }

    /// Check credentials and issue a token scoped to `input.app_id`.
    ///
    /// Unknown email and wrong password both fail with `InvalidCredentials`.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, AuthConfig, domain::{App, LoginInput, RegisterInput}};
    /// use service::auth::{password::Argon2Params, repository::mock::MockAuthRepository};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// repo.insert_app(App { id: 1, name: "test".into(), secret: "secret".into() });
    /// let cfg = AuthConfig { hashing: Argon2Params::new(1024, 1, 1), ..AuthConfig::default() };
    /// let svc = AuthService::new(tracing::Span::none(), repo.clone(), repo.clone(), repo, cfg);
    /// tokio_test::block_on(svc.register_new_user(RegisterInput { email: "u@e.com".into(), password: "pw".into() })).unwrap();
    /// let token = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "pw".into(), app_id: 1 })).unwrap();
    /// assert_eq!(token.split('.').count(), 3);
    /// ```
    #[instrument(parent = &self.log, name = "auth.login", skip_all, fields(email = %input.email, app_id = input.app_id))]
    pub async fn login(&self, input: LoginInput) -> Result<String, AuthError> {
        const OP: &str = "auth.login";
        info!("attempting to log in");

        let user = match self.users.user(&input.email).await {
            Ok(user) => Some(user),
            Err(e) if e.is(&AuthErrorKind::UserNotFound) => {
                warn!("user not found");
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to get user");
                return Err(e.context(OP));
            }
        };

        let password = input.password;
        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let dummy = Arc::clone(&self.dummy_hash);
        let params = self.cfg.hashing;
        let matches = tokio::task::spawn_blocking(move || match stored {
            Some(hash) => password::verify_password(&password, &hash),
            // unknown email still pays one verify
            None => {
                if let Ok(hash) = dummy.get_or_try_init(|| password::hash_password(DUMMY_PASSWORD, params)) {
                    let _ = password::verify_password(&password, hash);
                }
                false
            }
        })
        .await
        .map_err(|e| AuthError::hashing(OP, e))?;

        let user = match user {
            Some(user) if matches => user,
            Some(user) => {
                warn!(user_id = user.id, "invalid credentials");
                return Err(AuthError::at(OP, AuthErrorKind::InvalidCredentials));
            }
            None => return Err(AuthError::at(OP, AuthErrorKind::InvalidCredentials)),
        };

        let app = self.apps.app(input.app_id).await.map_err(|e| {
            warn!(error = %e, "failed to get app");
            e.context(OP)
        })?;

        let token = token::issue_token(&user, &app, self.cfg.token_ttl).map_err(|e| {
            error!(error = %e, "failed to create token");
            e.context(OP)
        })?;

        info!(user_id = user.id, "logged in");
        Ok(token)
    }

    /// Register a new user with a hashed password and return the new id.
    #[instrument(parent = &self.log, name = "auth.register_new_user", skip_all, fields(email = %input.email))]
    pub async fn register_new_user(&self, input: RegisterInput) -> Result<i64, AuthError> {
        const OP: &str = "auth.register_new_user";
        info!("registering new user");

        let params = self.cfg.hashing;
        let password = input.password;
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&password, params))
            .await
            .map_err(|e| AuthError::hashing(OP, e))?
            .map_err(|e| {
                error!(error = %e, "failed to hash password");
                e.context(OP)
            })?;

        let id = self.saver.save_user(&input.email, &hash).await.map_err(|e| {
            if e.is(&AuthErrorKind::UserExists) {
                warn!("user already exists");
            } else {
                error!(error = %e, "failed to save user");
            }
            e.context(OP)
        })?;

        info!(user_id = id, "user registered");
        Ok(id)
    }

    /// Whether `user_id` has the admin flag. A missing user is `UserNotFound`.
    #[instrument(parent = &self.log, name = "auth.is_admin", skip(self))]
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        const OP: &str = "auth.is_admin";
        info!("checking if user is admin");

        let is_admin = self.users.is_admin(user_id).await.map_err(|e| {
            warn!(error = %e, "failed to check admin flag");
            e.context(OP)
        })?;

        info!(is_admin, "checked if user is admin");
        Ok(is_admin)
    }
}

#[async_trait]
impl<S, P, A> Auth for AuthService<S, P, A>
where
    S: UserSaver,
    P: UserProvider,
    A: AppProvider,
{
    async fn login(&self, input: LoginInput) -> Result<String, AuthError> {
        AuthService::login(self, input).await
    }

    async fn register_new_user(&self, input: RegisterInput) -> Result<i64, AuthError> {
        AuthService::register_new_user(self, input).await
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        AuthService::is_admin(self, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::{App, User};
    use crate::auth::repo::seaorm::SeaOrmAuthRepository;
    use crate::auth::token::Claims;
    use crate::test_support::{fast_config, get_db, mock_service, test_app};
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn register(email: &str, password: &str) -> RegisterInput {
        RegisterInput { email: email.into(), password: password.into() }
    }

    fn login(email: &str, password: &str, app_id: i32) -> LoginInput {
        LoginInput { email: email.into(), password: password.into(), app_id }
    }

    fn decode_claims(token: &str, secret: &str) -> Claims {
        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::new(Algorithm::HS256))
            .expect("token decodes")
            .claims
    }

    #[tokio::test]
    async fn register_twice_is_user_exists() {
        let (repo, svc) = mock_service();
        svc.register_new_user(register("a@x.com", "pw1")).await.unwrap();
        let err = svc.register_new_user(register("a@x.com", "pw2")).await.unwrap_err();
        assert!(err.is(&AuthErrorKind::UserExists));
        assert_eq!(err.ops()[0], "auth.register_new_user");
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn stored_hash_is_not_plaintext() {
        let (repo, svc) = mock_service();
        svc.register_new_user(register("a@x.com", "pw1")).await.unwrap();
        let user = repo.user("a@x.com").await.unwrap();
        assert_ne!(user.password_hash, "pw1");
        assert!(password::verify_password("pw1", &user.password_hash));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let (_repo, svc) = mock_service();
        svc.register_new_user(register("a@x.com", "pw1")).await.unwrap();

        let wrong = svc.login(login("a@x.com", "wrong", 1)).await.unwrap_err();
        let unknown = svc.login(login("nobody@x.com", "pw1", 1)).await.unwrap_err();
        assert!(wrong.is(&AuthErrorKind::InvalidCredentials));
        assert_eq!(wrong, unknown);
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn login_returns_token_with_claims() {
        let (_repo, svc) = mock_service();
        let id = svc.register_new_user(register("a@x.com", "pw1")).await.unwrap();

        let before = chrono::Utc::now().timestamp();
        let token = svc.login(login("a@x.com", "pw1", 1)).await.unwrap();
        let after = chrono::Utc::now().timestamp();

        let claims = decode_claims(&token, &test_app().secret);
        assert_eq!(claims.uid, id);
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.app_id, 1);
        let ttl = fast_config().token_ttl.as_secs() as i64;
        assert!(claims.exp >= before + ttl && claims.exp <= after + ttl);
    }

    #[tokio::test]
    async fn unknown_app_propagates_app_not_found() {
        let (_repo, svc) = mock_service();
        svc.register_new_user(register("a@x.com", "pw1")).await.unwrap();
        let err = svc.login(login("a@x.com", "pw1", 99)).await.unwrap_err();
        assert!(err.is(&AuthErrorKind::AppNotFound));
        assert_eq!(err.ops(), ["auth.login", "mock.app"]);
    }

    #[tokio::test]
    async fn empty_app_secret_is_signing_failure() {
        let (repo, svc) = mock_service();
        repo.insert_app(App { id: 2, name: "broken".into(), secret: String::new() });
        svc.register_new_user(register("a@x.com", "pw1")).await.unwrap();
        let err = svc.login(login("a@x.com", "pw1", 2)).await.unwrap_err();
        assert!(matches!(err.kind(), AuthErrorKind::Signing(_)));
    }

    #[tokio::test]
    async fn is_admin_default_false_then_true() {
        let (repo, svc) = mock_service();
        let id = svc.register_new_user(register("a@x.com", "pw1")).await.unwrap();
        assert!(!svc.is_admin(id).await.unwrap());
        assert!(repo.set_admin(id, true));
        assert!(svc.is_admin(id).await.unwrap());
    }

    #[tokio::test]
    async fn is_admin_missing_user_is_not_swallowed() {
        let (_repo, svc) = mock_service();
        let err = svc.is_admin(404).await.unwrap_err();
        assert!(err.is(&AuthErrorKind::UserNotFound));
        assert_eq!(err.to_string(), "auth.is_admin: mock.is_admin: user not found");
    }

    #[tokio::test]
    async fn invalid_hash_params_fail_registration() {
        let repo = Arc::new(crate::auth::repository::mock::MockAuthRepository::default());
        let cfg = AuthConfig { hashing: Argon2Params::new(1, 1, 1), ..fast_config() };
        let svc = AuthService::new(Span::none(), repo.clone(), repo.clone(), repo.clone(), cfg);
        let err = svc.register_new_user(register("a@x.com", "pw")).await.unwrap_err();
        assert!(matches!(err.kind(), AuthErrorKind::Hashing(_)));
        assert_eq!(repo.user_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_registrations_single_winner() {
        let (repo, svc) = mock_service();
        let svc = Arc::new(svc);
        let mut handles = Vec::new();
        for i in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.register_new_user(register("race@x.com", &format!("pw{i}"))).await
            }));
        }
        let mut ok = 0;
        let mut exists = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) if e.is(&AuthErrorKind::UserExists) => exists += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!((ok, exists), (1, 7));
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn end_to_end_over_sqlite() -> anyhow::Result<()> {
        let db = get_db().await?;
        models::app::create(&db, 1, "test", "test-secret").await?;
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let svc = AuthService::new(Span::none(), repo.clone(), repo.clone(), repo, fast_config());

        let id = svc.register_new_user(register("a@x.com", "pw1")).await?;
        assert_eq!(id, 1);

        let token = svc.login(login("a@x.com", "pw1", 1)).await?;
        let claims = decode_claims(&token, "test-secret");
        assert_eq!((claims.uid, claims.email.as_str(), claims.app_id), (1, "a@x.com", 1));

        let err = svc.login(login("a@x.com", "wrong", 1)).await.unwrap_err();
        assert!(err.is(&AuthErrorKind::InvalidCredentials));
        assert!(!svc.is_admin(1).await?);

        let err = svc.register_new_user(register("a@x.com", "pw2")).await.unwrap_err();
        assert!(err.is(&AuthErrorKind::UserExists));

        models::user::set_admin(&db, id, true).await?;
        assert!(svc.is_admin(id).await?);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_registrations_over_sqlite() -> anyhow::Result<()> {
        let db = get_db().await?;
        let repo = Arc::new(SeaOrmAuthRepository::new(db));
        let svc = Arc::new(AuthService::new(Span::none(), repo.clone(), repo.clone(), repo, fast_config()));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move { svc.register_new_user(register("race@x.com", "pw")).await }));
        }
        let mut outcomes = Vec::new();
        for h in handles {
            outcomes.push(h.await?);
        }
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.is(&AuthErrorKind::UserExists)));
        Ok(())
    }

    /// Every call fails the way a dropped connection would.
    struct BrokenStore;

    #[async_trait]
    impl UserSaver for BrokenStore {
        async fn save_user(&self, _email: &str, _password_hash: &str) -> Result<i64, AuthError> {
            Err(AuthError::storage("broken.save_user", "connection reset"))
        }
    }

    #[async_trait]
    impl UserProvider for BrokenStore {
        async fn user(&self, _email: &str) -> Result<User, AuthError> {
            Err(AuthError::storage("broken.user", "connection reset"))
        }

        async fn is_admin(&self, _user_id: i64) -> Result<bool, AuthError> {
            Err(AuthError::storage("broken.is_admin", "connection reset"))
        }
    }

    #[async_trait]
    impl AppProvider for BrokenStore {
        async fn app(&self, _app_id: i32) -> Result<App, AuthError> {
            Err(AuthError::storage("broken.app", "connection reset"))
        }
    }

    fn broken_service() -> AuthService<BrokenStore, BrokenStore, BrokenStore> {
        let store = Arc::new(BrokenStore);
        AuthService::new(Span::none(), store.clone(), store.clone(), store, fast_config())
    }

    #[tokio::test]
    async fn login_storage_failure_is_not_invalid_credentials() {
        let err = broken_service().login(login("a@x.com", "pw", 1)).await.unwrap_err();
        assert!(matches!(err.kind(), AuthErrorKind::Storage(_)), "{err}");
        assert_eq!(err.ops(), ["auth.login", "broken.user"]);
    }

    #[tokio::test]
    async fn register_storage_failure_is_wrapped() {
        let err = broken_service().register_new_user(register("a@x.com", "pw")).await.unwrap_err();
        assert!(matches!(err.kind(), AuthErrorKind::Storage(_)), "{err}");
        assert_eq!(err.ops(), ["auth.register_new_user", "broken.save_user"]);
    }

    #[tokio::test]
    async fn is_admin_storage_failure_is_wrapped() {
        let err = broken_service().is_admin(1).await.unwrap_err();
        assert!(matches!(err.kind(), AuthErrorKind::Storage(_)), "{err}");
        assert_eq!(err.ops()[0], "auth.is_admin");
    }

    #[tokio::test]
    async fn closed_pool_login_and_register_propagate_storage() -> anyhow::Result<()> {
        let db = get_db().await?;
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let svc = AuthService::new(Span::none(), repo.clone(), repo.clone(), repo, fast_config());
        db.close().await?;

        let err = svc.login(login("a@x.com", "pw", 1)).await.unwrap_err();
        assert!(matches!(err.kind(), AuthErrorKind::Storage(_)), "{err}");
        assert_eq!(err.ops()[0], "auth.login");

        let err = svc.register_new_user(register("a@x.com", "pw")).await.unwrap_err();
        assert!(matches!(err.kind(), AuthErrorKind::Storage(_)), "{err}");
        assert_eq!(err.ops()[0], "auth.register_new_user");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_email_still_runs_a_verify() {
        let (_repo, svc) = mock_service();
        assert!(svc.dummy_hash.get().is_none());
        let err = svc.login(login("nobody@x.com", "pw", 1)).await.unwrap_err();
        assert!(err.is(&AuthErrorKind::InvalidCredentials));
        let dummy = svc.dummy_hash.get().expect("dummy hash prepared");
        assert!(password::verify_password(DUMMY_PASSWORD, dummy));
    }
}
