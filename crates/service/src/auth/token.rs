//! JWT issuance. Tokens are stateless; this crate never stores or validates them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::domain::{App, User};
use super::errors::AuthError;

const OP: &str = "jwt.issue_token";

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a decimal string (JWT `sub` is a StringOrURI).
    pub sub: String,
    pub uid: i64,
    pub email: String,
    pub app_id: i32,
    /// Unix seconds.
    pub exp: i64,
}

/// Sign a token for `user` scoped to `app`, expiring `ttl` from now.
pub fn issue_token(user: &User, app: &App, ttl: Duration) -> Result<String, AuthError> {
    issue_token_at(user, app, ttl, Utc::now())
}

/// Same as [`issue_token`] with an explicit clock.
pub fn issue_token_at(user: &User, app: &App, ttl: Duration, now: DateTime<Utc>) -> Result<String, AuthError> {
    if app.secret.is_empty() {
        return Err(AuthError::signing(OP, "app secret is empty"));
    }
    let ttl = chrono::Duration::from_std(ttl).map_err(|e| AuthError::signing(OP, e))?;
    let exp = now
        .checked_add_signed(ttl)
        .ok_or_else(|| AuthError::signing(OP, "expiry out of range"))?
        .timestamp();

    let claims = Claims {
        sub: user.id.to_string(),
        uid: user.id,
        email: user.email.clone(),
        app_id: app.id,
        exp,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(app.secret.as_bytes()))
        .map_err(|e| AuthError::signing(OP, e))
}
