use std::fmt;

use thiserror::Error;

/// Classification of auth failures. Callers branch on this, never on message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthErrorKind {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user already exists")]
    UserExists,
    #[error("user not found")]
    UserNotFound,
    #[error("app not found")]
    AppNotFound,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("token signing error: {0}")]
    Signing(String),
    #[error("hashing error: {0}")]
    Hashing(String),
}

/// Business error for auth workflows: a kind plus the chain of operations it passed through.
///
/// `ops` is outermost first, so `auth.login` wrapping `storage.user` renders as
/// `auth.login: storage.user: user not found`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    kind: AuthErrorKind,
    ops: Vec<&'static str>,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind) -> Self {
        Self { kind, ops: Vec::new() }
    }

    /// Error raised by operation `op`.
    pub fn at(op: &'static str, kind: AuthErrorKind) -> Self {
        Self { kind, ops: vec![op] }
    }

    pub fn storage(op: &'static str, err: impl fmt::Display) -> Self {
        Self::at(op, AuthErrorKind::Storage(err.to_string()))
    }

    pub fn signing(op: &'static str, err: impl fmt::Display) -> Self {
        Self::at(op, AuthErrorKind::Signing(err.to_string()))
    }

    pub fn hashing(op: &'static str, err: impl fmt::Display) -> Self {
        Self::at(op, AuthErrorKind::Hashing(err.to_string()))
    }

    /// Prepend an operation label; the kind is left untouched.
    pub fn context(mut self, op: &'static str) -> Self {
        self.ops.insert(0, op);
        self
    }

    pub fn kind(&self) -> &AuthErrorKind {
        &self.kind
    }

    pub fn ops(&self) -> &[&'static str] {
        &self.ops
    }

    pub fn is(&self, kind: &AuthErrorKind) -> bool {
        &self.kind == kind
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self.kind {
            AuthErrorKind::InvalidCredentials => 1004,
            AuthErrorKind::UserExists => 1002,
            AuthErrorKind::UserNotFound => 1003,
            AuthErrorKind::AppNotFound => 1005,
            AuthErrorKind::Hashing(_) => 1101,
            AuthErrorKind::Signing(_) => 1102,
            AuthErrorKind::Storage(_) => 1200,
        }
    }
}

impl From<AuthErrorKind> for AuthError {
    fn from(kind: AuthErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            write!(f, "{op}: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for AuthError {}
