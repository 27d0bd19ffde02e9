use serde::{Deserialize, Serialize};

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub app_id: i32,
}

/// Stored user, including the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Calling application and its token signing secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub id: i32,
    pub name: String,
    pub secret: String,
}
