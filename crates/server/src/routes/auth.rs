use std::sync::Arc;

use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde::{Deserialize, Serialize};

use service::auth::{domain::{LoginInput, RegisterInput}, Auth};

use crate::errors::RpcError;

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<dyn Auth>,
}

// Absent fields decode to their zero value and are rejected by validation,
// so a missing field and an empty one produce the same response.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest { pub email: String, pub password: String, pub app_id: i32 }

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse { pub token: String }

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest { pub email: String, pub password: String }

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse { pub user_id: i64 }

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IsAdminRequest { pub user_id: i64 }

#[derive(Debug, Serialize, Deserialize)]
pub struct IsAdminResponse { pub is_admin: bool }

pub fn validate_login(req: &LoginRequest) -> Result<(), RpcError> {
    if req.email.trim().is_empty() { return Err(RpcError::invalid_argument("email cannot be empty")); }
    if req.password.is_empty() { return Err(RpcError::invalid_argument("password cannot be empty")); }
    if req.app_id == 0 { return Err(RpcError::invalid_argument("app_id is required")); }
    Ok(())
}

pub fn validate_register(req: &RegisterRequest) -> Result<(), RpcError> {
    if req.email.trim().is_empty() { return Err(RpcError::invalid_argument("email cannot be empty")); }
    if req.password.is_empty() { return Err(RpcError::invalid_argument("password cannot be empty")); }
    Ok(())
}

pub fn validate_is_admin(req: &IsAdminRequest) -> Result<(), RpcError> {
    if req.user_id == 0 { return Err(RpcError::invalid_argument("user_id is required")); }
    Ok(())
}

pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, RpcError> {
    let Json(req) = payload?;
    validate_login(&req)?;
    let token = state
        .auth
        .login(LoginInput { email: req.email, password: req.password, app_id: req.app_id })
        .await?;
    Ok(Json(LoginResponse { token }))
}

pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, RpcError> {
    let Json(req) = payload?;
    validate_register(&req)?;
    let user_id = state
        .auth
        .register_new_user(RegisterInput { email: req.email, password: req.password })
        .await?;
    Ok(Json(RegisterResponse { user_id }))
}

pub async fn is_admin(
    State(state): State<ServerState>,
    payload: Result<Json<IsAdminRequest>, JsonRejection>,
) -> Result<Json<IsAdminResponse>, RpcError> {
    let Json(req) = payload?;
    validate_is_admin(&req)?;
    let is_admin = state.auth.is_admin(req.user_id).await?;
    Ok(Json(IsAdminResponse { is_admin }))
}
