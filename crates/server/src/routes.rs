use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure};
use tracing::Level;

use common::types::Health;

pub mod auth;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the application router: health probe plus the auth RPC endpoints
pub fn build_router(state: auth::ServerState) -> Router {
    let rpc = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/is_admin", post(auth::is_admin))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(rpc)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::DEBUG),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
