pub mod advocates;
pub mod server;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::QueryBackendError;
use crate::models::{Advocate, PaginationInfo};
use crate::state::AppState;

/// Advocate list response / 顾问列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct AdvocatesResponse {
    pub data: Vec<Advocate>,
    pub pagination: PaginationInfo,
}

/// Seed response / 种子数据响应
#[derive(Debug, Serialize, Deserialize)]
pub struct SeedResponse {
    pub advocates: Vec<Advocate>,
}

/// Fixed-shape error body / 固定格式的错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Request-boundary error: logs full detail, returns only a generic message / 请求边界错误
#[derive(Debug)]
pub struct ApiError {
    message: &'static str,
    source: QueryBackendError,
}

impl ApiError {
    pub fn backend(message: &'static str, source: QueryBackendError) -> Self {
        Self { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("{}: {:?}", self.message, self.source);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { error: self.message.to_string() }),
        )
            .into_response()
    }
}

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/advocates", get(advocates::list_advocates))
        .route("/api/seed", post(advocates::seed_advocates))
        .route("/api/specialties", get(advocates::list_specialties))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
