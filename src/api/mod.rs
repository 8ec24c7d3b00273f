//! API 模块
//!
//! 对外提供评分接口（与 `HttpScoringBackend` 调用的是同一份契约）：
//! - `POST /api/analyze`
//! - `GET /health`

pub mod analyze;
pub mod health;
pub mod server;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::services::ScoringBackend;

pub use analyze::ApiError;
pub use server::serve;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ScoringBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn ScoringBackend>) -> Self {
        Self { backend }
    }
}

/// 构建路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/analyze", post(analyze::analyze))
        .with_state(state)
}
