//! 评分接口
//!
//! 请求 `{content, contentType}`，响应 `{scores, recommendations}`；
//! 出错时返回非 2xx 状态码和 `{error}`。

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error, warn};

use super::AppState;
use crate::error::{ScoringError, ValidationError};
use crate::models::ContentType;
use crate::services::{ScoreRequest, ScoreResponse};

/// 接口错误
#[derive(Debug)]
pub enum ApiError {
    /// 请求体不是合法的 JSON 或缺少字段
    BadRequest(String),
    /// 内容为空或类别无法识别
    Invalid(ValidationError),
    /// 评分后端失败
    Backend(ScoringError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Invalid(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Backend(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("⚠️ 请求体无法解析: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    if request.content.trim().is_empty() {
        return Err(ApiError::Invalid(ValidationError::EmptyContent));
    }
    let content_type = request
        .content_type
        .parse::<ContentType>()
        .map_err(ApiError::Invalid)?;

    debug!(
        "收到评分请求: 类别 {} | 内容长度 {} 字符",
        content_type,
        request.content.chars().count()
    );

    let normalized = ScoreRequest {
        content: request.content,
        content_type: content_type.as_str().to_string(),
    };

    match state.backend.score(&normalized).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("❌ 评分后端失败: {}", e);
            Err(ApiError::Backend(e))
        }
    }
}
