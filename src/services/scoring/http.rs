//! 远程 HTTP 评分后端
//!
//! POST `{content, contentType}`，期望 `{scores, recommendations}`；
//! 非 2xx 时读取 `{error}` 作为错误信息。

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ScoreRequest, ScoreResponse, ScoringBackend};
use crate::error::{ConfigError, ScoringError};
use crate::utils::logging::truncate_text;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct HttpScoringBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpScoringBackend {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, ConfigError> {
        if endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "scoring_endpoint",
                reason: "HTTP 评分后端需要服务地址".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid {
                key: "scoring_endpoint",
                reason: format!("无法创建 HTTP 客户端: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ScoringBackend for HttpScoringBackend {
    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ScoringError> {
        debug!("调用评分服务: {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("评分请求失败: {}", e);
                ScoringError::request_failed(&self.endpoint, e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ScoringError::request_failed(&self.endpoint, e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| truncate_text(&body, 200));
            warn!("评分服务返回 {}: {}", status, message);
            return Err(ScoringError::BadStatus {
                status: status.as_u16(),
                message,
            });
        }

        ScoreResponse::from_json(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
