//! 评分服务 - 业务能力层
//!
//! 只负责"给内容打分"的能力契约，具体算法可替换：
//! - `StubScoringBackend`：占位实现，随机分数 + 固定建议
//! - `HttpScoringBackend`：远程评分服务
//! - `LlmScoringBackend`：兼容 OpenAI API 的大模型
//!
//! 无论哪种后端，返回前都要经过 `ScoreResponse::from_json` / `from_value`
//! 的校验，不接受部分结果，也不接受后端给出的总分。

pub mod http;
pub mod llm;
pub mod stub;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::{BackendKind, Config};
use crate::error::{ConfigError, ScoringError};
use crate::models::{AnalysisRequest, SubScores};

pub use http::HttpScoringBackend;
pub use llm::LlmScoringBackend;
pub use stub::StubScoringBackend;

/// 评分请求（线上格式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub content: String,
    pub content_type: String,
}

impl From<&AnalysisRequest> for ScoreRequest {
    fn from(request: &AnalysisRequest) -> Self {
        Self {
            content: request.content().to_string(),
            content_type: request.content_type().as_str().to_string(),
        }
    }
}

/// 校验通过的评分响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreResponse {
    pub scores: SubScores,
    pub recommendations: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScores {
    keyword_relevance: i64,
    readability: i64,
    snippet_optimization: i64,
    structured_data: i64,
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    scores: Option<RawScores>,
    #[serde(default)]
    recommendations: Option<Vec<String>>,
}

impl ScoreResponse {
    pub fn new(scores: SubScores, recommendations: Vec<String>) -> Self {
        Self {
            scores,
            recommendations,
        }
    }

    /// 解析并校验响应正文
    pub fn from_json(body: &str) -> Result<Self, ScoringError> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    /// 校验已解析的 JSON
    ///
    /// - 缺少 `scores` → `MissingScores`
    /// - 分项缺失或类型不对 → `MalformedPayload`
    /// - 分项超出 [0, 100] → `ScoreOutOfRange`
    /// - 缺少 `recommendations` → 空列表
    pub fn from_value(value: serde_json::Value) -> Result<Self, ScoringError> {
        let raw: RawResponse = serde_json::from_value(value)?;
        let scores = raw.scores.ok_or(ScoringError::MissingScores)?;

        let scores = SubScores::new(
            check_range("keywordRelevance", scores.keyword_relevance)?,
            check_range("readability", scores.readability)?,
            check_range("snippetOptimization", scores.snippet_optimization)?,
            check_range("structuredData", scores.structured_data)?,
        );

        Ok(Self {
            scores,
            recommendations: raw.recommendations.unwrap_or_default(),
        })
    }
}

fn check_range(field: &'static str, value: i64) -> Result<u8, ScoringError> {
    if (0..=100).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ScoringError::ScoreOutOfRange { field, value })
    }
}

/// 评分后端能力
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    /// 为一段内容打分
    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ScoringError>;

    /// 后端名称（仅用于日志）
    fn name(&self) -> &str;
}

/// 按配置选择评分后端（启动时确定，运行期间不回退）
pub fn build_backend(config: &Config) -> Result<Arc<dyn ScoringBackend>, ConfigError> {
    let backend: Arc<dyn ScoringBackend> = match config.effective_backend() {
        BackendKind::Stub => Arc::new(StubScoringBackend::new(
            config.stub_score_min,
            config.stub_score_max,
        )?),
        BackendKind::Http => Arc::new(HttpScoringBackend::new(
            &config.scoring_endpoint,
            config.scoring_timeout_secs,
        )?),
        BackendKind::Llm => Arc::new(LlmScoringBackend::new(config)?),
    };
    info!("🔌 评分后端: {}", backend.name());
    Ok(backend)
}
