//! 分析流程 - 流程层
//!
//! 核心职责：定义"一次分析"的完整流程
//!
//! 流程顺序：
//! 1. 构造线上请求 → 调用评分后端
//! 2. 由分项得分计算总分（不采用后端给出的总分）
//! 3. 规范化建议
//!
//! 不持有状态，状态机在编排层。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ScoringError;
use crate::models::{AnalysisRequest, AnalysisScores, NormalizedRecommendation, Recommendation};
use crate::services::normalizer::normalize_all;
use crate::services::{ScoreRequest, ScoringBackend};
use crate::workflow::session_ctx::SessionCtx;

/// 一次成功分析的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub request: AnalysisRequest,
    pub scores: AnalysisScores,
    pub recommendations: Vec<NormalizedRecommendation>,
    pub completed_at: DateTime<Utc>,
}

/// 分析流程
pub struct AnalysisFlow {
    backend: Arc<dyn ScoringBackend>,
}

impl AnalysisFlow {
    pub fn new(backend: Arc<dyn ScoringBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn run(
        &self,
        request: &AnalysisRequest,
        ctx: &SessionCtx,
    ) -> Result<AnalysisResult, ScoringError> {
        info!("{} 🔍 正在评分: {}", ctx, ctx.preview);

        let payload = ScoreRequest::from(request);
        let response = self.backend.score(&payload).await.map_err(|e| {
            warn!("{} ⚠️ 评分失败: {}", ctx, e);
            e
        })?;

        let scores = AnalysisScores::from_sub_scores(response.scores);
        let raw_count = response.recommendations.len();
        let recommendations = normalize_all(
            response
                .recommendations
                .into_iter()
                .map(Recommendation::Raw)
                .collect(),
        );

        if recommendations.len() < raw_count {
            debug!(
                "{} 跳过 {} 条空白建议",
                ctx,
                raw_count - recommendations.len()
            );
        }

        info!(
            "{} ✓ 评分完成: 总分 {} ({}) | {} 条建议",
            ctx,
            scores.final_score(),
            scores.rating().label(),
            recommendations.len()
        );

        Ok(AnalysisResult {
            request: request.clone(),
            scores,
            recommendations,
            completed_at: Utc::now(),
        })
    }
}
