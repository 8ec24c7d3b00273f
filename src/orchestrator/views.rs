//! 结果视图
//!
//! `SummaryView` 在 Complete 时总是可用；`DetailedView` 只在打开详细视图时可用。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::models::{AnalysisRequest, AnalysisScores, ContentType, NormalizedRecommendation, Rating};
use crate::workflow::AnalysisResult;

/// 摘要中展示的建议条数
pub const SUMMARY_RECOMMENDATIONS: usize = 3;

/// 摘要视图
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub final_score: u8,
    pub rating: Rating,
    pub scores: AnalysisScores,
    pub top_recommendations: Vec<NormalizedRecommendation>,
    pub content_source: String,
    pub content_type: ContentType,
}

impl SummaryView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            final_score: result.scores.final_score(),
            rating: result.scores.rating(),
            scores: result.scores,
            top_recommendations: result
                .recommendations
                .iter()
                .take(SUMMARY_RECOMMENDATIONS)
                .cloned()
                .collect(),
            content_source: result.request.content_source().to_string(),
            content_type: result.request.content_type(),
        }
    }
}

impl fmt::Display for SummaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "内容: {} ({})", self.content_source, self.content_type)?;
        writeln!(
            f,
            "总分: {} / 100 ({})",
            self.final_score,
            self.rating.label()
        )?;
        for (label, value) in self.scores.sub_scores().entries() {
            writeln!(f, "  {:<22}{:>3}", label, value)?;
        }
        if !self.top_recommendations.is_empty() {
            writeln!(f, "优先建议:")?;
            for (i, rec) in self.top_recommendations.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, rec.title)?;
            }
        }
        Ok(())
    }
}

/// 详细视图
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedView {
    pub scores: AnalysisScores,
    pub recommendations: Vec<NormalizedRecommendation>,
    pub request: AnalysisRequest,
    pub completed_at: DateTime<Utc>,
}

impl DetailedView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            scores: result.scores,
            recommendations: result.recommendations.clone(),
            request: result.request.clone(),
            completed_at: result.completed_at,
        }
    }
}

impl fmt::Display for DetailedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "分析完成时间: {}",
            self.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f, "全部建议 ({} 条):", self.recommendations.len())?;
        for (i, rec) in self.recommendations.iter().enumerate() {
            if rec.description.is_empty() {
                writeln!(f, "  {}. {}", i + 1, rec.title)?;
            } else {
                writeln!(f, "  {}. {}\n     {}", i + 1, rec.title, rec.description)?;
            }
        }
        Ok(())
    }
}
