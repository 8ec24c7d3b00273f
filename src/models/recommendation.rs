//! 优化建议模型

use serde::{Deserialize, Serialize};

/// 规范化后的建议：标题 + 说明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecommendation {
    pub title: String,
    pub description: String,
}

impl NormalizedRecommendation {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// 建议
///
/// 评分后端返回的是自由文本（`Raw`），展示和导出只使用 `Normalized`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    Raw(String),
    Normalized(NormalizedRecommendation),
}

impl Recommendation {
    /// 转换为规范化形式；空白文本无法产生标题，返回 None
    pub fn into_normalized(self) -> Option<NormalizedRecommendation> {
        match self {
            Recommendation::Raw(text) => crate::services::normalizer::normalize_one(&text),
            Recommendation::Normalized(rec) => Some(rec),
        }
    }
}

impl From<String> for Recommendation {
    fn from(text: String) -> Self {
        Recommendation::Raw(text)
    }
}
