//! 占位评分后端
//!
//! 分项得分在 [min, max] 内独立均匀抽取，建议为固定的四条。
//! 只用于打通流水线，替换它不需要改动编排器。

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::debug;

use super::{ScoreRequest, ScoreResponse, ScoringBackend};
use crate::error::{ConfigError, ScoringError};
use crate::models::SubScores;

/// 固定的占位建议
pub const STUB_RECOMMENDATIONS: [&str; 4] = [
    "Improve keyword relevance: Work the primary question and its close variants into headings and the opening paragraph",
    "Enhance readability: Break long paragraphs into short, scannable sections with plain wording",
    "Improve snippet optimization: Answer the core question directly in 40 to 60 words near the top",
    "Add structured data: Mark up FAQs, articles and products with schema.org JSON-LD",
];

pub struct StubScoringBackend {
    min: u8,
    max: u8,
    rng: Mutex<StdRng>,
}

impl StubScoringBackend {
    pub fn new(min: u8, max: u8) -> Result<Self, ConfigError> {
        Self::with_rng(min, max, StdRng::from_entropy())
    }

    /// 固定种子，结果可复现
    pub fn with_seed(min: u8, max: u8, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(min, max, StdRng::seed_from_u64(seed))
    }

    fn with_rng(min: u8, max: u8, rng: StdRng) -> Result<Self, ConfigError> {
        if min > max || max > 100 {
            return Err(ConfigError::Invalid {
                key: "stub_score_min/stub_score_max",
                reason: format!("需要满足 min <= max <= 100，当前为 {}..={}", min, max),
            });
        }
        Ok(Self {
            min,
            max,
            rng: Mutex::new(rng),
        })
    }

    fn draw(&self) -> SubScores {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let range = self.min..=self.max;
        SubScores::new(
            rng.gen_range(range.clone()),
            rng.gen_range(range.clone()),
            rng.gen_range(range.clone()),
            rng.gen_range(range),
        )
    }
}

impl Default for StubScoringBackend {
    fn default() -> Self {
        Self {
            min: 70,
            max: 90,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

#[async_trait]
impl ScoringBackend for StubScoringBackend {
    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ScoringError> {
        let scores = self.draw();
        debug!(
            "占位评分: 类别 {} | 内容长度 {} | {:?}",
            request.content_type,
            request.content.len(),
            scores
        );
        Ok(ScoreResponse::new(
            scores,
            STUB_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        ))
    }

    fn name(&self) -> &str {
        "stub"
    }
}
