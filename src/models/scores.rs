//! 分数模型
//!
//! `final_score` 只能由四个分项得分推导，评分后端给出的总分一律不采用。

use serde::Serialize;

/// 四个分项得分，均为 [0, 100] 内的整数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub keyword_relevance: u8,
    pub readability: u8,
    pub snippet_optimization: u8,
    pub structured_data: u8,
}

impl SubScores {
    pub fn new(
        keyword_relevance: u8,
        readability: u8,
        snippet_optimization: u8,
        structured_data: u8,
    ) -> Self {
        Self {
            keyword_relevance,
            readability,
            snippet_optimization,
            structured_data,
        }
    }

    /// (标签, 分数) 列表，按固定顺序
    pub fn entries(&self) -> [(&'static str, u8); 4] {
        [
            ("Keyword Relevance", self.keyword_relevance),
            ("Readability", self.readability),
            ("Snippet Optimization", self.snippet_optimization),
            ("Structured Data", self.structured_data),
        ]
    }
}

/// 评级区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    Excellent,
    Good,
    NeedsWork,
}

impl Rating {
    pub fn label(self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::NeedsWork => "Needs Work",
        }
    }
}

/// 完整的分析分数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisScores {
    #[serde(flatten)]
    sub_scores: SubScores,
    final_score: u8,
}

impl AnalysisScores {
    /// 由分项得分构造，同时计算总分
    pub fn from_sub_scores(sub_scores: SubScores) -> Self {
        Self {
            sub_scores,
            final_score: final_score_of(&sub_scores),
        }
    }

    pub fn sub_scores(&self) -> &SubScores {
        &self.sub_scores
    }

    /// floor(四个分项的平均值)
    pub fn final_score(&self) -> u8 {
        self.final_score
    }

    pub fn rating(&self) -> Rating {
        match self.final_score {
            80..=u8::MAX => Rating::Excellent,
            60..=79 => Rating::Good,
            _ => Rating::NeedsWork,
        }
    }
}

/// 总分 = floor(mean(四个分项))
pub fn final_score_of(s: &SubScores) -> u8 {
    let sum = u16::from(s.keyword_relevance)
        + u16::from(s.readability)
        + u16::from(s.snippet_optimization)
        + u16::from(s.structured_data);
    (sum / 4) as u8
}
