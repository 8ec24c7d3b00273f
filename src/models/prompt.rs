//! 提示词记录模型

use serde::{Deserialize, Serialize};

/// 已保存的提示词
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPrompt {
    pub id: String,
    pub name: String,
    pub original_prompt: String,
    pub optimized_prompt: String,
    /// 创建时间（Unix 毫秒）
    pub created_at: i64,
    #[serde(default)]
    pub score: Option<f64>,
}

/// 新建提示词时由调用方提供的字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptDraft {
    pub name: String,
    pub original_prompt: String,
    pub optimized_prompt: String,
    pub score: Option<f64>,
}

/// 部分更新；`None` 表示保持原值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptPatch {
    pub name: Option<String>,
    pub original_prompt: Option<String>,
    pub optimized_prompt: Option<String>,
    pub score: Option<Option<f64>>,
}

impl PromptPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.original_prompt.is_none()
            && self.optimized_prompt.is_none()
            && self.score.is_none()
    }

    pub(crate) fn apply(self, prompt: &mut SavedPrompt) {
        if let Some(name) = self.name {
            prompt.name = name;
        }
        if let Some(original) = self.original_prompt {
            prompt.original_prompt = original;
        }
        if let Some(optimized) = self.optimized_prompt {
            prompt.optimized_prompt = optimized;
        }
        if let Some(score) = self.score {
            prompt.score = score;
        }
    }
}
