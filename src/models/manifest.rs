//! 批量提交清单

use serde::Deserialize;

/// 清单中的一条提交
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionEntry {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// 仅用于日志显示
    #[serde(default)]
    pub label: Option<String>,
}

fn default_content_type() -> String {
    "blog".to_string()
}

/// 批量提交清单
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionManifest {
    #[serde(default)]
    pub submissions: Vec<SubmissionEntry>,
    #[serde(skip)]
    pub file_path: Option<String>,
}
