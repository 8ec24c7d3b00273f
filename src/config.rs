//! 程序配置
//!
//! 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量。

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// 评分后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 占位后端：随机分数 + 固定建议
    Stub,
    /// 远程 HTTP 评分服务
    Http,
    /// 兼容 OpenAI API 的大模型
    Llm,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stub" => Ok(BackendKind::Stub),
            "http" => Ok(BackendKind::Http),
            "llm" => Ok(BackendKind::Llm),
            other => Err(format!("未知的评分后端: {}", other)),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 强制使用占位后端（优先于 scoring_backend）
    pub use_stub_backend: bool,
    /// 评分后端类型
    pub scoring_backend: BackendKind,
    /// 远程评分服务地址
    pub scoring_endpoint: String,
    /// 评分请求超时（秒）
    pub scoring_timeout_secs: u64,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 占位后端 ---
    pub stub_score_min: u8,
    pub stub_score_max: u8,
    // --- 报告 ---
    /// 报告输出目录
    pub report_output_dir: String,
    /// 报告文件名
    pub report_file_name: String,
    // --- 存储 ---
    /// 键值存储目录
    pub store_dir: String,
    /// 提示词存储使用的键
    pub prompt_store_key: String,
    // --- 服务 / 批量 ---
    /// 评分服务监听地址
    pub server_bind: String,
    /// 批量分析时同时进行的会话数量
    pub max_concurrent_analyses: usize,
    /// 批量分析结果日志
    pub batch_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_stub_backend: true,
            scoring_backend: BackendKind::Stub,
            scoring_endpoint: "http://127.0.0.1:3000/api/analyze".to_string(),
            scoring_timeout_secs: 30,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            stub_score_min: 70,
            stub_score_max: 90,
            report_output_dir: "reports".to_string(),
            report_file_name: "aeo-analysis-report.pdf".to_string(),
            store_dir: ".aeo-store".to_string(),
            prompt_store_key: "saved-prompts".to_string(),
            server_bind: "127.0.0.1:3000".to_string(),
            max_concurrent_analyses: 4,
            batch_log_file: "batch-results.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// 从 TOML 文件加载，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 完整加载流程：配置文件（可选）→ 环境变量 → 校验
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let config = base.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 用环境变量覆盖当前配置
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Some(v) = env_parse("AEO_USE_STUB_BACKEND")? {
            self.use_stub_backend = v;
        }
        if let Some(v) = env_parse("AEO_SCORING_BACKEND")? {
            self.scoring_backend = v;
        }
        if let Ok(v) = std::env::var("AEO_SCORING_ENDPOINT") {
            self.scoring_endpoint = v;
        }
        if let Some(v) = env_parse("AEO_SCORING_TIMEOUT_SECS")? {
            self.scoring_timeout_secs = v;
        }
        if let Ok(v) = std::env::var("LLM_API_KEY") {
            self.llm_api_key = v;
        }
        if let Ok(v) = std::env::var("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = env_parse("AEO_STUB_SCORE_MIN")? {
            self.stub_score_min = v;
        }
        if let Some(v) = env_parse("AEO_STUB_SCORE_MAX")? {
            self.stub_score_max = v;
        }
        if let Ok(v) = std::env::var("AEO_REPORT_OUTPUT_DIR") {
            self.report_output_dir = v;
        }
        if let Ok(v) = std::env::var("AEO_REPORT_FILE_NAME") {
            self.report_file_name = v;
        }
        if let Ok(v) = std::env::var("AEO_STORE_DIR") {
            self.store_dir = v;
        }
        if let Ok(v) = std::env::var("AEO_PROMPT_STORE_KEY") {
            self.prompt_store_key = v;
        }
        if let Ok(v) = std::env::var("AEO_SERVER_BIND") {
            self.server_bind = v;
        }
        if let Some(v) = env_parse("AEO_MAX_CONCURRENT_ANALYSES")? {
            self.max_concurrent_analyses = v;
        }
        if let Ok(v) = std::env::var("AEO_BATCH_LOG_FILE") {
            self.batch_log_file = v;
        }
        if let Some(v) = env_parse("VERBOSE_LOGGING")? {
            self.verbose_logging = v;
        }
        Ok(self)
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stub_score_min > self.stub_score_max || self.stub_score_max > 100 {
            return Err(ConfigError::Invalid {
                key: "stub_score_min/stub_score_max",
                reason: format!(
                    "需要满足 min <= max <= 100，当前为 {}..={}",
                    self.stub_score_min, self.stub_score_max
                ),
            });
        }
        if self.max_concurrent_analyses == 0 {
            return Err(ConfigError::Invalid {
                key: "max_concurrent_analyses",
                reason: "至少为 1".to_string(),
            });
        }
        if self.report_file_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "report_file_name",
                reason: "不能为空".to_string(),
            });
        }
        Ok(())
    }

    /// 实际生效的后端类型
    pub fn effective_backend(&self) -> BackendKind {
        if self.use_stub_backend {
            BackendKind::Stub
        } else {
            self.scoring_backend
        }
    }
}

fn env_parse<T: FromStr>(var_name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        Err(_) => Ok(None),
    }
}
