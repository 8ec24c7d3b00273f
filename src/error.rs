//! 错误类型
//!
//! 每个组件边界都有自己的错误类型，`AppError` 只在 CLI / 服务入口处汇总。
//! 流水线内部的任何错误都不会向上冒泡成致命错误：
//! - `ValidationError`：提交被拒绝，状态不变
//! - `ScoringError`：通知用户，编排器回到 Idle
//! - `ExportError`：记录日志后吞掉，状态不变
//! - `PersistenceError`：记录日志，读降级为空集合，写降级为 `false`

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 提交校验错误
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 评分服务错误
    #[error("评分错误: {0}")]
    Scoring(#[from] ScoringError),
    /// 报告导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 持久化错误
    #[error("存储错误: {0}")]
    Persistence(#[from] PersistenceError),
    /// 分析会话错误
    #[error("分析错误: {0}")]
    Analysis(#[from] AnalysisError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 提交校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// URL 模式下 URL 为空
    #[error("请输入要分析的 URL")]
    EmptyUrl,
    /// 文本模式下内容为空
    #[error("请输入要分析的内容")]
    EmptyContent,
    /// 无法识别的内容类别
    #[error("无法识别的内容类别: {value}")]
    UnknownContentType { value: String },
}

/// 评分服务错误
///
/// 对调用方来说是一个不透明的失败：任何传输或解析问题都归到这里，
/// 不存在"部分分数"的结果。
#[derive(Debug, Error)]
pub enum ScoringError {
    /// 网络请求失败
    #[error("评分请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 后端返回非 2xx 状态
    #[error("评分服务返回错误 (状态码 {status}): {message}")]
    BadStatus { status: u16, message: String },
    /// 响应中缺少 scores 字段
    #[error("评分响应缺少 scores 字段")]
    MissingScores,
    /// 响应 JSON 格式错误
    #[error("评分响应格式错误: {source}")]
    MalformedPayload {
        #[source]
        source: serde_json::Error,
    },
    /// 分项得分超出 [0, 100]
    #[error("分项得分 {field} = {value} 超出范围 [0, 100]")]
    ScoreOutOfRange { field: &'static str, value: i64 },
    /// LLM API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    LlmCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// LLM 返回内容为空或不含 JSON
    #[error("LLM返回内容无法使用 (模型: {model})")]
    EmptyLlmResponse { model: String },
}

impl ScoringError {
    /// 创建网络请求失败错误
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ScoringError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// 创建 LLM 调用失败错误
    pub fn llm_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ScoringError::LlmCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

impl From<serde_json::Error> for ScoringError {
    fn from(err: serde_json::Error) -> Self {
        ScoringError::MalformedPayload { source: err }
    }
}

/// 报告导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 当前没有已完成的分析
    #[error("没有可导出的分析结果")]
    NothingToExport,
    /// 生成文档失败
    #[error("生成报告失败: {source}")]
    RenderFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入报告失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        ExportError::RenderFailed {
            source: Box::new(err),
        }
    }
}

/// 持久化错误
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// 读取存储失败
    #[error("读取存储失败 (key: {key}): {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入存储失败
    #[error("写入存储失败 (key: {key}): {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// 存储内容无法解析
    #[error("存储内容已损坏 (key: {key}): {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// 存储不可用（测试替身或锁中毒）
    #[error("存储不可用: {0}")]
    Unavailable(String),
}

/// 分析会话错误（编排器对调用方返回）
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 已有分析正在进行，拒绝新的提交
    #[error("已有分析正在进行中")]
    Busy,
    /// 提交未通过校验
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 评分失败（编排器已回到 Idle）
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    /// 分析被取消
    #[error("分析已取消")]
    Cancelled,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("无法解析配置文件 {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {key} 不合法: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
