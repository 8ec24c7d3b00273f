//! 分析会话上下文
//!
//! 封装"我正在处理第几次会话、什么内容"这一信息，只用于日志

use std::fmt::Display;

use crate::models::{AnalysisRequest, ContentType};
use crate::utils::logging::truncate_text;

/// 会话上下文
#[derive(Debug, Clone)]
pub struct SessionCtx {
    /// 会话编号（同一编排器内递增）
    pub session_id: u64,

    /// 内容类别
    pub content_type: ContentType,

    /// 日志用的内容预览
    pub preview: String,
}

impl SessionCtx {
    pub fn new(session_id: u64, request: &AnalysisRequest) -> Self {
        Self {
            session_id,
            content_type: request.content_type(),
            preview: truncate_text(request.content_source(), 40),
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[会话 #{} {}]", self.session_id, self.content_type)
    }
}
