//! 提交收集 - 业务能力层
//!
//! 只负责"校验并构造分析请求"，没有网络或存储副作用

use crate::error::ValidationError;
use crate::models::{AnalysisRequest, ContentType, SubmissionMode};
use crate::utils::logging::truncate_text;
use tracing::debug;

/// 文本预览的最大字符数
pub const PREVIEW_CHARS: usize = 100;

/// 表单输入
///
/// 两个输入框的值都保留，由 `mode` 决定使用哪一个。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub mode: SubmissionMode,
    pub url: String,
    pub text: String,
    pub content_type: ContentType,
}

impl SubmissionForm {
    pub fn url(url: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            mode: SubmissionMode::Url,
            url: url.into(),
            text: String::new(),
            content_type,
        }
    }

    pub fn text(text: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            mode: SubmissionMode::Content,
            url: String::new(),
            text: text.into(),
            content_type,
        }
    }
}

/// 提交收集器
pub struct SubmissionCollector;

impl SubmissionCollector {
    /// 校验表单并构造 `AnalysisRequest`
    pub fn collect(form: &SubmissionForm) -> Result<AnalysisRequest, ValidationError> {
        Self::submit(form.mode, &form.url, &form.text, form.content_type)
    }

    /// 校验当前模式下的输入
    ///
    /// - URL 模式：`content_source` 与 URL 相同
    /// - 文本模式：正文不做修改，`content_source` 为前 100 个字符，超出时追加 `...`
    pub fn submit(
        mode: SubmissionMode,
        url_value: &str,
        text_value: &str,
        content_type: ContentType,
    ) -> Result<AnalysisRequest, ValidationError> {
        let request = match mode {
            SubmissionMode::Url => {
                let url = url_value.trim();
                if url.is_empty() {
                    return Err(ValidationError::EmptyUrl);
                }
                AnalysisRequest::new(url.to_string(), content_type, url.to_string())
            }
            SubmissionMode::Content => {
                // 只用 trim 判断是否为空，正文原样提交
                if text_value.trim().is_empty() {
                    return Err(ValidationError::EmptyContent);
                }
                let preview = truncate_text(text_value, PREVIEW_CHARS);
                AnalysisRequest::new(text_value.to_string(), content_type, preview)
            }
        };

        debug!(
            "构造分析请求: 模式 {:?} | 类别 {} | 内容长度 {} 字符",
            mode,
            content_type,
            request.content().chars().count()
        );

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_rejected() {
        let result = SubmissionCollector::submit(
            SubmissionMode::Url,
            "   ",
            "some text that is ignored",
            ContentType::Blog,
        );
        assert_eq!(result, Err(ValidationError::EmptyUrl));
    }

    #[test]
    fn test_empty_text_rejected() {
        let result = SubmissionCollector::submit(
            SubmissionMode::Content,
            "https://example.com",
            "",
            ContentType::Article,
        );
        assert_eq!(result, Err(ValidationError::EmptyContent));
    }

    #[test]
    fn test_url_source_equals_url() {
        let request = SubmissionCollector::submit(
            SubmissionMode::Url,
            "https://example.com/post",
            "",
            ContentType::Blog,
        )
        .unwrap();
        assert_eq!(request.content(), "https://example.com/post");
        assert_eq!(request.content_source(), request.content());
        assert_eq!(request.content_type(), ContentType::Blog);
    }

    #[test]
    fn test_long_text_is_truncated_with_marker() {
        let text: String = "abcdefghij".repeat(15);
        assert_eq!(text.chars().count(), 150);

        let request =
            SubmissionCollector::collect(&SubmissionForm::text(text.clone(), ContentType::Article))
                .unwrap();
        assert_eq!(request.content(), text);
        assert_eq!(
            request.content_source(),
            format!("{}...", &text[..100])
        );
    }

    #[test]
    fn test_short_text_is_unchanged() {
        let text: String = "x".repeat(50);
        let request =
            SubmissionCollector::collect(&SubmissionForm::text(text.clone(), ContentType::Faq))
                .unwrap();
        assert_eq!(request.content_source(), text);
    }

    #[test]
    fn test_text_content_is_submitted_verbatim() {
        let text = format!("    {}\n", "y".repeat(146));
        let request =
            SubmissionCollector::collect(&SubmissionForm::text(text.clone(), ContentType::Blog))
                .unwrap();
        assert_eq!(request.content(), text);
        assert_eq!(
            request.content_source(),
            format!("    {}...", "y".repeat(96))
        );
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let text: String = "答".repeat(120);
        let request =
            SubmissionCollector::collect(&SubmissionForm::text(text, ContentType::Blog)).unwrap();
        let preview = request.content_source();
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
    }
}
