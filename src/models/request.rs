//! 分析请求模型

use crate::error::ValidationError;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 内容类别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    /// 博客文章
    #[default]
    Blog,
    /// 商品页
    Product,
    /// 普通文章
    Article,
    /// 落地页
    LandingPage,
    /// 常见问题
    Faq,
    /// 新闻
    News,
}

/// 别名表，解析用户输入的类别
static CONTENT_TYPE_ALIASES: phf::Map<&'static str, ContentType> = phf_map! {
    "blog" => ContentType::Blog,
    "blog-post" => ContentType::Blog,
    "post" => ContentType::Blog,
    "product" => ContentType::Product,
    "product-page" => ContentType::Product,
    "article" => ContentType::Article,
    "landing" => ContentType::LandingPage,
    "landing-page" => ContentType::LandingPage,
    "faq" => ContentType::Faq,
    "news" => ContentType::News,
};

impl ContentType {
    /// 发送给评分服务的字符串
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::Product => "product",
            ContentType::Article => "article",
            ContentType::LandingPage => "landing-page",
            ContentType::Faq => "faq",
            ContentType::News => "news",
        }
    }

    /// 尝试从字符串解析类别（忽略大小写，`_` 与 `-` 等价）
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace('_', "-");
        CONTENT_TYPE_ALIASES.get(key.as_str()).copied()
    }
}

impl FromStr for ContentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ValidationError::UnknownContentType {
            value: s.to_string(),
        })
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 提交模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionMode {
    /// 提交 URL
    Url,
    /// 提交原始文本
    Content,
}

/// 分析请求
///
/// 构造后不可变，只能通过 `SubmissionCollector` 创建。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    content: String,
    content_type: ContentType,
    content_source: String,
}

impl AnalysisRequest {
    pub(crate) fn new(content: String, content_type: ContentType, content_source: String) -> Self {
        Self {
            content,
            content_type,
            content_source,
        }
    }

    /// 待分析的内容（URL 或原始文本）
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// 人类可读的内容预览
    pub fn content_source(&self) -> &str {
        &self.content_source
    }
}
