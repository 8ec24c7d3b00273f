//! LLM 评分后端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）
//!
//! 模型被要求只输出评分 JSON；回复中的 JSON 对象（带或不带 ``` 代码块）
//! 被提取出来后，和其他后端一样走 `ScoreResponse` 的校验。

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use super::{ScoreRequest, ScoreResponse, ScoringBackend};
use crate::config::Config;
use crate::error::{ConfigError, ScoringError};

const SYSTEM_MESSAGE: &str = "You are an answer engine optimization (AEO) auditor. \
Score the submitted content on four dimensions, each an integer from 0 to 100: \
keywordRelevance, readability, snippetOptimization, structuredData. \
Then give three to five short recommendations, each written as \"Title: description\". \
Reply with JSON only, exactly in this shape: \
{\"scores\": {\"keywordRelevance\": 0, \"readability\": 0, \"snippetOptimization\": 0, \"structuredData\": 0}, \
\"recommendations\": [\"Title: description\"]}";

/// 从回复中提取 JSON 对象：优先取代码块，其次取第一个 `{` 到最后一个 `}`
pub(crate) fn extract_json(reply: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```|(\{.*\})").ok()?;
    let caps = re.captures(reply)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// LLM 评分后端
pub struct LlmScoringBackend {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmScoringBackend {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        if config.llm_api_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "llm_api_key",
                reason: "LLM 评分后端需要 API Key".to_string(),
            });
        }

        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        })
    }

    fn build_user_message(request: &ScoreRequest) -> String {
        format!(
            "Content type: {}\n\nContent (a URL or the raw text):\n{}",
            request.content_type, request.content
        )
    }

    async fn send_to_llm(&self, user_message: &str) -> Result<String, ScoringError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let map_err = |e: OpenAIError| ScoringError::llm_call_failed(&self.model_name, e);

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_MESSAGE)
                    .build()
                    .map_err(map_err)?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_message)
                    .build()
                    .map_err(map_err)?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(1024u32)
            .build()
            .map_err(map_err)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            map_err(e)
        })?;

        debug!("LLM API 调用成功");

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ScoringError::EmptyLlmResponse {
                model: self.model_name.clone(),
            })
    }
}

#[async_trait]
impl ScoringBackend for LlmScoringBackend {
    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ScoringError> {
        let reply = self.send_to_llm(&Self::build_user_message(request)).await?;

        let json = extract_json(&reply).ok_or_else(|| {
            warn!("无法从 LLM 回复中提取 JSON: '{}'", reply);
            ScoringError::EmptyLlmResponse {
                model: self.model_name.clone(),
            }
        })?;

        ScoreResponse::from_json(json)
    }

    fn name(&self) -> &str {
        "llm"
    }
}
