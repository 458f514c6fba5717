//! 文本生成 fallback 适配器
//!
//! 所有规则都未命中时，Router 把原始输入交给生成器补全。
//! 后端不可用或失败必须优雅降级（GenerationError），绝不让 Router 崩溃。

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use thiserror::Error;

/// 生成失败
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("generator unavailable")]
    Unavailable,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("empty completion")]
    Empty,
}

/// 文本生成器：prompt → 续写文本
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate_continuation(
        &self,
        prompt: &str,
        max_length: u32,
    ) -> Result<String, GenerationError>;
}

/// OpenAI 兼容客户端（可配置 base_url，支持自建代理）
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(base_url: Option<&str>, model: &str, api_key: Option<&str>) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = base_url {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate_continuation(
        &self,
        prompt: &str,
        max_length: u32,
    ) -> Result<String, GenerationError> {
        let message = ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| GenerationError::Backend(e.to_string()))?,
        );
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message])
            .max_completion_tokens(max_length)
            .build()
            .map_err(|e| GenerationError::Backend(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenerationError::Backend(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(content)
    }
}

/// Mock 生成器（测试用，无需 API）：回显 prompt
#[derive(Debug, Default)]
pub struct MockGenerator;

#[async_trait]
impl Generator for MockGenerator {
    async fn generate_continuation(
        &self,
        prompt: &str,
        _max_length: u32,
    ) -> Result<String, GenerationError> {
        Ok(format!("Mock continuation: {}", prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_echoes_prompt() {
        let text = MockGenerator
            .generate_continuation("tell me a story", 60)
            .await
            .unwrap();
        assert!(text.contains("tell me a story"));
    }
}
