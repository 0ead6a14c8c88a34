use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ProviderError, error_message};
use crate::config::AiConfig;

const SYSTEM_PROMPT: &str = "You are a helpful business advisor for small shops in India. \
The shop owner speaks simple Hindi/English. Give practical, actionable advice. \
Keep responses concise (3-4 sentences) and friendly. \
Use emojis occasionally to make it engaging. \
Include specific numbers and data points when available.";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

/// Chat-completion backend for the business assistant.
#[async_trait]
pub trait Advisor: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Answers `prompt` (business context plus the owner's question).
    async fn advise(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// OpenAI-compatible chat completion client (Groq by default).
pub struct ChatCompletionClient {
    http: reqwest::Client,
    config: AiConfig,
}

impl ChatCompletionClient {
    pub fn new(http: reqwest::Client, config: AiConfig) -> Self {
        Self { http, config }
    }
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[async_trait]
impl Advisor for ChatCompletionClient {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn advise(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("AI service"))?;

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.config.model,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": prompt },
                ],
                "temperature": TEMPERATURE,
                "max_tokens": MAX_TOKENS,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            return Err(ProviderError::Rejected(error_message(status, &body)));
        }

        let completion: Completion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| ProviderError::Rejected("empty completion".into()))
    }
}
