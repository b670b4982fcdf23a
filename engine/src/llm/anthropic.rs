use super::{
    http_client, status_error, transport_error, LLMError, LLMProvider, Message, MessageRole,
};
use crate::config::AnthropicConfig;
use crate::secrets::SecretString;
use async_trait::async_trait;
use serde_json::json;

/// Keychain key (and, upper-cased, environment variable) for the API key
pub const API_KEY_NAME: &str = "anthropic_api_key";

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

pub struct AnthropicProvider {
    config: AnthropicConfig,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(
        config: AnthropicConfig,
        api_key: Option<SecretString>,
        timeout_secs: Option<u64>,
    ) -> super::Result<Self> {
        Ok(Self {
            config,
            api_key,
            client: http_client(timeout_secs)?,
        })
    }
}

/// System prompt and chat turns, split the way the Messages API wants them
fn split_system(messages: &[Message]) -> (String, Vec<serde_json::Value>) {
    let mut system_prompt = String::new();
    let mut turns = Vec::new();
    for msg in messages {
        if msg.role == MessageRole::System {
            system_prompt.push_str(&msg.content);
            system_prompt.push('\n');
            continue;
        }
        turns.push(json!({
            "role": msg.role.to_string(),
            "content": msg.content
        }));
    }
    (system_prompt, turns)
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn is_local(&self) -> bool {
        false
    }

    async fn check_health(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    async fn complete(&self, messages: &[Message]) -> super::Result<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            LLMError::AuthenticationFailed("ANTHROPIC_API_KEY is not set".to_string())
        })?;

        let url = format!("{}/messages", self.config.base_url);
        let (system_prompt, api_messages) = split_system(messages);

        let mut payload = json!({
            "model": self.config.model,
            "max_tokens": MAX_TOKENS,
            "messages": api_messages,
        });
        if !system_prompt.is_empty() {
            payload["system"] = json!(system_prompt);
        }

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key.expose())
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, text));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let content_arr = data
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| LLMError::ParseError("No content array in response".to_string()))?;

        Ok(content_arr
            .iter()
            .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
            .collect())
    }
}
