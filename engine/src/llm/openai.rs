use super::{http_client, status_error, transport_error, LLMError, LLMProvider, Message};
use crate::config::OpenAIConfig;
use crate::secrets::SecretString;
use async_trait::async_trait;
use serde_json::json;

/// Keychain key (and, upper-cased, environment variable) for the API key
pub const API_KEY_NAME: &str = "openai_api_key";

pub struct OpenAIProvider {
    config: OpenAIConfig,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(
        config: OpenAIConfig,
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

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn is_local(&self) -> bool {
        false
    }

    async fn check_health(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    async fn complete(&self, messages: &[Message]) -> super::Result<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            LLMError::AuthenticationFailed("OPENAI_API_KEY is not set".to_string())
        })?;

        let url = format!("{}/chat/completions", self.config.base_url);

        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.to_string(),
                    "content": msg.content
                })
            })
            .collect();

        let payload = json!({
            "model": self.config.model,
            "messages": api_messages,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key.expose()))
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

        data.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(String::from)
            .ok_or_else(|| LLMError::ParseError("No message content in response".to_string()))
    }
}
