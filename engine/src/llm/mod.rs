//! LLM Provider Abstraction Layer
//!
//! This module provides a common interface for the LLM providers that can
//! back the console's analyst (Ollama, OpenAI, Anthropic). Providers turn a
//! short conversation into reply text; [`analyst::LlmAnalyst`] adapts one of
//! them to the `sdk::Analyst` trait.

use async_trait::async_trait;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::LLMConfig;
use crate::secrets::SecretManager;

pub mod analyst;
pub mod anthropic;
pub mod ollama;
pub mod openai;

pub use analyst::LlmAnalyst;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<LLMError> for EngineError {
    fn from(e: LLMError) -> Self {
        EngineError::Analyst(e.to_string())
    }
}

/// Message in a provider conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

/// LLM Provider trait that all providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "ollama", "openai", "anthropic")
    fn name(&self) -> &str;

    /// Returns true if this is a local provider (e.g., Ollama), false for cloud providers
    fn is_local(&self) -> bool;

    /// Generate a reply
    ///
    /// # Arguments
    /// * `messages` - Conversation so far, system prompt first when present
    ///
    /// # Returns
    /// * `Ok(String)` - The reply text, unparsed
    /// * `Err(LLMError)` - If the request fails
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Check if the provider is currently healthy and available
    /// Default implementation returns true.
    async fn check_health(&self) -> bool {
        true
    }
}

/// HTTP client shared by the providers
///
/// `timeout_secs` of `None` leaves requests unbounded.
pub(crate) fn http_client(timeout_secs: Option<u64>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| LLMError::ProviderUnavailable(format!("Failed to create HTTP client: {}", e)))
}

/// Map a non-success HTTP status from a cloud provider
pub(crate) fn status_error(status: reqwest::StatusCode, body: String) -> LLMError {
    match status.as_u16() {
        401 | 403 => LLMError::AuthenticationFailed(body),
        429 => LLMError::RateLimitExceeded,
        _ => LLMError::InvalidRequest(format!("{}: {}", status, body)),
    }
}

/// Map a transport error
pub(crate) fn transport_error(e: reqwest::Error) -> LLMError {
    if e.is_timeout() {
        LLMError::Timeout
    } else {
        LLMError::NetworkError(e.to_string())
    }
}

/// Build the provider selected by `llm.default_provider`
///
/// Cloud providers look their API key up once here; a missing key does not
/// fail construction but makes every request fail with
/// `AuthenticationFailed`.
pub fn build_provider(
    config: &LLMConfig,
    secrets: &SecretManager,
) -> std::result::Result<Box<dyn LLMProvider>, EngineError> {
    let timeout = config.request_timeout_secs;

    let provider: Box<dyn LLMProvider> = match config.default_provider.as_str() {
        "ollama" => Box::new(ollama::OllamaProvider::new(
            config.ollama.base_url.clone(),
            config.ollama.model.clone(),
            timeout,
        )?),
        "openai" => Box::new(openai::OpenAIProvider::new(
            config.openai.clone(),
            secrets.get_secret(openai::API_KEY_NAME)?,
            timeout,
        )?),
        "anthropic" => Box::new(anthropic::AnthropicProvider::new(
            config.anthropic.clone(),
            secrets.get_secret(anthropic::API_KEY_NAME)?,
            timeout,
        )?),
        other => {
            return Err(EngineError::Config(format!(
                "Unknown LLM provider '{}'",
                other
            )))
        }
    };

    tracing::info!(
        "Using {} provider ({})",
        provider.name(),
        if provider.is_local() { "local" } else { "cloud" }
    );
    Ok(provider)
}
