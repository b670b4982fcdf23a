//! `sdk::Analyst` backed by an LLM provider

use async_trait::async_trait;
use sdk::collaborator::Analyst;
use sdk::errors::EngineError;

use super::{LLMProvider, Message};

/// Steers providers towards bare JSON replies
const SYSTEM_PROMPT: &str =
    "You are a sales analyst. Follow the output format in the user's message exactly and reply with JSON only.";

pub struct LlmAnalyst {
    provider: Box<dyn LLMProvider>,
}

impl LlmAnalyst {
    pub fn new(provider: Box<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Analyst for LlmAnalyst {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn analyze(&self, prompt: &str) -> Result<String, EngineError> {
        let messages = [Message::system(SYSTEM_PROMPT), Message::user(prompt)];
        let reply = self.provider.complete(&messages).await?;
        tracing::debug!("{} replied with {} chars", self.provider.name(), reply.len());
        Ok(reply)
    }

    async fn check_health(&self) -> bool {
        self.provider.check_health().await
    }
}
