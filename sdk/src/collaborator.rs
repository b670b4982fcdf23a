//! Collaborator interfaces
//!
//! The console never talks to the social-media platform or the AI assistant
//! directly. A host process hands it implementations of these two traits.

use async_trait::async_trait;

use crate::errors::EngineError;
use crate::thread::RawThread;

/// Social-media account access (conversation fetcher and outbound transport)
#[async_trait]
pub trait SocialClient: Send + Sync {
    /// Platform id of the logged-in account
    fn self_identity(&self) -> &str;

    /// Most recent direct-message threads
    ///
    /// Fails with `EngineError::FetchFailure` when the platform is unreachable
    /// or returns malformed thread data.
    async fn list_recent_threads(
        &self,
        max_threads: usize,
        max_messages_per_thread: usize,
    ) -> Result<Vec<RawThread>, EngineError>;

    /// Resolve a display name (handle, without `@`) to a platform id
    ///
    /// `Ok(None)` means the platform has no such account.
    async fn resolve_identity(&self, display_name: &str) -> Result<Option<String>, EngineError>;

    /// Send one text message to one account
    async fn send_message(&self, identity: &str, text: &str) -> Result<(), EngineError>;
}

/// External AI assistant: text prompt in, text reply out
#[async_trait]
pub trait Analyst: Send + Sync {
    /// Short name used in logs (e.g. the provider name)
    fn name(&self) -> &str;

    /// Send the prompt and return the raw reply text
    async fn analyze(&self, prompt: &str) -> Result<String, EngineError>;

    /// Check whether the assistant is reachable
    /// Default implementation returns true.
    async fn check_health(&self) -> bool {
        true
    }
}
