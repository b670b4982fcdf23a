//! Outbound Sender
//!
//! Delivers a pitch plan one recipient at a time. Every message is followed by
//! a fixed pause. A recipient that cannot be resolved or fails mid-way is
//! logged and skipped; the rest of the batch still goes out.

use sdk::collaborator::SocialClient;
use sdk::errors::EngineError;
use serde::Serialize;
use std::time::Duration;

use crate::relay::PitchPlan;

/// Default pause after each message
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(2500);

/// Outcome of one send batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SendReport {
    /// Handles that received every message
    pub delivered: Vec<String>,
    /// Handles with no matching account
    pub unknown: Vec<String>,
    /// Handles that hit an error
    pub failed: Vec<String>,
}

impl SendReport {
    pub fn sent_count(&self) -> usize {
        self.delivered.len()
    }
}

pub struct OutboundSender {
    delay: Duration,
}

impl Default for OutboundSender {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_DELAY)
    }
}

impl OutboundSender {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Send every message of the plan
    pub async fn send(&self, client: &dyn SocialClient, plan: &PitchPlan) -> SendReport {
        let mut report = SendReport::default();

        for (handle, messages) in plan {
            let handle = handle.trim_start_matches('@');
            match self.send_to(client, handle, messages).await {
                Ok(true) => {
                    tracing::info!("Pitched @{} ({} message(s))", handle, messages.len());
                    report.delivered.push(handle.to_string());
                }
                Ok(false) => {
                    tracing::warn!("No account found for @{}, skipping", handle);
                    report.unknown.push(handle.to_string());
                }
                Err(e) => {
                    tracing::error!("Failed to engage @{}: {}", handle, e);
                    report.failed.push(handle.to_string());
                }
            }
        }

        report
    }

    /// Returns `Ok(false)` when the handle does not resolve
    async fn send_to(
        &self,
        client: &dyn SocialClient,
        handle: &str,
        messages: &[String],
    ) -> Result<bool, EngineError> {
        let Some(identity) = client.resolve_identity(handle).await? else {
            return Ok(false);
        };

        for text in messages {
            client
                .send_message(&identity, text)
                .await
                .map_err(|e| match e {
                    EngineError::SendFailure { .. } => e,
                    other => EngineError::SendFailure {
                        recipient: handle.to_string(),
                        reason: other.to_string(),
                    },
                })?;
            tokio::time::sleep(self.delay).await;
        }

        Ok(true)
    }
}
