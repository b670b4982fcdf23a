//! HTTP gateway client
//!
//! Endpoints:
//! - `POST /auth/login` `{username, password}` -> `{session_id, user_id}`
//! - `GET /direct/threads?amount=N&thread_message_limit=M` -> `[thread]`
//! - `GET /users/lookup?username=U` -> `{pk}`, 404 when unknown
//! - `POST /direct/send` `{user_ids, text}`
//!
//! Every call after login carries the session in `X-Session-Id`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use sdk::collaborator::SocialClient;
use sdk::errors::EngineError;
use sdk::thread::RawThread;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SocialConfig;
use crate::secrets::SecretString;

const SESSION_HEADER: &str = "X-Session-Id";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    session_id: String,
    user_id: serde_json::Value,
}

#[derive(Deserialize)]
struct LookupResponse {
    pk: serde_json::Value,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    user_ids: [&'a str; 1],
    text: &'a str,
}

pub struct BridgeClient {
    base_url: String,
    client: Client,
    session_id: SecretString,
    user_id: String,
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl BridgeClient {
    /// Log in through the gateway
    ///
    /// A rejected login is `Authentication`; an unreachable gateway is
    /// `Network`.
    pub async fn login(
        config: &SocialConfig,
        username: &str,
        password: &SecretString,
    ) -> Result<Self, EngineError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| EngineError::Network(format!("Failed to create HTTP client: {}", e)))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        info!("Logging in as @{} via {}", username, base_url);
        let response = client
            .post(format!("{}/auth/login", base_url))
            .json(&LoginRequest {
                username,
                password: password.expose(),
            })
            .send()
            .await
            .map_err(|e| EngineError::Network(format!("Gateway unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Authentication(format!("{}: {}", status, body)));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Authentication(format!("Unexpected login reply: {}", e)))?;
        let user_id = id_string(&login.user_id).ok_or_else(|| {
            EngineError::Authentication("Login reply carried no user id".to_string())
        })?;

        info!("Logged in; account id {}", user_id);
        Ok(Self {
            base_url,
            client,
            session_id: SecretString::new(login.session_id),
            user_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SocialClient for BridgeClient {
    fn self_identity(&self) -> &str {
        &self.user_id
    }

    async fn list_recent_threads(
        &self,
        max_threads: usize,
        max_messages_per_thread: usize,
    ) -> Result<Vec<RawThread>, EngineError> {
        let response = self
            .client
            .get(self.url("/direct/threads"))
            .header(SESSION_HEADER, self.session_id.expose())
            .query(&[
                ("amount", max_threads),
                ("thread_message_limit", max_messages_per_thread),
            ])
            .send()
            .await
            .map_err(|e| EngineError::FetchFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::FetchFailure(format!("{}: {}", status, body)));
        }

        let threads: Vec<RawThread> = response
            .json()
            .await
            .map_err(|e| EngineError::FetchFailure(format!("Malformed thread data: {}", e)))?;

        debug!("Gateway returned {} thread(s)", threads.len());
        Ok(threads)
    }

    async fn resolve_identity(&self, display_name: &str) -> Result<Option<String>, EngineError> {
        let response = self
            .client
            .get(self.url("/users/lookup"))
            .header(SESSION_HEADER, self.session_id.expose())
            .query(&[("username", display_name)])
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let lookup: LookupResponse = response
                    .json()
                    .await
                    .map_err(|e| EngineError::Network(format!("Malformed lookup reply: {}", e)))?;
                Ok(id_string(&lookup.pk))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(EngineError::Network(format!(
                    "Lookup of @{} failed ({}): {}",
                    display_name, status, body
                )))
            }
        }
    }

    async fn send_message(&self, identity: &str, text: &str) -> Result<(), EngineError> {
        let send_failure = |reason: String| EngineError::SendFailure {
            recipient: identity.to_string(),
            reason,
        };

        let response = self
            .client
            .post(self.url("/direct/send"))
            .header(SESSION_HEADER, self.session_id.expose())
            .json(&SendRequest {
                user_ids: [identity],
                text,
            })
            .send()
            .await
            .map_err(|e| send_failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(send_failure(format!("{}: {}", status, body)));
        }

        Ok(())
    }
}

/// Platform ids arrive as JSON strings or numbers
fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
