//! Error types and handling
//!
//! This module provides the error taxonomy shared by the console and its
//! collaborators. All errors implement the `ConsoleErrorExt` trait which
//! provides a user-facing hint and indicates whether the error is recoverable.
//!
//! # Failure policy
//!
//! - Fetch failures leave the session cache untouched
//! - Malformed AI responses abort the current command without a partial merge
//! - Send failures are per recipient and never abort a batch
//! - Only missing startup credentials are fatal

use thiserror::Error;

/// Trait for console error extensions
pub trait ConsoleErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to hand back to the host process and never contains
    /// credentials or raw collaborator payloads.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors leave the session usable: the same command can be
    /// retried or a different one issued.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{ConsoleErrorExt, EngineError};
///
/// let error = EngineError::InvalidKpi {
///     kpi: "loyalty".to_string(),
///     known: vec!["spending".to_string(), "trust".to_string()],
/// };
/// assert_eq!(
///     error.to_string(),
///     "Unknown KPI 'loyalty'. Known KPIs: spending, trust"
/// );
/// assert!(error.is_recoverable());
///
/// assert!(!EngineError::MissingCredentials.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Account credentials not provided")]
    MissingCredentials,

    #[error("Authentication failed: {0}")]
    Authentication(String),

    // Social-media collaborator errors
    #[error("Failed to fetch chats: {0}")]
    FetchFailure(String),

    #[error("Failed to send to {recipient}: {reason}")]
    SendFailure { recipient: String, reason: String },

    // AI collaborator errors
    #[error("Analyst unavailable: {0}")]
    Analyst(String),

    #[error("Malformed AI response: {0}")]
    MalformedAiResponse(String),

    // Query errors
    #[error("Unknown KPI '{kpi}'. Known KPIs: {}", .known.join(", "))]
    InvalidKpi { kpi: String, known: Vec<String> },

    // Command errors
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // Keyring errors
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::MissingCredentials => {
                "Pass --username/--password or set INSTAGRAM_USERNAME/INSTAGRAM_PASSWORD"
            }
            Self::Authentication(_) => "Login was rejected. Check the account credentials",

            Self::FetchFailure(_) => "Could not load conversations. Check the gateway and retry",
            Self::SendFailure { .. } => "The message was not delivered to this recipient",

            Self::Analyst(_) => "AI provider unavailable. Check your API keys and network",
            Self::MalformedAiResponse(_) => {
                "The AI reply was not the expected JSON. Run the command again"
            }

            Self::InvalidKpi { .. } => "Use one of the listed KPI names",

            Self::UnknownCommand(_) => "Unknown command requested",
            Self::InvalidParameter(_) => "Check the command parameters",

            Self::KeyringError(_) => "Failed to access secure storage. Check system keychain",
            Self::Network(_) => "Network operation failed. Check your connection",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::MissingCredentials | Self::Authentication(_) => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_kpi_lists_known_names() {
        let error = EngineError::InvalidKpi {
            kpi: "vibes".to_string(),
            known: vec!["spending".to_string(), "price_focus".to_string()],
        };
        let message = error.to_string();
        assert!(message.contains("vibes"));
        assert!(message.contains("spending, price_focus"));
    }

    #[test]
    fn test_send_failure_names_recipient() {
        let error = EngineError::SendFailure {
            recipient: "@ana".to_string(),
            reason: "blocked".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to send to @ana: blocked");
    }

    #[test]
    fn test_malformed_response_carries_parse_error() {
        let error = EngineError::MalformedAiResponse("expected value at line 1".to_string());
        assert!(error.to_string().contains("expected value at line 1"));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_credential_errors_are_fatal() {
        assert!(!EngineError::MissingCredentials.is_recoverable());
        assert!(!EngineError::Authentication("bad password".to_string()).is_recoverable());
        assert!(EngineError::FetchFailure("timeout".to_string()).is_recoverable());
    }

    #[test]
    fn test_hints_do_not_echo_details() {
        let error = EngineError::Authentication("password=hunter2".to_string());
        assert!(!error.user_hint().contains("hunter2"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let error: EngineError = io.into();
        assert!(matches!(error, EngineError::Io(_)));
    }
}
