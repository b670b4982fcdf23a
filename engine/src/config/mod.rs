//! Configuration management
//!
//! This module handles loading, validation, and management of the console
//! configuration. Configuration is stored in TOML format at
//! ~/.instabuyer/config.toml unless `--config` points elsewhere.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **fetch**: Thread and brief limits for each analysis run
//! - **outreach**: Pause between outbound messages
//! - **social**: Social gateway location
//! - **llm**: LLM provider settings and preferences
//!
//! Account credentials and API keys never live in this file. Credentials come
//! from the command line or environment; API keys from the environment or the
//! OS keychain.
//!
//! # Examples
//!
//! ```no_run
//! use instabuyer_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from default location
//! let config = Config::load_or_create()?;
//!
//! // Access configuration values
//! println!("Threads per run: {}", config.fetch.max_threads);
//! println!("Default provider: {}", config.llm.default_provider);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::brief::{BriefLimits, DEFAULT_MAX_CHARS, DEFAULT_MAX_MESSAGES};

/// Log levels accepted in `core.log_level`
pub const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Lower bound for `outreach.send_delay_ms`
pub const MIN_SEND_DELAY_MS: u64 = 2500;

/// Providers accepted in `llm.default_provider`
pub const VALID_PROVIDERS: [&str; 3] = ["ollama", "openai", "anthropic"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Fetch and brief limits
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Outbound message pacing
    #[serde(default)]
    pub outreach: OutreachConfig,

    /// Social gateway settings
    #[serde(default)]
    pub social: SocialConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub llm: LLMConfig,
}

/// Core configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Limits applied on every fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Threads requested from the platform
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,

    /// Messages requested per thread
    #[serde(default = "default_messages_per_thread")]
    pub messages_per_thread: usize,

    /// Messages kept in each brief
    #[serde(default = "default_brief_max_messages")]
    pub brief_max_messages: usize,

    /// Characters kept per brief message
    #[serde(default = "default_brief_max_chars")]
    pub brief_max_chars: usize,
}

/// Outbound message pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutreachConfig {
    /// Pause after every sent message, in milliseconds
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
}

/// Social gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialConfig {
    /// Base URL of the HTTP gateway
    #[serde(default = "default_social_base_url")]
    pub base_url: String,

    /// Per-request timeout; unset means no timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

/// LLM provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Default LLM provider (ollama, openai, anthropic)
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Per-request timeout; unset means no timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Ollama provider settings
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// OpenAI provider settings
    #[serde(default)]
    pub openai: OpenAIConfig,

    /// Anthropic provider settings
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

/// Ollama provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL for Ollama API
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

/// OpenAI provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Base URL for OpenAI API
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_openai_model")]
    pub model: String,
    // Note: API key stored in OS keychain, not in config
}

/// Anthropic provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// Base URL for Anthropic API
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_anthropic_model")]
    pub model: String,
    // Note: API key stored in OS keychain, not in config
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_threads() -> usize {
    20
}

fn default_messages_per_thread() -> usize {
    20
}

fn default_brief_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

fn default_brief_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_send_delay_ms() -> u64 {
    MIN_SEND_DELAY_MS
}

fn default_social_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_threads: default_max_threads(),
            messages_per_thread: default_messages_per_thread(),
            brief_max_messages: default_brief_max_messages(),
            brief_max_chars: default_brief_max_chars(),
        }
    }
}

impl FetchConfig {
    pub fn brief_limits(&self) -> BriefLimits {
        BriefLimits {
            max_messages: self.brief_max_messages,
            max_chars: self.brief_max_chars,
        }
    }
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            send_delay_ms: default_send_delay_ms(),
        }
    }
}

impl OutreachConfig {
    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            base_url: default_social_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            request_timeout_secs: None,
            ollama: OllamaConfig::default(),
            openai: OpenAIConfig::default(),
            anthropic: AnthropicConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
        }
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_openai_model(),
        }
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: default_anthropic_base_url(),
            model: default_anthropic_model(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            fetch: FetchConfig::default(),
            outreach: OutreachConfig::default(),
            social: SocialConfig::default(),
            llm: LLMConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.instabuyer/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;
        Self::load_or_create_at(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    ///
    /// A leading `~` in the path is expanded to the home directory.
    pub fn load_or_create_at(path: &Path) -> Result<Self, EngineError> {
        let path = expand_path(path)?;

        if path.exists() {
            Self::load_from_path(&path)
        } else {
            Self::create_default(&path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();
        config.validate()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(config)
    }

    /// Get the default configuration file path (~/.instabuyer/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".instabuyer").join("config.toml"))
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The log level or default provider is unknown
    /// - Any fetch limit is zero
    /// - A base URL is empty
    pub fn validate(&self) -> Result<(), EngineError> {
        if !VALID_LOG_LEVELS.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        if !VALID_PROVIDERS.contains(&self.llm.default_provider.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid default provider '{}'. Must be one of: {}",
                self.llm.default_provider,
                VALID_PROVIDERS.join(", ")
            )));
        }

        let limits = [
            ("fetch.max_threads", self.fetch.max_threads),
            ("fetch.messages_per_thread", self.fetch.messages_per_thread),
            ("fetch.brief_max_messages", self.fetch.brief_max_messages),
            ("fetch.brief_max_chars", self.fetch.brief_max_chars),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(EngineError::Config(format!("{} must be at least 1", name)));
        }

        if self.outreach.send_delay_ms < MIN_SEND_DELAY_MS {
            return Err(EngineError::Config(format!(
                "outreach.send_delay_ms must be at least {}",
                MIN_SEND_DELAY_MS
            )));
        }

        if self.social.base_url.trim().is_empty() {
            return Err(EngineError::Config(
                "social.base_url must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
