//! Integration tests for configuration management
//!
//! These tests verify that the Config struct can be created on first run,
//! loaded back from disk, and validated.

use instabuyer_engine::config::Config;
use instabuyer_engine::console::ConsoleSettings;
use sdk::errors::EngineError;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_first_run_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let created = Config::load_or_create_at(&path).unwrap();
    assert!(path.exists());
    assert_eq!(created, Config::default());

    let reloaded = Config::load_or_create_at(&path).unwrap();
    assert_eq!(reloaded, created);
}

#[test]
fn test_config_toml_parsing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[core]
log_level = "debug"

[fetch]
max_threads = 5
messages_per_thread = 10
brief_max_messages = 3
brief_max_chars = 80

[outreach]
send_delay_ms = 4000

[social]
base_url = "http://gateway.local:9000"
request_timeout_secs = 30

[llm]
default_provider = "anthropic"

[llm.anthropic]
model = "claude-3-5-haiku-20241022"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.social.request_timeout_secs, Some(30));
    assert_eq!(config.llm.default_provider, "anthropic");
    assert_eq!(config.llm.anthropic.model, "claude-3-5-haiku-20241022");
    // Unset sections keep their defaults
    assert_eq!(config.llm.ollama.base_url, "http://localhost:11434");

    let settings = ConsoleSettings::from_config(&config);
    assert_eq!(settings.max_threads, 5);
    assert_eq!(settings.messages_per_thread, 10);
    assert_eq!(settings.brief_limits.max_messages, 3);
    assert_eq!(settings.brief_limits.max_chars, 80);
    assert_eq!(settings.send_delay, Duration::from_millis(4000));
}

#[test]
fn test_invalid_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    fs::write(&path, "[fetch\nmax_threads = ").unwrap();
    assert!(matches!(
        Config::load_from_path(&path),
        Err(EngineError::Config(_))
    ));

    fs::write(&path, "[fetch]\nmax_threads = 0\n").unwrap();
    match Config::load_from_path(&path) {
        Err(EngineError::Config(msg)) => assert!(msg.contains("fetch.max_threads")),
        other => panic!("Expected Config error, got: {:?}", other),
    }

    fs::write(&path, "[outreach]\nsend_delay_ms = 0\n").unwrap();
    match Config::load_from_path(&path) {
        Err(EngineError::Config(msg)) => assert!(msg.contains("outreach.send_delay_ms")),
        other => panic!("Expected Config error, got: {:?}", other),
    }

    fs::write(&path, "[llm]\ndefault_provider = \"gemini\"\n").unwrap();
    assert!(Config::load_from_path(&path).is_err());
}
