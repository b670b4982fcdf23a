//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - serve: Log in and answer console commands over stdio
//! - kpis: List the KPI catalog
//! - doctor: Validate configuration and check the collaborators

use anyhow::{Context, Result};
use sdk::errors::EngineError;
use serde_json::json;

use crate::config::Config;
use crate::console::{transport, ConsoleSettings, LeadConsole};
use crate::llm::{anthropic, build_provider, openai, LlmAnalyst};
use crate::secrets::{SecretManager, SecretString};
use crate::session::KPI_CATALOG;
use crate::social::BridgeClient;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Log in, then serve console commands until stdin closes
///
/// A failed login is fatal: no console is started.
pub async fn handle_serve(
    config: &Config,
    credentials: Result<(String, SecretString), EngineError>,
) -> Result<()> {
    let (username, password) = credentials?;

    let social = BridgeClient::login(&config.social, &username, &password)
        .await
        .context("Login failed")?;

    let secrets = SecretManager::default();
    let provider = build_provider(&config.llm, &secrets)?;
    let analyst = LlmAnalyst::new(provider);

    let mut console = LeadConsole::new(
        Box::new(social),
        Box::new(analyst),
        ConsoleSettings::from_config(config),
    );

    tracing::info!("Console ready, reading commands from stdin");
    let answered = transport::serve_stdio(&mut console)
        .await
        .context("Console transport failed")?;
    tracing::info!("Console stopped after {} command(s)", answered);

    Ok(())
}

/// Print the KPI catalog
pub fn handle_kpis(format: OutputFormat) -> Result<()> {
    println!("{}", render_kpis(format)?);
    Ok(())
}

fn render_kpis(format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "kpis": KPI_CATALOG
        }))?),
        OutputFormat::Text => {
            let mut out = String::from("KPIs\n====\n");
            for kpi in KPI_CATALOG {
                out.push_str(&format!("  {:<20} {}\n", kpi.name, kpi.description));
            }
            Ok(out.trim_end().to_string())
        }
    }
}

/// Results of the doctor checks
#[derive(Debug, Default)]
struct DoctorReport {
    checks: Vec<(&'static str, String)>,
    issues: Vec<String>,
}

impl DoctorReport {
    fn check(&mut self, name: &'static str, status: impl Into<String>) {
        self.checks.push((name, status.into()));
    }

    fn issue(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    fn healthy(&self) -> bool {
        self.issues.is_empty()
    }

    fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => {
                let checks: serde_json::Map<String, serde_json::Value> = self
                    .checks
                    .iter()
                    .map(|(name, status)| (name.to_string(), json!(status)))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "checks": checks,
                    "issues": self.issues,
                    "healthy": self.healthy(),
                }))?)
            }
            OutputFormat::Text => {
                let mut out = String::from("System Health Check\n===================\n\n");
                for (name, status) in &self.checks {
                    out.push_str(&format!("  {:<25} {}\n", name, status));
                }
                out.push('\n');
                if self.healthy() {
                    out.push_str("✓ All checks passed!");
                } else {
                    out.push_str("Issues found:\n");
                    for issue in &self.issues {
                        out.push_str(&format!("  ✗ {}\n", issue));
                    }
                }
                Ok(out.trim_end().to_string())
            }
        }
    }
}

/// Validate configuration and check that the collaborators are usable
///
/// Does not log in: a login can trip the account's security checks.
pub async fn handle_doctor(config: &Config, has_credentials: bool, format: OutputFormat) -> Result<()> {
    let secrets = SecretManager::default();
    let report = run_checks(config, has_credentials, &secrets).await;
    println!("{}", report.render(format)?);
    Ok(())
}

async fn run_checks(config: &Config, has_credentials: bool, secrets: &SecretManager) -> DoctorReport {
    let mut report = DoctorReport::default();

    // Config is already validated when loaded
    report.check("Configuration", "Valid");

    if has_credentials {
        report.check("Account credentials", "Provided");
    } else {
        report.check("Account credentials", "Missing");
        report.issue(EngineError::MissingCredentials.to_string());
    }

    report.check("Social gateway", config.social.base_url.clone());

    let key_name = match config.llm.default_provider.as_str() {
        "openai" => Some(openai::API_KEY_NAME),
        "anthropic" => Some(anthropic::API_KEY_NAME),
        _ => None,
    };
    if let Some(key) = key_name {
        if secrets.has_secret(key) {
            report.check("API key", "Configured");
        } else {
            report.check("API key", "Not configured");
            report.issue(format!(
                "Set {} or store '{}' in the keychain",
                SecretManager::env_var_name(key),
                key
            ));
        }
    }

    match build_provider(&config.llm, secrets) {
        Ok(provider) => {
            if provider.check_health().await {
                report.check("LLM provider", format!("{} (available)", provider.name()));
            } else {
                report.check("LLM provider", format!("{} (not available)", provider.name()));
                report.issue(format!(
                    "The {} provider is not reachable. Analysis commands will fail.",
                    provider.name()
                ));
            }
        }
        Err(e) => {
            report.check("LLM provider", "Error");
            report.issue(format!("Cannot build LLM provider: {}", e));
        }
    }

    report
}
