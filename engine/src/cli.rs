//! CLI interface for the lead console
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use sdk::errors::EngineError;
use std::path::PathBuf;

use crate::secrets::SecretString;

/// Insta Buyer lead console
///
/// Reads direct-message conversations, has an AI analyst score the people
/// behind them, and sends pitches to the best leads.
#[derive(Parser, Debug)]
#[command(name = "instabuyer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Account username
    #[arg(long, global = true, env = "INSTAGRAM_USERNAME")]
    pub username: Option<String>,

    /// Account password
    #[arg(long, global = true, env = "INSTAGRAM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Log in and serve console commands as JSON lines on stdin/stdout
    Serve,

    /// List the KPIs the analyst scores
    Kpis,

    /// Check configuration, credentials and the AI provider
    Doctor,
}

impl Cli {
    /// Username and password, both required and non-blank
    pub fn credentials(&self) -> Result<(String, SecretString), EngineError> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.trim().is_empty() && !pass.is_empty() => {
                Ok((user.trim().to_string(), SecretString::new(pass)))
            }
            _ => Err(EngineError::MissingCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_with_flags() {
        let cli = Cli::try_parse_from([
            "instabuyer",
            "--username",
            "shop",
            "--password",
            "pw",
            "--log",
            "debug",
            "serve",
        ])
        .unwrap();

        assert_eq!(cli.command, Command::Serve);
        assert_eq!(cli.log.as_deref(), Some("debug"));
        let (user, pass) = cli.credentials().unwrap();
        assert_eq!(user, "shop");
        assert_eq!(pass.expose(), "pw");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["instabuyer", "kpis", "--json"]).unwrap();
        assert_eq!(cli.command, Command::Kpis);
        assert!(cli.json);
    }

    #[test]
    fn test_blank_username_is_missing() {
        let cli = Cli::try_parse_from([
            "instabuyer",
            "--username",
            " ",
            "--password",
            "pw",
            "doctor",
        ])
        .unwrap();
        assert!(matches!(
            cli.credentials(),
            Err(EngineError::MissingCredentials)
        ));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["instabuyer"]).is_err());
    }
}
