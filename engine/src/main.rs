use clap::Parser;
use instabuyer_engine::cli::{Cli, Command};
use instabuyer_engine::config::Config;
use instabuyer_engine::handlers::{self, OutputFormat};
use instabuyer_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let mut config = match &cli.config {
        Some(path) => Config::load_or_create_at(path)?,
        None => Config::load_or_create()?,
    };
    if let Some(level) = &cli.log {
        config.core.log_level = level.clone();
    }
    config.validate()?;

    // Single init: the first subscriber installed wins
    init_telemetry_with_level(&config.core.log_level);
    tracing::debug!("Log level: {}", config.core.log_level);

    match cli.command {
        Command::Serve => handlers::handle_serve(&config, cli.credentials()).await?,
        Command::Kpis => handlers::handle_kpis(format)?,
        Command::Doctor => {
            handlers::handle_doctor(&config, cli.credentials().is_ok(), format).await?
        }
    }

    Ok(())
}
