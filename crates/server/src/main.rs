mod bootstrap;
mod health;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use shelfcheck_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shelfcheck-server", version, about = "Slack bot for retailer product and store stock lookups")]
struct Cli {
    /// Path to a TOML config file. When given, the file must exist.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Overrides `logging.level`.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn load_options(self) -> LoadOptions {
        LoadOptions {
            require_file: self.config.is_some(),
            config_path: self.config,
            overrides: ConfigOverrides { log_level: self.log_level, ..ConfigOverrides::default() },
        }
    }
}

fn init_logging(config: &AppConfig) {
    use shelfcheck_core::config::LogFormat::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<()> {
    // Logging needs the config, so load it before anything else.
    let config = AppConfig::load(cli.load_options())?;
    init_logging(&config);

    let app = bootstrap::bootstrap(config).await?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.registry.clone(),
    )
    .await?;

    tracing::info!(
        event_name = "system.server.slack_transport_mode",
        correlation_id = "bootstrap",
        transport_mode = app.slack_runner.transport_mode(),
        "slack transport configured"
    );
    let slack_runner = app.slack_runner;
    let slack_task = tokio::spawn(async move {
        if let Err(error) = slack_runner.start().await {
            tracing::error!(
                event_name = "slack.socket.stopped",
                correlation_id = "slack",
                error = %error,
                "socket mode runner stopped"
            );
        }
    });

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        fan_out_policy = ?app.config.catalog.fan_out_policy,
        "shelfcheck-server started"
    );
    wait_for_shutdown().await?;
    slack_task.abort();
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "shelfcheck-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
