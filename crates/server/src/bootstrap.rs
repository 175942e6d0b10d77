use std::sync::Arc;

use shelfcheck_catalog::{CatalogApi, CatalogError, HttpCatalogClient, StockAggregator};
use shelfcheck_core::config::AppConfig;
use shelfcheck_slack::{
    commands::CatalogCommandService,
    events::command_dispatcher,
    registry::{command_manifest, CommandRegistrar, LocalCommandRegistry, RegistrarError},
    responder::{ResponderError, ResponseUrlResponder},
    socket::{ReconnectPolicy, SocketModeRunner, TransportError},
    transport::SlackSocketTransport,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub registry: Arc<LocalCommandRegistry>,
    pub slack_runner: SocketModeRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("catalog client setup failed: {0}")]
    Catalog(#[from] CatalogError),
    #[error("slack responder setup failed: {0}")]
    Responder(#[from] ResponderError),
    #[error(transparent)]
    Registrar(#[from] RegistrarError),
    #[error("slack transport setup failed: {0}")]
    Transport(#[from] TransportError),
}

/// Wires the catalog client, command service and socket runner from an
/// already validated config.
pub async fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        catalog_base_url = %config.catalog.base_url,
        "starting application bootstrap"
    );

    let catalog: Arc<dyn CatalogApi> = Arc::new(HttpCatalogClient::new(config.catalog.clone())?);
    let aggregator = StockAggregator::new(Arc::clone(&catalog), config.catalog.fan_out_policy);

    let registry = Arc::new(LocalCommandRegistry::new());
    let registered = registry.register(&command_manifest()).await?;
    info!(
        event_name = "system.bootstrap.commands_registered",
        correlation_id = "bootstrap",
        command_count = registered,
        "slash commands registered"
    );

    if config.slack.owner_user_id.is_none() {
        info!(
            event_name = "system.bootstrap.no_owner",
            correlation_id = "bootstrap",
            "slack.owner_user_id is unset; /sync is disabled"
        );
    }

    let service = CatalogCommandService::new(
        catalog,
        aggregator,
        registry.clone(),
        config.slack.owner_user_id.clone(),
    );
    let responder = Arc::new(ResponseUrlResponder::new()?);
    let transport = SlackSocketTransport::new(
        config.slack.app_token.clone(),
        config.slack.bot_token.clone(),
    )?;
    let slack_runner = SocketModeRunner::new(
        Arc::new(transport),
        command_dispatcher(service, responder),
        ReconnectPolicy::default(),
    );

    Ok(Application { config, registry, slack_runner })
}
