use std::sync::Arc;

use async_trait::async_trait;
use shelfcheck_catalog::{CatalogApi, ProductResponse, StockAggregator};
use shelfcheck_core::{
    upstream_error_message, ApplicationError, DomainError, ProductCode, ProductSummary,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    blocks::{self, MessageBuilder, MessageTemplate},
    registry::{command_manifest, CommandRegistrar},
    responder::{InteractionResponder, ResponderError},
};

pub const SYNCED_TEXT: &str = "Synced!";
pub const NOT_ALLOWED_TEXT: &str = "You are not allowed to use this command!";
pub const INVALID_CODE_TEXT: &str = "Invalid code!";
pub const INVALID_STOCK_CODE_TEXT: &str = "Invalid code! - Must be 6 digits long";
pub const NO_STORES_TEXT: &str = "No stores found!";
pub const NO_STOCK_TEXT: &str = "No stores with stock found!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_ts: String,
    pub request_id: String,
    pub response_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Sync,
    Info,
    StoreStockCheck,
}

impl CommandKind {
    pub fn from_slash(command: &str) -> Option<Self> {
        match command.trim().trim_start_matches('/').to_ascii_lowercase().as_str() {
            "sync" => Some(Self::Sync),
            "info" => Some(Self::Info),
            "storestockcheck" => Some(Self::StoreStockCheck),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShelfCommand {
    Sync,
    Info { code: ProductCode },
    StoreStockCheck { code: ProductCode, location: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("unsupported slash command: {0}")]
    UnsupportedCommand(String),
    #[error("`{argument}` is required")]
    MissingArgument { kind: CommandKind, argument: &'static str },
    #[error("invalid code for {kind:?}: {source}")]
    InvalidCode { kind: CommandKind, source: DomainError },
}

#[derive(Debug, Error)]
pub enum CommandRouteError {
    #[error(transparent)]
    Parse(#[from] CommandParseError),
    #[error(transparent)]
    Responder(#[from] ResponderError),
}

pub fn parse_shelf_command(
    payload: &SlashCommandPayload,
) -> Result<ShelfCommand, CommandParseError> {
    let kind = CommandKind::from_slash(&payload.command)
        .ok_or_else(|| CommandParseError::UnsupportedCommand(payload.command.clone()))?;

    if kind == CommandKind::Sync {
        return Ok(ShelfCommand::Sync);
    }

    let mut parts = payload.text.split_whitespace();
    let raw_code =
        parts.next().ok_or(CommandParseError::MissingArgument { kind, argument: "code" })?;
    let code = raw_code
        .parse::<ProductCode>()
        .map_err(|source| CommandParseError::InvalidCode { kind, source })?;

    match kind {
        CommandKind::Info => Ok(ShelfCommand::Info { code }),
        CommandKind::StoreStockCheck => {
            let location = parts.collect::<Vec<_>>().join(" ");
            if location.is_empty() {
                return Err(CommandParseError::MissingArgument { kind, argument: "location" });
            }
            Ok(ShelfCommand::StoreStockCheck { code, location })
        }
        CommandKind::Sync => Ok(ShelfCommand::Sync),
    }
}

/// Operations behind the slash commands. Each returns the final message to
/// show; replying is the router's job.
#[async_trait]
pub trait ShelfCommandService: Send + Sync {
    async fn sync(&self, user_id: &str) -> Result<MessageTemplate, ApplicationError>;

    async fn info(&self, code: ProductCode) -> Result<MessageTemplate, ApplicationError>;

    async fn store_stock_check(
        &self,
        code: ProductCode,
        location: &str,
    ) -> Result<MessageTemplate, ApplicationError>;
}

pub struct CommandRouter<S> {
    service: S,
    responder: Arc<dyn InteractionResponder>,
}

impl<S> CommandRouter<S>
where
    S: ShelfCommandService,
{
    pub fn new(service: S, responder: Arc<dyn InteractionResponder>) -> Self {
        Self { service, responder }
    }

    /// Validates, runs and answers one invocation. Returns the last message
    /// sent back to the user.
    pub async fn route(
        &self,
        payload: &SlashCommandPayload,
    ) -> Result<MessageTemplate, CommandRouteError> {
        info!(
            event_name = "slack.command.received",
            correlation_id = %payload.request_id,
            command = %payload.command,
            user_id = %payload.user_id,
            channel_id = %payload.channel_id,
            "slash command received"
        );

        let command = match parse_shelf_command(payload) {
            Ok(command) => command,
            Err(CommandParseError::UnsupportedCommand(command)) => {
                return Err(CommandParseError::UnsupportedCommand(command).into());
            }
            Err(error) => {
                info!(
                    event_name = "slack.command.rejected",
                    correlation_id = %payload.request_id,
                    command = %payload.command,
                    error = %error,
                    "slash command rejected before any lookup"
                );
                let message = rejection_message(&error);
                self.responder.respond(payload, &message).await?;
                return Ok(message);
            }
        };

        match command {
            ShelfCommand::Sync => {
                let message = self
                    .service
                    .sync(&payload.user_id)
                    .await
                    .unwrap_or_else(|error| failure_message(payload, &error));
                self.responder.respond(payload, &message).await?;
                Ok(message)
            }
            ShelfCommand::Info { code } => {
                let message = self
                    .service
                    .info(code)
                    .await
                    .unwrap_or_else(|error| failure_message(payload, &error));
                self.responder.respond(payload, &message).await?;
                Ok(message)
            }
            ShelfCommand::StoreStockCheck { code, location } => {
                self.responder.defer(payload, &blocks::deferred_placeholder(&location)).await?;
                let message = self
                    .service
                    .store_stock_check(code, &location)
                    .await
                    .unwrap_or_else(|error| failure_message(payload, &error));
                self.responder.follow_up(payload, &message).await?;
                Ok(message)
            }
        }
    }
}

fn rejection_message(error: &CommandParseError) -> MessageTemplate {
    match error {
        CommandParseError::InvalidCode { kind: CommandKind::StoreStockCheck, .. } => {
            blocks::notice_message(INVALID_STOCK_CODE_TEXT)
        }
        CommandParseError::InvalidCode { .. } => blocks::notice_message(INVALID_CODE_TEXT),
        CommandParseError::MissingArgument { .. } | CommandParseError::UnsupportedCommand(_) => {
            blocks::help_message(&command_manifest())
        }
    }
}

fn failure_message(payload: &SlashCommandPayload, error: &ApplicationError) -> MessageTemplate {
    warn!(
        event_name = "slack.command.failed",
        correlation_id = %payload.request_id,
        command = %payload.command,
        error = %error,
        "slash command failed"
    );
    match error {
        ApplicationError::Upstream { .. } => blocks::upstream_error_card(&error.user_message()),
        _ => blocks::error_message(&error.user_message(), &payload.request_id),
    }
}

/// Answers commands from the retailer catalog.
pub struct CatalogCommandService {
    api: Arc<dyn CatalogApi>,
    aggregator: StockAggregator,
    registrar: Arc<dyn CommandRegistrar>,
    owner_user_id: Option<String>,
}

impl CatalogCommandService {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        aggregator: StockAggregator,
        registrar: Arc<dyn CommandRegistrar>,
        owner_user_id: Option<String>,
    ) -> Self {
        Self { api, aggregator, registrar, owner_user_id }
    }

    fn is_owner(&self, user_id: &str) -> bool {
        self.owner_user_id.as_deref().is_some_and(|owner| owner == user_id)
    }

    /// Product summary, or the card to show when the catalog refused the request.
    async fn product_summary(
        &self,
        code: ProductCode,
    ) -> Result<Result<ProductSummary, MessageTemplate>, ApplicationError> {
        let response = self.api.fetch_product(code).await?;
        if !response.is_success() {
            return Ok(Err(rejected_product_card(code, &response)));
        }

        let summary = ProductSummary::from_json(code, &response.body, self.api.base_url())?;
        Ok(Ok(summary))
    }
}

fn rejected_product_card(code: ProductCode, response: &ProductResponse) -> MessageTemplate {
    let reason = upstream_error_message(&response.body).unwrap_or_else(|_| {
        ApplicationError::Upstream { status: response.status, message: None }.user_message()
    });
    info!(
        event_name = "catalog.product.rejected",
        product_code = %code,
        status = response.status,
        reason = %reason,
        "catalog refused product lookup"
    );
    blocks::upstream_error_card(&reason)
}

#[async_trait]
impl ShelfCommandService for CatalogCommandService {
    async fn sync(&self, user_id: &str) -> Result<MessageTemplate, ApplicationError> {
        if !self.is_owner(user_id) {
            warn!(
                event_name = "slack.sync.denied",
                user_id = %user_id,
                "sync requested by non-owner"
            );
            return Ok(MessageBuilder::new(NOT_ALLOWED_TEXT)
                .section("shelfcheck.sync.denied.v1", |section| {
                    section.plain(NOT_ALLOWED_TEXT);
                })
                .build());
        }

        let registered = self
            .registrar
            .register(&command_manifest())
            .await
            .map_err(|error| ApplicationError::Transport(error.to_string()))?;
        info!(event_name = "slack.sync.completed", command_count = registered, "commands synced");

        Ok(MessageBuilder::new(SYNCED_TEXT)
            .ephemeral()
            .section("shelfcheck.sync.done.v1", |section| {
                section.plain(SYNCED_TEXT);
            })
            .build())
    }

    async fn info(&self, code: ProductCode) -> Result<MessageTemplate, ApplicationError> {
        match self.product_summary(code).await? {
            Ok(summary) => Ok(blocks::product_info_card(&summary)),
            Err(card) => Ok(card),
        }
    }

    async fn store_stock_check(
        &self,
        code: ProductCode,
        location: &str,
    ) -> Result<MessageTemplate, ApplicationError> {
        let summary = match self.product_summary(code).await? {
            Ok(summary) => summary,
            Err(card) => return Ok(card),
        };

        let stores = self.api.fetch_stores_near(location).await?;
        if stores.is_empty() {
            info!(
                event_name = "catalog.stores.none_found",
                product_code = %code,
                location = %location,
                "no stores near location"
            );
            return Ok(blocks::notice_message(NO_STORES_TEXT));
        }

        let aggregate = self.aggregator.aggregate(code, &stores).await?;
        if aggregate.is_empty() {
            if aggregate.failed().len() == stores.len() {
                return Err(ApplicationError::Transport(format!(
                    "all {} store stock lookups failed",
                    stores.len()
                )));
            }
            return Ok(blocks::notice_message(NO_STOCK_TEXT));
        }

        Ok(blocks::store_stock_card(&summary, &aggregate))
    }
}
