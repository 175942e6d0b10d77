use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::{
    blocks::MessageTemplate,
    commands::{CommandRouteError, CommandRouter, ShelfCommandService, SlashCommandPayload},
    responder::InteractionResponder,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub event: SlackEvent,
}

impl SlackEnvelope {
    /// Reads a Socket Mode frame. Frames without an envelope id (hello,
    /// disconnect) carry nothing to acknowledge and yield `None`.
    pub fn from_socket_frame(frame: &Value) -> Option<Self> {
        let envelope_id = frame.get("envelope_id")?.as_str()?.to_owned();
        let frame_type = frame.get("type").and_then(Value::as_str).unwrap_or("unknown");

        let event = match frame_type {
            "slash_commands" => {
                let payload = frame.get("payload")?;
                let field = |name: &str| {
                    payload.get(name).and_then(Value::as_str).unwrap_or_default().to_owned()
                };
                SlackEvent::SlashCommand(SlashCommandPayload {
                    command: field("command"),
                    text: field("text"),
                    channel_id: field("channel_id"),
                    user_id: field("user_id"),
                    trigger_ts: field("trigger_id"),
                    request_id: envelope_id.clone(),
                    response_url: field("response_url"),
                })
            }
            other => SlackEvent::Unsupported { event_type: other.to_owned() },
        };

        Some(Self { envelope_id, event })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    SlashCommand(SlashCommandPayload),
    Unsupported { event_type: String },
}

impl SlackEvent {
    pub fn event_type(&self) -> SlackEventType {
        match self {
            Self::SlashCommand(_) => SlackEventType::SlashCommand,
            Self::Unsupported { .. } => SlackEventType::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    SlashCommand,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Responded(MessageTemplate),
    Ignored,
}

#[derive(Debug, Error)]
pub enum EventHandlerError {
    #[error(transparent)]
    Route(#[from] CommandRouteError),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> SlackEventType;
    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<SlackEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Dispatcher wired for the shelfcheck slash commands.
pub fn command_dispatcher<S>(
    service: S,
    responder: Arc<dyn InteractionResponder>,
) -> EventDispatcher
where
    S: ShelfCommandService + 'static,
{
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(SlashCommandHandler::new(service, responder));
    dispatcher
}

pub struct SlashCommandHandler<S> {
    router: CommandRouter<S>,
}

impl<S> SlashCommandHandler<S>
where
    S: ShelfCommandService,
{
    pub fn new(service: S, responder: Arc<dyn InteractionResponder>) -> Self {
        Self { router: CommandRouter::new(service, responder) }
    }
}

#[async_trait]
impl<S> EventHandler for SlashCommandHandler<S>
where
    S: ShelfCommandService + 'static,
{
    fn event_type(&self) -> SlackEventType {
        SlackEventType::SlashCommand
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        _ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::SlashCommand(payload) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let message = self.router.route(payload).await?;
        Ok(HandlerResult::Responded(message))
    }
}
