use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::{blocks::MessageTemplate, commands::SlashCommandPayload};

const RESPONSE_URL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("interaction has no response_url")]
    MissingResponseUrl,
    #[error("failed to build response client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to post interaction reply: {0}")]
    Request(#[source] reqwest::Error),
    #[error("interaction reply rejected with status {status}")]
    Rejected { status: u16 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    Immediate,
    Deferred,
    FollowUp,
}

/// Reply channel for one slash-command interaction.
///
/// `defer` acknowledges a slow command with a placeholder; every reply after
/// a defer goes through `follow_up`.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    async fn respond(
        &self,
        payload: &SlashCommandPayload,
        message: &MessageTemplate,
    ) -> Result<(), ResponderError>;

    async fn defer(
        &self,
        payload: &SlashCommandPayload,
        placeholder: &MessageTemplate,
    ) -> Result<(), ResponderError>;

    async fn follow_up(
        &self,
        payload: &SlashCommandPayload,
        message: &MessageTemplate,
    ) -> Result<(), ResponderError>;
}

/// Posts Block Kit JSON to the interaction's `response_url`.
#[derive(Clone)]
pub struct ResponseUrlResponder {
    client: reqwest::Client,
}

impl ResponseUrlResponder {
    pub fn new() -> Result<Self, ResponderError> {
        let client = reqwest::Client::builder()
            .timeout(RESPONSE_URL_TIMEOUT)
            .build()
            .map_err(ResponderError::Client)?;
        Ok(Self { client })
    }

    async fn post(
        &self,
        payload: &SlashCommandPayload,
        message: &MessageTemplate,
        kind: ReplyKind,
    ) -> Result<(), ResponderError> {
        if payload.response_url.trim().is_empty() {
            return Err(ResponderError::MissingResponseUrl);
        }

        let response = self
            .client
            .post(&payload.response_url)
            .json(&response_body(message, kind))
            .send()
            .await
            .map_err(ResponderError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResponderError::Rejected { status: status.as_u16() });
        }

        debug!(
            event_name = "slack.reply.sent",
            correlation_id = %payload.request_id,
            command = %payload.command,
            reply_kind = ?kind,
            "interaction reply posted"
        );
        Ok(())
    }
}

#[async_trait]
impl InteractionResponder for ResponseUrlResponder {
    async fn respond(
        &self,
        payload: &SlashCommandPayload,
        message: &MessageTemplate,
    ) -> Result<(), ResponderError> {
        self.post(payload, message, ReplyKind::Immediate).await
    }

    async fn defer(
        &self,
        payload: &SlashCommandPayload,
        placeholder: &MessageTemplate,
    ) -> Result<(), ResponderError> {
        self.post(payload, placeholder, ReplyKind::Deferred).await
    }

    async fn follow_up(
        &self,
        payload: &SlashCommandPayload,
        message: &MessageTemplate,
    ) -> Result<(), ResponderError> {
        self.post(payload, message, ReplyKind::FollowUp).await
    }
}

/// Request body for a `response_url` post. Follow-ups replace the deferred
/// placeholder in place and cannot change its visibility.
pub fn response_body(message: &MessageTemplate, kind: ReplyKind) -> Value {
    let response_type = if message.ephemeral { "ephemeral" } else { "in_channel" };

    let mut body = json!({
        "text": message.fallback_text,
        "blocks": message.blocks,
        "response_type": response_type,
    });
    if kind == ReplyKind::FollowUp {
        body["replace_original"] = Value::Bool(true);
    }
    body
}
