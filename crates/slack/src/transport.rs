use std::time::Duration;

use async_trait::async_trait;
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpStream, sync::Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::events::SlackEnvelope;
use crate::socket::{SocketTransport, TransportError};

pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
const SLACK_API_TIMEOUT: Duration = Duration::from_secs(10);

type SlackSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The subset of a Slack Web API reply the transport reads.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotIdentity {
    pub user: String,
    pub user_id: String,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SocketFrame {
    Envelope(SlackEnvelope),
    Hello,
    /// Slack wants the connection refreshed; the reason comes from the frame.
    Disconnect(String),
    Other,
}

pub(crate) fn read_frame(text: &str) -> Result<SocketFrame, serde_json::Error> {
    let frame: Value = serde_json::from_str(text)?;
    if let Some(envelope) = SlackEnvelope::from_socket_frame(&frame) {
        return Ok(SocketFrame::Envelope(envelope));
    }

    Ok(match frame.get("type").and_then(Value::as_str) {
        Some("hello") => SocketFrame::Hello,
        Some("disconnect") => SocketFrame::Disconnect(
            frame.get("reason").and_then(Value::as_str).unwrap_or("unspecified").to_owned(),
        ),
        _ => SocketFrame::Other,
    })
}

/// Slack Socket Mode over a websocket.
///
/// `connect` checks the bot token with `auth.test`, then trades the app token
/// for a single-use websocket URL via `apps.connections.open`.
pub struct SlackSocketTransport {
    http: reqwest::Client,
    api_url: String,
    app_token: SecretString,
    bot_token: SecretString,
    writer: Mutex<Option<SplitSink<SlackSocket, Message>>>,
    reader: Mutex<Option<SplitStream<SlackSocket>>>,
}

impl SlackSocketTransport {
    pub fn new(app_token: SecretString, bot_token: SecretString) -> Result<Self, TransportError> {
        Self::with_api_url(DEFAULT_SLACK_API_URL, app_token, bot_token)
    }

    pub fn with_api_url(
        api_url: impl Into<String>,
        app_token: SecretString,
        bot_token: SecretString,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(SLACK_API_TIMEOUT)
            .build()
            .map_err(|error| TransportError::Connect(format!("slack api client: {error}")))?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            app_token,
            bot_token,
            writer: Mutex::new(None),
            reader: Mutex::new(None),
        })
    }

    async fn call(&self, method: &str, token: &SecretString) -> Result<ApiReply, TransportError> {
        let reply = self
            .http
            .post(format!("{}/{method}", self.api_url))
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| TransportError::Connect(format!("{method}: {error}")))?
            .json::<ApiReply>()
            .await
            .map_err(|error| TransportError::Connect(format!("{method}: {error}")))?;

        if !reply.ok {
            return Err(TransportError::Connect(format!(
                "{method} refused: {}",
                reply.error.as_deref().unwrap_or("unknown_error")
            )));
        }
        Ok(reply)
    }

    pub async fn bot_identity(&self) -> Result<BotIdentity, TransportError> {
        let reply = self.call("auth.test", &self.bot_token).await?;
        Ok(BotIdentity {
            user: reply.user.unwrap_or_default(),
            user_id: reply.user_id.unwrap_or_default(),
        })
    }

    /// Each URL is good for one connection only.
    pub async fn open_connection_url(&self) -> Result<String, TransportError> {
        self.call("apps.connections.open", &self.app_token).await?.url.ok_or_else(|| {
            TransportError::Connect("apps.connections.open returned no url".to_owned())
        })
    }
}

#[async_trait]
impl SocketTransport for SlackSocketTransport {
    fn mode(&self) -> &'static str {
        "socket"
    }

    async fn connect(&self) -> Result<(), TransportError> {
        let identity = self.bot_identity().await?;
        let url = self.open_connection_url().await?;
        let (socket, _) = connect_async(url.as_str())
            .await
            .map_err(|error| TransportError::Connect(format!("websocket handshake: {error}")))?;

        let (writer, reader) = socket.split();
        *self.writer.lock().await = Some(writer);
        *self.reader.lock().await = Some(reader);

        info!(
            event_name = "slack.socket.connected",
            bot_user = %identity.user,
            bot_user_id = %identity.user_id,
            "socket mode connection open"
        );
        Ok(())
    }

    async fn next_envelope(&self) -> Result<Option<SlackEnvelope>, TransportError> {
        let mut reader = self.reader.lock().await;
        let stream = reader
            .as_mut()
            .ok_or_else(|| TransportError::Receive("socket is not connected".to_owned()))?;

        loop {
            let message = stream
                .next()
                .await
                .ok_or_else(|| TransportError::Receive("socket stream ended".to_owned()))?
                .map_err(|error| TransportError::Receive(error.to_string()))?;

            let text = match message {
                Message::Text(text) => text,
                Message::Close(frame) => {
                    return Err(TransportError::Receive(format!("socket closed: {frame:?}")));
                }
                _ => continue,
            };

            match read_frame(&text) {
                Ok(SocketFrame::Envelope(envelope)) => return Ok(Some(envelope)),
                Ok(SocketFrame::Hello) => {
                    debug!(event_name = "slack.socket.hello", "socket mode hello received");
                }
                Ok(SocketFrame::Disconnect(reason)) => {
                    info!(
                        event_name = "slack.socket.refresh",
                        reason = %reason,
                        "slack asked for a reconnect"
                    );
                    return Err(TransportError::Receive(format!(
                        "slack requested disconnect: {reason}"
                    )));
                }
                Ok(SocketFrame::Other) => {}
                Err(error) => {
                    warn!(
                        event_name = "slack.socket.bad_frame",
                        error = %error,
                        "unreadable socket frame skipped"
                    );
                }
            }
        }
    }

    async fn acknowledge(&self, envelope_id: &str) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        let sink = writer
            .as_mut()
            .ok_or_else(|| TransportError::Acknowledge("socket is not connected".to_owned()))?;

        sink.send(Message::Text(json!({ "envelope_id": envelope_id }).to_string()))
            .await
            .map_err(|error| TransportError::Acknowledge(error.to_string()))
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.reader.lock().await.take();
        let Some(mut sink) = self.writer.lock().await.take() else {
            return Ok(());
        };
        sink.close().await.map_err(|error| TransportError::Disconnect(error.to_string()))
    }
}
