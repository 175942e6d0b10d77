use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use shelfcheck_slack::registry::LocalCommandRegistry;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    registry: Arc<LocalCommandRegistry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub commands: HealthCheck,
    pub checked_at: String,
}

pub fn router(registry: Arc<LocalCommandRegistry>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { registry })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    registry: Arc<LocalCommandRegistry>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(registry)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let registered = state.registry.registered().await;
    let ready = !registered.is_empty();

    let commands = if ready {
        let names = registered.iter().map(|command| command.name).collect::<Vec<_>>();
        HealthCheck { status: "ready", detail: format!("registered: {}", names.join(", ")) }
    } else {
        HealthCheck { status: "degraded", detail: "no commands registered".to_string() }
    };

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "shelfcheck-server runtime initialized".to_string(),
        },
        commands,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use shelfcheck_slack::registry::{command_manifest, CommandRegistrar, LocalCommandRegistry};

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_returns_ready_when_commands_are_registered() {
        let registry = Arc::new(LocalCommandRegistry::new());
        registry.register(&command_manifest()).await.expect("register");

        let (status, Json(payload)) = health(State(HealthState { registry })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.commands.detail, "registered: sync, info, storestockcheck");
        assert_eq!(payload.service.status, "ready");
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_before_registration() {
        let registry = Arc::new(LocalCommandRegistry::new());

        let (status, Json(payload)) = health(State(HealthState { registry })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.commands.status, "degraded");
    }
}
