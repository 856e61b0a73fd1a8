//! Agent HTTP endpoint: hosts the inbound callback contract on the configured
//! port. `POST /api/message` forwards the message to the backend and answers
//! with the reply; `GET /` is a health probe.

use crate::config::Config;
use crate::forwarder::{Forwarder, ForwarderConfig};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Shared state for the agent endpoint (config, forwarder).
#[derive(Clone)]
pub struct AgentState {
    pub config: Arc<Config>,
    pub forwarder: Forwarder,
}

/// Inbound callback body: `{ "message": string, "conversationId": string }`.
/// `conversationId` is optional; it is carried for correlation only.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InboundMessage {
    message: String,
    #[serde(default)]
    conversation_id: String,
}

/// Run the agent endpoint; binds 0.0.0.0:config.port and blocks until
/// SIGINT or SIGTERM.
pub async fn run_agent(config: Config) -> Result<()> {
    let forwarder = Forwarder::new(ForwarderConfig::new(config.backend_url.clone()))
        .context("building forwarder")?;
    run_agent_with(config, forwarder).await
}

/// Same as [`run_agent`] but with a caller-built forwarder (tests use this to
/// shorten the request timeout).
pub async fn run_agent_with(config: Config, forwarder: Forwarder) -> Result<()> {
    let port = config.port;
    let state = AgentState {
        config: Arc::new(config),
        forwarder,
    };

    let app = Router::new()
        .route("/", get(health_http))
        .route("/api/message", post(handle_message))
        .with_state(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("agent endpoint listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("agent endpoint exited")?;
    log::info!("agent endpoint stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// POST /api/message — forward the message as a claim, answer with the reply.
/// The forwarder converts every backend failure into a reply, so this handler
/// answers 200 for anything that parses; malformed JSON is the only 400.
async fn handle_message(State(state): State<AgentState>, body: Bytes) -> impl IntoResponse {
    let inbound: InboundMessage = match serde_json::from_slice(&body) {
        Ok(m) => m,
        Err(e) => {
            log::debug!("rejecting malformed inbound body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid message body" })),
            )
                .into_response();
        }
    };
    log::info!(
        "received message ({} chars, conversation {:?})",
        inbound.message.len(),
        inbound.conversation_id
    );
    let reply = state
        .forwarder
        .handle(&inbound.message, &inbound.conversation_id)
        .await;
    Json(reply).into_response()
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<AgentState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "agentId": state.config.agent_id,
        "port": state.config.port,
    }))
}
