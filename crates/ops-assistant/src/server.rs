//! Webhook HTTP server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info};
use uuid::Uuid;

use ops_assistant_config::Config;
use ops_assistant_provider::Provider;

use crate::app::AppContext;

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub agent_initialized: bool,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(detail: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

pub fn router<P: Provider + 'static>(state: Arc<AppContext<P>>, webhook_route: &str) -> Router {
    Router::new()
        .route(webhook_route, post(webhook_handler::<P>))
        .route("/health", get(health_handler::<P>))
        .with_state(state)
}

async fn webhook_handler<P: Provider + 'static>(
    State(state): State<Arc<AppContext<P>>>,
    Json(payload): Json<WebhookRequest>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    info!(%request_id, "◆ WEBHOOK QUESTION: {}", payload.question);

    let Some(agent) = state.agent() else {
        error!(%request_id, "◆ AGENT NOT INITIALIZED");
        return Err(internal_error("Agent not initialized"));
    };

    match agent.run(&payload.question).await {
        Ok(outcome) => {
            info!(
                %request_id,
                iterations = outcome.iterations,
                tools = ?outcome.tool_calls,
                "◆ WEBHOOK ANSWERED"
            );
            Ok(Json(WebhookResponse {
                answer: outcome.answer,
            }))
        }
        Err(e) => {
            error!(%request_id, "◆ AGENT RUN FAILED: {}", e);
            Err(internal_error(e.to_string()))
        }
    }
}

async fn health_handler<P: Provider + 'static>(
    State(state): State<Arc<AppContext<P>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        agent_initialized: state.is_initialized(),
    })
}

/// Serve until Ctrl+C, then let in-flight requests finish
pub async fn serve<P: Provider + 'static>(
    state: Arc<AppContext<P>>,
    config: &Config,
) -> anyhow::Result<()> {
    let bind = config.bind_address();
    let route = config.webhook_route();

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {}", bind))?;
    let addr: SocketAddr = listener.local_addr()?;

    info!("◆ LISTENING ON {}", addr);
    info!("◆ WEBHOOK: POST http://{}{}", addr, route);
    info!("◆ HEALTH:  GET http://{}/health", addr);

    axum::serve(listener, router(state, &route).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("◆ FAILED TO LISTEN FOR CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("◆ SHUTDOWN SIGNAL RECEIVED");
}
