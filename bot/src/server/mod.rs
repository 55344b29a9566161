//! Webhook transport boundary: verify, parse, dispatch, reply.
//!
//! Nothing past signature verification runs for an unverified request.

pub mod interaction;
pub mod verify;

use std::any::Any;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use spotcraft_common::BotCommand;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::application::ports::{CapabilityProvider, LivenessProbe};
use crate::application::services::router::{CommandRequest, UNKNOWN_COMMAND_REPLY, dispatch};
use crate::domain::BotConfig;
use crate::output::chat::{MESSAGE_LIMIT, truncate_reply};
use interaction::{APPLICATION_COMMAND, Interaction, InteractionResponse, PING};
use verify::{RequestVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER, VerifyError};

pub const INVALID_SIGNATURE_BODY: &str = "invalid request signature";
pub const UNHANDLED_BODY: &str = "unhandled interaction";
pub const MALFORMED_BODY: &str = "malformed interaction";
pub const INTERNAL_ERROR_BODY: &str = "An internal error occurred.";

/// Everything a request handler needs, built once at boot.
pub struct AppState<P, L> {
    pub provider: P,
    pub probe: L,
    pub config: BotConfig,
    pub verifier: RequestVerifier,
}

/// Compose the axum router:
///   - `/interactions` → signed chat interactions
///   - `/health`       → load-balancer probe
pub fn router<P, L>(state: Arc<AppState<P, L>>) -> Router
where
    P: CapabilityProvider + Send + Sync + 'static,
    L: LivenessProbe + Send + Sync + 'static,
{
    Router::new()
        .route("/interactions", post(interactions::<P, L>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// Bind `config.listen_addr` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve<P, L>(state: AppState<P, L>) -> Result<()>
where
    P: CapabilityProvider + Send + Sync + 'static,
    L: LivenessProbe + Send + Sync + 'static,
{
    let listener = tokio::net::TcpListener::bind(&state.config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", state.config.listen_addr))?;
    info!(listen_addr = %state.config.listen_addr, "webhook server ready");

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("webhook server shut down");
    Ok(())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn interactions<P, L>(
    State(state): State<Arc<AppState<P, L>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    P: CapabilityProvider + Send + Sync + 'static,
    L: LivenessProbe + Send + Sync + 'static,
{
    if let Err(e) = verify_request(&state.verifier, &headers, &body) {
        debug!(error = %e, "request rejected");
        return (StatusCode::UNAUTHORIZED, INVALID_SIGNATURE_BODY).into_response();
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "verified payload is not an interaction");
            return (StatusCode::BAD_REQUEST, MALFORMED_BODY).into_response();
        }
    };

    match interaction.kind {
        PING => Json(InteractionResponse::pong()).into_response(),
        APPLICATION_COMMAND => {
            let Some(data) = interaction.data.as_ref() else {
                return (StatusCode::BAD_REQUEST, MALFORMED_BODY).into_response();
            };
            let content = match data.name.parse::<BotCommand>() {
                Ok(command) => {
                    let request = CommandRequest {
                        command,
                        user_id: interaction.user_id().map(str::to_string),
                        argument: interaction.first_option(),
                    };
                    dispatch(&state.provider, &state.probe, &state.config, &request).await
                }
                Err(e) => {
                    info!(error = %e, "unknown command name");
                    UNKNOWN_COMMAND_REPLY.to_string()
                }
            };
            let content = truncate_reply(&content, MESSAGE_LIMIT).into_owned();
            Json(InteractionResponse::message(content)).into_response()
        }
        other => {
            debug!(kind = other, "unhandled interaction type");
            (StatusCode::NOT_FOUND, UNHANDLED_BODY).into_response()
        }
    }
}

fn verify_request(
    verifier: &RequestVerifier,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), VerifyError> {
    let header = |name: &'static str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or(VerifyError::MissingHeader(name))
    };
    let signature = header(SIGNATURE_HEADER)?;
    let timestamp = header(TIMESTAMP_HEADER)?;
    verifier.verify(timestamp, body, signature)
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
}

/// Wait for SIGINT (Ctrl-C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl-C handler; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal");
}
