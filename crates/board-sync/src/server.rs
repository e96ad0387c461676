//! HTTP server for GitHub webhook deliveries.

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::handlers::SyncOrchestrator;
use crate::webhooks::WebhookEvent;

/// Number of body bytes included in debug logs.
const BODY_PREVIEW_BYTES: usize = 100;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Applies board automation to each delivery.
    pub orchestrator: SyncOrchestrator,
    /// Largest webhook body accepted.
    pub max_body_bytes: usize,
}

impl AppState {
    /// State with the default body limit.
    #[must_use]
    pub fn new(orchestrator: SyncOrchestrator) -> Self {
        Self {
            orchestrator,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Build the HTTP router for the board sync service.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(webhook_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

fn body_preview(body: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(&body[..body.len().min(BODY_PREVIEW_BYTES)])
}

/// Handle a GitHub webhook delivery.
///
/// Responds once the body has been read and decoded; failures of the
/// resulting board actions are logged and do not change the response.
async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> (StatusCode, &'static str) {
    let event_name = header_str(&headers, "x-github-event");
    let delivery_id = header_str(&headers, "x-github-delivery");

    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => {
            error!(
                event = %event_name,
                delivery = %delivery_id,
                error = %e,
                "Failed to read webhook body"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read request body");
        }
    };

    debug!(
        event = %event_name,
        delivery = %delivery_id,
        bytes = body.len(),
        preview = %body_preview(&body),
        "Received webhook"
    );

    let event = match WebhookEvent::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(
                event = %event_name,
                delivery = %delivery_id,
                error = %e,
                "Rejecting malformed webhook payload"
            );
            return (StatusCode::BAD_REQUEST, "Failed to parse webhook payload");
        }
    };

    info!(
        event = %event_name,
        delivery = %delivery_id,
        action = %event.action,
        repo = %event.repository_name(),
        "Processing webhook"
    );

    let reports = state.orchestrator.handle(&event).await;
    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        warn!(
            delivery = %delivery_id,
            actions = reports.len(),
            failed = failed,
            "Webhook processed with failures"
        );
    }

    (StatusCode::OK, "OK")
}
