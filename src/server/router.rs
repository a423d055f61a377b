//! Axum adapter over [`WebhookPipeline`].

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use http::{HeaderMap, StatusCode};

use crate::registry::SubscriptionStore;

use super::{InboundWebhookRequest, PipelineOutcome, WebhookPipeline};

/// Path of the liveness probe.
pub const HEALTH_PATH: &str = "/health";

/// Largest accepted delivery body. GitHub caps webhook payloads at 25 MB.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Builds the HTTP router: `POST {path}` for deliveries and `GET /health`.
///
/// # Panics
///
/// Panics if `path` does not start with `/`, equals [`HEALTH_PATH`], or
/// contains route parameters; configuration validation rules these out.
pub fn router<S>(path: &str, pipeline: Arc<WebhookPipeline<S>>) -> Router
where
    S: SubscriptionStore + 'static,
{
    Router::new()
        .route(path, post(receive::<S>))
        .route(HEALTH_PATH, get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(pipeline)
}

async fn receive<S: SubscriptionStore + 'static>(
    State(pipeline): State<Arc<WebhookPipeline<S>>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let request = InboundWebhookRequest::from_parts(&headers, body);
    respond(&pipeline.handle(&request).await)
}

async fn health() -> &'static str {
    "ok"
}

const fn respond(outcome: &PipelineOutcome) -> (StatusCode, &'static str) {
    if outcome.is_authenticated() {
        (StatusCode::OK, "Webhook received")
    } else {
        (StatusCode::FORBIDDEN, "Forbidden")
    }
}
