//! Request handling independent of the HTTP framework.

use axum::body::Bytes;
use http::HeaderMap;

use crate::dispatch::{DispatchReport, Dispatcher};
use crate::event::EventInterpreter;
use crate::registry::{SubscriberRegistry, SubscriptionStore};
use crate::signature;

/// Header naming the GitHub event kind.
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying the HMAC-SHA256 signature of the body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// One webhook delivery as received.
#[derive(Debug, Clone)]
pub struct InboundWebhookRequest {
    /// Value of `X-GitHub-Event`, if sent
    pub event_type: Option<String>,
    /// Value of `X-Hub-Signature-256`, if sent
    pub signature: Option<String>,
    /// The body exactly as received
    pub body: Bytes,
}

impl InboundWebhookRequest {
    /// Creates a request from its parts.
    #[must_use]
    pub fn new(event_type: Option<&str>, signature: Option<&str>, body: impl Into<Bytes>) -> Self {
        Self {
            event_type: event_type.map(ToString::to_string),
            signature: signature.map(ToString::to_string),
            body: body.into(),
        }
    }

    /// Extracts the GitHub headers. Headers that are not valid UTF-8 count
    /// as absent.
    #[must_use]
    pub fn from_parts(headers: &HeaderMap, body: Bytes) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            event_type: header(EVENT_HEADER),
            signature: header(SIGNATURE_HEADER),
            body,
        }
    }
}

/// What the pipeline did with one request.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Signature verification failed; nothing else ran.
    Rejected,
    /// Authenticated, but the event produced no notification.
    Ignored,
    /// A notification was fanned out.
    Dispatched(DispatchReport),
    /// The subscriber list could not be read; nothing was sent.
    StoreUnavailable,
}

impl PipelineOutcome {
    /// Returns true unless the request failed authentication.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Verify, interpret, look up subscribers, dispatch.
pub struct WebhookPipeline<S> {
    secret: String,
    registry: SubscriberRegistry<S>,
    interpreter: EventInterpreter,
    dispatcher: Dispatcher,
}

impl<S> std::fmt::Debug for WebhookPipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookPipeline")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl<S: SubscriptionStore> WebhookPipeline<S> {
    /// Creates a pipeline using the system clock for preview tokens.
    #[must_use]
    pub fn new(
        secret: impl Into<String>,
        registry: SubscriberRegistry<S>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            secret: secret.into(),
            registry,
            interpreter: EventInterpreter::new(),
            dispatcher,
        }
    }

    /// Replaces the event interpreter.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: EventInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Returns the subscriber registry.
    #[must_use]
    pub const fn registry(&self) -> &SubscriberRegistry<S> {
        &self.registry
    }

    /// Returns the dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handles one delivery.
    ///
    /// Never fails: every problem after authentication is logged and folded
    /// into the outcome.
    pub async fn handle(&self, request: &InboundWebhookRequest) -> PipelineOutcome {
        if !signature::verify(&self.secret, &request.body, request.signature.as_deref()) {
            tracing::warn!(
                event = request.event_type.as_deref().unwrap_or("unknown"),
                "Rejected webhook with invalid signature"
            );
            return PipelineOutcome::Rejected;
        }

        let Some(event_type) = request.event_type.as_deref() else {
            tracing::debug!("Ignoring webhook without {EVENT_HEADER} header");
            return PipelineOutcome::Ignored;
        };

        let payload: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Ignoring {event_type} webhook with non-JSON body: {e}");
                return PipelineOutcome::Ignored;
            }
        };

        let Some(notification) = self.interpreter.interpret_payload(event_type, &payload) else {
            return PipelineOutcome::Ignored;
        };

        let subscriptions = match self.registry.list_all().await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                tracing::error!("Failed to load subscribers for {event_type} event: {e}");
                return PipelineOutcome::StoreUnavailable;
            }
        };

        let report = self.dispatcher.dispatch(&subscriptions, &notification).await;
        if report.failed() == 0 {
            tracing::info!(
                "Relayed {event_type} event to {} subscriber(s)",
                report.delivered()
            );
        } else {
            tracing::warn!(
                "Relayed {event_type} event to {}/{} subscriber(s), {} failed",
                report.delivered(),
                report.len(),
                report.failed()
            );
        }

        PipelineOutcome::Dispatched(report)
    }
}
