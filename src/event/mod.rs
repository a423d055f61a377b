//! Event interpretation: turns GitHub webhook payloads into chat notifications.
//!
//! This module provides:
//! - The outbound message model ([`Notification`], [`MediaReference`])
//! - Typed payload decoding per event kind ([`GithubEvent`])
//! - The interpreter that ties decoding and rendering together ([`EventInterpreter`])
//! - Preview image construction and the clock it is seeded from ([`preview`])
//!
//! # Supported events
//!
//! | `X-GitHub-Event` | `action`     | Notification                      |
//! |------------------|--------------|-----------------------------------|
//! | `star`           | `created`    | starred line + repository preview |
//! | `star`           | `deleted`    | unstarred line + repository preview |
//! | `push`           | any          | header, one line per commit, compare URL |
//! | `workflow_run`   | `completed`  | multi-line run summary            |
//!
//! Everything else is ignored. A supported event whose payload lacks a field
//! its template needs is ignored too; interpretation never fails loudly.

mod notification;
mod payload;
pub mod preview;
mod render;


pub use notification::{MediaReference, Notification};
pub use payload::{
    Commit, DecodeError, GithubEvent, PushPayload, Pusher, Repository, RepositoryName, Sender,
    StarAction, StarPayload, WorkflowRun, WorkflowRunPayload,
};
pub use preview::{Clock, SystemClock};

use std::sync::Arc;

/// Builds notifications from webhook events.
///
/// Holds the clock used to seed the star-event preview token so that tests
/// can pin it.
#[derive(Clone)]
pub struct EventInterpreter {
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for EventInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventInterpreter").finish_non_exhaustive()
    }
}

impl Default for EventInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventInterpreter {
    /// Creates an interpreter backed by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an interpreter with a custom clock.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Interprets one event.
    ///
    /// `action` is the payload's top-level `action` field, if any.
    /// Returns `None` for unsupported `(event_type, action)` pairs and for
    /// payloads missing a field the matching template requires.
    #[must_use]
    pub fn interpret(
        &self,
        event_type: &str,
        action: Option<&str>,
        payload: &serde_json::Value,
    ) -> Option<Notification> {
        match GithubEvent::decode(event_type, action, payload) {
            Ok(event) => Some(render::render(&event, self.clock.as_ref())),
            Err(e @ DecodeError::Unsupported { .. }) => {
                tracing::debug!("Ignoring event: {e}");
                None
            }
            Err(e @ DecodeError::Malformed { .. }) => {
                tracing::warn!("Ignoring event: {e}");
                None
            }
        }
    }

    /// Interprets one event, reading `action` from the payload itself.
    #[must_use]
    pub fn interpret_payload(
        &self,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Option<Notification> {
        let action = payload.get("action").and_then(serde_json::Value::as_str);
        self.interpret(event_type, action, payload)
    }
}
