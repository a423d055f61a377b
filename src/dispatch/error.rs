//! Error types for outbound delivery.

use std::time::Duration;

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes what went wrong at the HTTP layer without dictating recovery.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed (DNS, refused, reset, TLS).
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server did not respond within the client's timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built, usually a bad URL.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Error returned by a [`Transport`](super::Transport) when a send fails.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The platform does not know the recipient.
    #[error("Unknown recipient '{0}'")]
    UnknownRecipient(String),

    /// The platform bridge answered with a non-success status.
    #[error("Bridge rejected message with status {status}{}", .body.as_ref().map(|b| format!(": {b}")).unwrap_or_default())]
    Rejected {
        /// HTTP status code
        status: http::StatusCode,
        /// Response body, when it was valid UTF-8
        body: Option<String>,
    },

    /// The request to the platform bridge failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The message body could not be produced.
    #[error("Failed to render message body: {0}")]
    Render(String),
}

/// Why one delivery of a notification did not happen.
#[derive(Debug, Error)]
pub enum DeliveryFailure {
    /// No live connection is registered for the subscriber's platform.
    #[error("No live connection for platform '{platform}'")]
    Unreachable {
        /// The subscriber's platform
        platform: String,
    },

    /// The transport reported an error.
    #[error("Send failed: {0}")]
    Transport(#[from] TransportError),

    /// The send did not complete within the per-send timeout.
    #[error("Send timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    /// The transport panicked while sending.
    #[error("Transport panicked while sending")]
    Panicked,
}
