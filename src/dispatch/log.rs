//! Dry-run transport.

use futures::future::BoxFuture;

use crate::event::Notification;

use super::{Transport, TransportError};

/// [`Transport`] that logs messages instead of sending them.
///
/// Registered in place of real bridges in dry-run mode.
#[derive(Debug, Clone)]
pub struct LogTransport {
    platform: String,
}

impl LogTransport {
    /// Creates a log transport labelled with `platform`.
    #[must_use]
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }
}

impl Transport for LogTransport {
    fn send<'a>(
        &'a self,
        recipient_id: &'a str,
        notification: &'a Notification,
    ) -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(async move {
            tracing::info!(
                "Dry-run: would send to {}:{recipient_id} ({} attachment(s)):\n{}",
                self.platform,
                notification.attachments().len(),
                notification.text(),
            );
            Ok(())
        })
    }
}
