//! Outbound message model.

use serde::Serialize;

/// A renderable attachment carried alongside the notification text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaReference {
    /// An image fetched by the chat platform from `url`.
    Image {
        /// Absolute image URL
        url: String,
    },
}

impl MediaReference {
    /// Creates an image reference.
    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }

    /// Returns the referenced URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Image { url } => url,
        }
    }
}

/// A message built from one webhook event.
///
/// Built once and then shared read-only by every delivery of that event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    text: String,
    attachments: Vec<MediaReference>,
}

impl Notification {
    /// Creates a text-only notification.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    /// Adds attachments, keeping their order.
    #[must_use]
    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = MediaReference>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    /// The message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attachments in display order.
    #[must_use]
    pub fn attachments(&self) -> &[MediaReference] {
        &self.attachments
    }
}
