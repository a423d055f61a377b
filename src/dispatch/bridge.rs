//! HTTP bridge transport.
//!
//! Many chat platforms are reached through a bot gateway exposing an HTTP
//! "send message" endpoint (OneBot implementations, Matrix appservice
//! bridges, self-hosted Discord/Telegram relays). This transport posts each
//! message to such an endpoint.

use futures::future::BoxFuture;
use handlebars::Handlebars;
use http::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;

use crate::event::{MediaReference, Notification};

use super::{HttpClient, HttpRequest, Transport, TransportError};

/// Message fields sent to the bridge, also exposed to body templates.
///
/// The default body is this struct as JSON:
///
/// ```json
/// {"recipient": "123", "text": "...", "attachments": [{"type": "image", "url": "..."}]}
/// ```
#[derive(Debug, Serialize)]
struct BridgeMessage<'a> {
    recipient: &'a str,
    text: &'a str,
    attachments: &'a [MediaReference],
}

/// [`Transport`] posting messages to a platform's HTTP bridge.
///
/// # Template Support
///
/// The body can be templated using Handlebars syntax. Available variables:
/// `recipient`, `text`, and `attachments` (each with `type` and `url`).
/// Values are inserted verbatim (no HTML escaping); use the `json` helper
/// registered by this transport to embed a value as a JSON string, e.g.
/// `{"group_id": {{recipient}}, "message": {{json text}}}`.
///
/// # Example
///
/// ```
/// use gh_relay::dispatch::{BridgeTransport, ReqwestClient};
/// use url::Url;
///
/// let transport = BridgeTransport::new(
///     ReqwestClient::new(),
///     Url::parse("http://127.0.0.1:5700/send_group_msg").unwrap(),
/// );
/// ```
#[derive(Debug)]
pub struct BridgeTransport<H> {
    client: H,
    url: url::Url,
    method: http::Method,
    headers: http::HeaderMap,
    body_template: Option<String>,
}

impl<H> BridgeTransport<H> {
    /// Creates a transport sending JSON via POST to `url`.
    #[must_use]
    pub fn new(client: H, url: url::Url) -> Self {
        Self {
            client,
            url,
            method: http::Method::POST,
            headers: http::HeaderMap::new(),
            body_template: None,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: http::Method) -> Self {
        self.method = method;
        self
    }

    /// Sets extra headers (authorization, API keys).
    #[must_use]
    pub fn with_headers(mut self, headers: http::HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the body template (Handlebars syntax).
    #[must_use]
    pub fn with_body_template(mut self, template: impl Into<String>) -> Self {
        self.body_template = Some(template.into());
        self
    }

    /// Returns the bridge URL.
    #[must_use]
    pub const fn url(&self) -> &url::Url {
        &self.url
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &http::Method {
        &self.method
    }

    fn render_body(&self, message: &BridgeMessage<'_>) -> Result<Vec<u8>, TransportError> {
        let Some(template) = &self.body_template else {
            return serde_json::to_vec(message).map_err(|e| TransportError::Render(e.to_string()));
        };

        template_engine()
            .render_template(template, message)
            .map(String::into_bytes)
            .map_err(|e| TransportError::Render(e.to_string()))
    }

    fn build_request(
        &self,
        recipient_id: &str,
        notification: &Notification,
    ) -> Result<HttpRequest, TransportError> {
        let message = BridgeMessage {
            recipient: recipient_id,
            text: notification.text(),
            attachments: notification.attachments(),
        };

        let mut request = HttpRequest::new(self.method.clone(), self.url.clone())
            .with_body(self.render_body(&message)?);
        request.headers.clone_from(&self.headers);

        if !request.headers.contains_key(CONTENT_TYPE) {
            request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(request)
    }
}

impl<H: HttpClient> BridgeTransport<H> {
    async fn post(
        &self,
        recipient_id: &str,
        notification: &Notification,
    ) -> Result<(), TransportError> {
        let request = self.build_request(recipient_id, notification)?;
        let response = self.client.request(request).await?;

        if response.is_success() {
            return Ok(());
        }

        Err(TransportError::Rejected {
            status: response.status,
            body: response.body_text().map(ToString::to_string),
        })
    }
}

impl<H: HttpClient> Transport for BridgeTransport<H> {
    fn send<'a>(
        &'a self,
        recipient_id: &'a str,
        notification: &'a Notification,
    ) -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(self.post(recipient_id, notification))
    }
}

/// Handlebars registry used for bridge bodies: no HTML escaping, plus a
/// `json` helper that serializes its argument.
pub(crate) fn template_engine() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_helper("json", Box::new(json_helper));
    handlebars
}

fn json_helper(
    h: &handlebars::Helper<'_>,
    _: &Handlebars<'_>,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext<'_, '_>,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let rendered = h
        .param(0)
        .map_or_else(|| "null".to_string(), |p| p.value().to_string());
    out.write(&rendered)?;
    Ok(())
}
