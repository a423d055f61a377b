//! Outbound delivery of notifications to chat platforms.
//!
//! This module provides:
//! - The per-platform connection abstraction ([`Transport`])
//! - The explicit table of live connections ([`ConnectionRegistry`])
//! - Fan-out with per-subscriber fault isolation ([`Dispatcher`], [`DispatchReport`])
//! - An HTTP bridge transport ([`BridgeTransport`]) over an injectable
//!   HTTP client ([`HttpClient`], [`ReqwestClient`])
//! - A logging transport for dry runs ([`LogTransport`])
//!
//! Nothing here retries. A failed delivery is reported and logged, and the
//! remaining subscribers are unaffected.

mod bridge;
mod dispatcher;
mod error;
mod http;
mod log;
mod transport;


pub use bridge::BridgeTransport;
pub(crate) use bridge::template_engine;
pub use dispatcher::{DeliveryOutcome, DispatchReport, Dispatcher};
pub use error::{DeliveryFailure, HttpError, TransportError};
pub use http::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
pub use log::LogTransport;
pub use transport::{ConnectionRegistry, Transport};

#[cfg(test)]
pub use transport::mock;
