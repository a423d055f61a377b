//! Inbound webhook endpoint.
//!
//! [`WebhookPipeline`] carries a delivery through
//! `verify -> interpret -> list subscribers -> dispatch` and reports what
//! happened as a [`PipelineOutcome`]. [`router`] exposes it over HTTP:
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | `Rejected` | 403 | `Forbidden` |
//! | anything else | 200 | `Webhook received` |
//!
//! Bodies larger than [`MAX_BODY_BYTES`] are refused with 413 before the
//! pipeline runs.

mod pipeline;
mod router;

#[cfg(test)]
mod router_tests;

pub use pipeline::{
    EVENT_HEADER, InboundWebhookRequest, PipelineOutcome, SIGNATURE_HEADER, WebhookPipeline,
};
pub use router::{HEALTH_PATH, MAX_BODY_BYTES, router};
