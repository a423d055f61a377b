//! gh-relay: GitHub webhook relay
//!
//! A library for receiving GitHub webhook deliveries, verifying them, and
//! fanning the resulting chat notifications out to subscribed groups
//! across chat platforms.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod registry;
pub mod server;
pub mod signature;
