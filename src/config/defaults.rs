//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default route GitHub posts deliveries to.
pub const PATH: &str = "/github/webhook";

/// Default listen address.
pub const LISTEN: &str = "127.0.0.1:8080";

/// Default subscription store file, relative to the working directory.
pub const STORE_FILE: &str = "subscriptions.json";

/// Default HTTP method for bridge requests.
pub const METHOD: &str = "POST";

/// Default per-send timeout in seconds.
pub const SEND_TIMEOUT_SECS: u64 = 10;

/// Default config file written by `init`.
pub const CONFIG_FILE: &str = "gh-relay.toml";

/// Default per-send timeout as Duration.
#[must_use]
pub const fn send_timeout() -> Duration {
    Duration::from_secs(SEND_TIMEOUT_SECS)
}
