//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Inbound server section
    #[serde(default)]
    pub server: ServerSection,

    /// Subscription store section
    #[serde(default)]
    pub store: StoreSection,

    /// Outbound delivery section
    #[serde(default)]
    pub dispatch: DispatchSection,

    /// Platform bridges keyed by platform name
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformSection>,
}

/// Inbound server section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Webhook secret shared with GitHub
    pub secret: Option<String>,

    /// Route GitHub posts deliveries to
    pub path: Option<String>,

    /// Listen address
    pub listen: Option<String>,
}

/// Subscription store section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Store file path; `~` expands to the home directory
    pub file: Option<String>,
}

/// Outbound delivery section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchSection {
    /// Per-send timeout in seconds
    pub send_timeout: Option<u64>,
}

/// One platform bridge.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformSection {
    /// Bridge "send message" URL
    pub url: Option<String>,

    /// HTTP method (default: POST)
    pub method: Option<String>,

    /// HTTP headers as key-value pairs
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Bearer token for Authorization header
    pub bearer: Option<String>,

    /// Handlebars body template
    pub body_template: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# gh-relay Configuration File

[server]
# Webhook secret configured on the GitHub webhook (required)
# Can also be given with --secret or the GH_RELAY_SECRET environment variable
# secret = "change-me"

# Route GitHub posts deliveries to (default: /github/webhook)
# path = "/github/webhook"

# Listen address (default: 127.0.0.1:8080)
# listen = "0.0.0.0:8080"

[store]
# Subscription store file (default: subscriptions.json)
# file = "~/.local/share/gh-relay/subscriptions.json"

[dispatch]
# Per-send timeout in seconds (default: 10)
# send_timeout = 10

# One section per chat platform. Subscriptions name the platform they
# belong to; messages for a platform without a section are dropped.
#
# Template variables: {{recipient}}, {{text}}, {{attachments}}
# (each attachment has {{type}} and {{url}}). Use {{json text}} to embed
# a value as a JSON string. Without a template the body is
# {"recipient": ..., "text": ..., "attachments": [...]}.

# [platforms.onebot]
# url = "http://127.0.0.1:5700/send_group_msg"
# body_template = '{"group_id": {{recipient}}, "message": {{json text}}}'

# [platforms.discord]
# url = "https://relay.example.com/discord/send"
# method = "POST"
# bearer = "your-token-here"
# [platforms.discord.headers]
# X-Custom-Header = "value"
"#
    .to_string()
}
