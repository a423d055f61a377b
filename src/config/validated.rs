//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use url::Url;

use crate::server::HEALTH_PATH;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::{PlatformSection, TomlConfig};

/// One chat platform reached through an HTTP bridge.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Platform name, lowercased
    pub name: String,

    /// Bridge "send message" URL
    pub url: Url,

    /// HTTP method for bridge requests
    pub method: Method,

    /// HTTP headers for bridge requests
    pub headers: HeaderMap,

    /// Handlebars body template (optional)
    pub body_template: Option<String>,
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Webhook secret (required, never empty)
    pub secret: String,

    /// Route GitHub posts deliveries to
    pub path: String,

    /// Listen address
    pub listen: SocketAddr,

    /// Subscription store file, `~` already expanded
    pub store_file: PathBuf,

    /// Upper bound for a single send
    pub send_timeout: Duration,

    /// Platform bridges, sorted by name
    pub platforms: Vec<PlatformConfig>,

    /// Dry-run mode (log messages instead of sending them)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let platforms: Vec<&str> = self.platforms.iter().map(|p| p.name.as_str()).collect();

        write!(
            f,
            "Config {{ listen: {}, path: {}, store_file: {}, send_timeout: {}s, \
             platforms: [{}], dry_run: {} }}",
            self.listen,
            self.path,
            self.store_file.display(),
            self.send_timeout.as_secs(),
            platforms.join(", "),
            self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The secret is missing or blank
    /// - The path does not start with `/` or collides with the health route
    /// - The listen address is not `ip:port`
    /// - The send timeout is zero
    /// - A platform has a bad name, URL, method, header, or template
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let secret = Self::resolve_secret(cli, toml)?;
        let path = Self::resolve_path(cli, toml)?;
        let listen = Self::resolve_listen(cli, toml)?;
        let store_file = resolve_store_file(cli, toml)?;
        let send_timeout = Self::resolve_send_timeout(cli, toml)?;
        let platforms = Self::resolve_platforms(toml)?;

        Ok(Self {
            secret,
            path,
            listen,
            store_file,
            send_timeout,
            platforms,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = load_toml(cli)?;
        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_secret(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let secret = cli
            .secret
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.secret.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::SECRET,
                    "Use --secret, set GH_RELAY_SECRET, or set server.secret in config file",
                )
            })?;

        if secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        Ok(secret.to_string())
    }

    fn resolve_path(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let path = cli
            .path
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.path.as_deref()))
            .unwrap_or(defaults::PATH);

        let invalid = |reason| ConfigError::InvalidPath {
            path: path.to_string(),
            reason,
        };

        if !path.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if path == HEALTH_PATH {
            return Err(invalid("reserved for the health check"));
        }
        if path.contains(['{', '}', '*']) || path.split('/').any(|s| s.starts_with(':')) {
            return Err(invalid("must not contain route parameters"));
        }

        Ok(path.to_string())
    }

    fn resolve_listen(cli: &Cli, toml: Option<&TomlConfig>) -> Result<SocketAddr, ConfigError> {
        let value = cli
            .listen
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.listen.as_deref()))
            .unwrap_or(defaults::LISTEN);

        value
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidListen {
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    fn resolve_send_timeout(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let seconds = cli
            .send_timeout
            .or_else(|| toml.and_then(|t| t.dispatch.send_timeout))
            .unwrap_or(defaults::SEND_TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "send_timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn resolve_platforms(toml: Option<&TomlConfig>) -> Result<Vec<PlatformConfig>, ConfigError> {
        let Some(toml) = toml else {
            return Ok(Vec::new());
        };

        let mut platforms = toml
            .platforms
            .iter()
            .map(|(name, section)| build_platform(name, section))
            .collect::<Result<Vec<_>, _>>()?;

        platforms.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(pair) = platforms.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(ConfigError::InvalidPlatform {
                name: pair[1].name.clone(),
                reason: "declared twice with different letter case",
            });
        }

        Ok(platforms)
    }
}

/// Resolves only the subscription store file.
///
/// Used by the subscription management subcommands, which need no secret.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed, or if the
/// path starts with `~` and the home directory is unknown.
pub fn load_store_file(cli: &Cli) -> Result<PathBuf, ConfigError> {
    let toml = load_toml(cli)?;
    resolve_store_file(cli, toml.as_ref())
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Expands a leading `~` to the home directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if expansion is needed but the home
/// directory cannot be determined.
pub fn expand_tilde(path: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    dirs::home_dir()
        .map(|home| home.join(rest))
        .ok_or_else(|| ConfigError::NoHomeDir {
            path: path.to_path_buf(),
        })
}

// Helper functions

fn load_toml(cli: &Cli) -> Result<Option<TomlConfig>, ConfigError> {
    cli.config.as_deref().map(TomlConfig::load).transpose()
}

fn resolve_store_file(cli: &Cli, toml: Option<&TomlConfig>) -> Result<PathBuf, ConfigError> {
    // CLI takes precedence
    let path = cli.store_file.clone().unwrap_or_else(|| {
        toml.and_then(|t| t.store.file.as_deref())
            .unwrap_or(defaults::STORE_FILE)
            .into()
    });

    expand_tilde(&path)
}

fn build_platform(name: &str, section: &PlatformSection) -> Result<PlatformConfig, ConfigError> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ConfigError::InvalidPlatform {
            name: name.to_string(),
            reason: "must not be empty",
        });
    }

    let url_str = section.url.as_deref().ok_or_else(|| ConfigError::InvalidUrl {
        platform: normalized.clone(),
        url: String::new(),
        reason: "missing".to_string(),
    })?;
    let url = parse_bridge_url(&normalized, url_str)?;

    let method_str = section.method.as_deref().unwrap_or(defaults::METHOD);
    let method = method_str
        .parse::<Method>()
        .map_err(|_| ConfigError::InvalidMethod(method_str.to_string()))?;

    let headers = build_headers(section)?;

    if let Some(ref template) = section.body_template {
        validate_template(&normalized, template)?;
    }

    Ok(PlatformConfig {
        name: normalized,
        url,
        method,
        headers,
        body_template: section.body_template.clone(),
    })
}

fn parse_bridge_url(platform: &str, url_str: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        platform: platform.to_string(),
        url: url_str.to_string(),
        reason,
    };

    let url = Url::parse(url_str).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }

    Ok(url)
}

fn build_headers(section: &PlatformSection) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    for (name, value) in &section.headers {
        let header_name = parse_header_name(name)?;
        let header_value = parse_header_value(name, value)?;
        headers.insert(header_name, header_value);
    }

    if let Some(ref token) = section.bearer {
        let auth_value = format!("Bearer {token}");
        let header_value = parse_header_value("Authorization", &auth_value)?;
        headers.insert(AUTHORIZATION, header_value);
    }

    Ok(headers)
}

fn validate_template(platform: &str, template: &str) -> Result<(), ConfigError> {
    let sample = serde_json::json!({
        "recipient": "0",
        "text": "",
        "attachments": [],
    });

    crate::dispatch::template_engine()
        .render_template(template, &sample)
        .map_err(|e| ConfigError::InvalidTemplate {
            platform: platform.to_string(),
            reason: e.to_string(),
        })?;
    Ok(())
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
