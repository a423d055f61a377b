//! Configuration layer for gh-relay.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`], [`PlatformConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//!    (the secret may also come from `GH_RELAY_SECRET`, which clap treats as CLI)
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! The secret has no default and must come from one of the first two.
//!
//! # CLI-Only vs TOML-Only Options
//!
//! Platform bridges (`[platforms.<name>]`) are TOML-only: each carries a URL,
//! method, headers, bearer token, and body template, which does not fit on a
//! command line. `--dry-run` and `--verbose` are CLI-only.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod toml_tests;
#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{
    PlatformConfig, ValidatedConfig, expand_tilde, load_store_file, write_default_config,
};
