//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// gh-relay: GitHub webhook relay
///
/// Receives GitHub webhook deliveries and forwards them as chat messages
/// to every subscribed group.
#[derive(Debug, Parser)]
#[command(name = "gh-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (default: serve)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Webhook secret shared with GitHub (required to serve)
    #[arg(long, env = "GH_RELAY_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Route GitHub posts deliveries to
    #[arg(long)]
    pub path: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(long)]
    pub listen: Option<String>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the subscription store file
    #[arg(long = "store-file", global = true)]
    pub store_file: Option<PathBuf>,

    /// Per-send timeout in seconds
    #[arg(long = "send-timeout")]
    pub send_timeout: Option<u64>,

    /// Test mode - log messages instead of sending them to bridges
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for gh-relay
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = super::defaults::CONFIG_FILE)]
        output: PathBuf,
    },

    /// Subscribe a group to repository events
    Subscribe {
        /// Group identifier on its platform
        #[arg(long)]
        group: String,

        /// Platform the group lives on
        #[arg(long)]
        platform: String,
    },

    /// Remove a group's subscription
    Unsubscribe {
        /// Group identifier on its platform
        #[arg(long)]
        group: String,
    },

    /// List all subscriptions
    List,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this invocation edits or lists subscriptions rather
    /// than serving.
    #[must_use]
    pub const fn is_management(&self) -> bool {
        matches!(
            self.command,
            Some(Command::Subscribe { .. } | Command::Unsubscribe { .. } | Command::List)
        )
    }
}
