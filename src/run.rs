//! Application execution logic.
//!
//! This module wires the configured platform bridges, the subscription
//! store, and the webhook pipeline together and serves HTTP until a
//! shutdown signal arrives. It also runs the subscription management
//! subcommands.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;

use gh_relay::commands::{self, CommandContext, SUBSCRIBE_FAILED, UNSUBSCRIBE_FAILED};
use gh_relay::config::{Command, PlatformConfig, ValidatedConfig};
use gh_relay::dispatch::{
    BridgeTransport, ConnectionRegistry, Dispatcher, HttpError, LogTransport, ReqwestClient,
};
use gh_relay::registry::{FileSubscriptionStore, RegistryError, SubscriberRegistry};
use gh_relay::server::{WebhookPipeline, router};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to build the HTTP client for platform bridges.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] HttpError),

    /// Failed to bind the listen address.
    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        /// Address that could not be bound
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    /// A subscription command could not read or write the store.
    #[error("Subscription store error: {0}")]
    Store(#[from] RegistryError),

    /// A subscription command was refused.
    #[error("{0}")]
    CommandFailed(&'static str),
}

/// Serves webhooks until a shutdown signal (Ctrl+C or SIGTERM) arrives.
///
/// # Errors
///
/// Returns an error if:
/// - The bridge HTTP client cannot be created
/// - The listen address cannot be bound
/// - The server fails while running
///
/// # Coverage Note
///
/// This function is excluded from coverage because it binds a real socket
/// and waits for OS signals.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let connections = build_connections(&config)?;
    if config.dry_run {
        tracing::info!("Dry-run mode enabled - messages will be logged but not sent");
    }
    if connections.is_empty() {
        tracing::warn!("No platforms configured - notifications will not be delivered");
    }

    let store = FileSubscriptionStore::new(&config.store_file);
    tracing::info!("Subscription store: {}", store.path().display());

    let dispatcher = Dispatcher::new(connections).with_send_timeout(config.send_timeout);
    let pipeline = WebhookPipeline::new(config.secret, SubscriberRegistry::new(store), dispatcher);
    let app = router(&config.path, Arc::new(pipeline));

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| RunError::Bind {
            addr: config.listen,
            source,
        })?;
    tracing::info!("Listening on http://{}{}", config.listen, config.path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(RunError::Serve)?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Runs a subscription management subcommand and returns the text to print.
///
/// # Errors
///
/// Returns an error if the store fails or the command is refused.
pub async fn manage(command: &Command, store_file: PathBuf) -> Result<String, RunError> {
    let registry = SubscriberRegistry::new(FileSubscriptionStore::new(store_file));

    let reply = match command {
        Command::Subscribe { group, platform } => {
            commands::subscribe(&registry, &CommandContext::group(platform, group)).await
        }
        Command::Unsubscribe { group } => {
            // The platform does not matter for removal
            commands::unsubscribe(&registry, &CommandContext::group("cli", group)).await
        }
        Command::List => return Ok(format_subscriptions(&commands::list(&registry).await?)),
        Command::Init { .. } => return Ok(String::new()),
    };

    if reply == SUBSCRIBE_FAILED || reply == UNSUBSCRIBE_FAILED {
        return Err(RunError::CommandFailed(reply));
    }
    Ok(reply.to_string())
}

/// Builds the connection table from the configured platforms.
///
/// In dry-run mode every platform gets a [`LogTransport`] instead of a bridge.
fn build_connections(config: &ValidatedConfig) -> Result<ConnectionRegistry, RunError> {
    let connections = ConnectionRegistry::new();

    if config.dry_run {
        for platform in &config.platforms {
            connections.register(&platform.name, LogTransport::new(&platform.name));
        }
        return Ok(connections);
    }

    let client = ReqwestClient::with_timeout(config.send_timeout).map_err(RunError::HttpClient)?;
    for platform in &config.platforms {
        tracing::info!(
            "Platform {}: {} {}",
            platform.name,
            platform.method,
            platform.url
        );
        connections.register(&platform.name, create_bridge(client.clone(), platform));
    }

    Ok(connections)
}

/// Creates the HTTP bridge transport for one platform.
fn create_bridge(client: ReqwestClient, platform: &PlatformConfig) -> BridgeTransport<ReqwestClient> {
    let mut bridge = BridgeTransport::new(client, platform.url.clone())
        .with_method(platform.method.clone())
        .with_headers(platform.headers.clone());

    if let Some(ref template) = platform.body_template {
        bridge = bridge.with_body_template(template);
    }

    bridge
}

fn format_subscriptions(subscriptions: &[gh_relay::registry::Subscription]) -> String {
    if subscriptions.is_empty() {
        return "No subscriptions.".to_string();
    }

    subscriptions
        .iter()
        .map(|s| format!("{}\t{}", s.platform, s.recipient_id))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received, stopping...");
}
