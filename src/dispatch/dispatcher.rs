//! Fan-out of one notification to every subscriber.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;

use crate::event::Notification;
use crate::registry::Subscription;

use super::{ConnectionRegistry, DeliveryFailure};

/// Result of delivering to one subscriber.
#[derive(Debug)]
pub struct DeliveryOutcome {
    /// Who the notification was for
    pub subscription: Subscription,
    /// What happened
    pub result: Result<(), DeliveryFailure>,
}

impl DeliveryOutcome {
    /// Returns true if the notification reached the platform.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-subscriber results of one fan-out, in subscription order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    outcomes: Vec<DeliveryOutcome>,
}

impl DispatchReport {
    /// All outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[DeliveryOutcome] {
        &self.outcomes
    }

    /// Number of successful deliveries.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_delivered()).count()
    }

    /// Number of failed deliveries.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }

    /// The failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = (&Subscription, &DeliveryFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.subscription, e)))
    }

    /// Total number of attempted deliveries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if there were no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Delivers notifications over the connections in a [`ConnectionRegistry`].
///
/// Every delivery is independent: an unreachable platform, a transport
/// error, a timeout, or a panicking transport only affects its own
/// subscriber. Deliveries of one notification run concurrently.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    connections: ConnectionRegistry,
    send_timeout: Duration,
}

impl Dispatcher {
    /// Default upper bound for a single send (10 seconds).
    pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a dispatcher over `connections` with the default send timeout.
    #[must_use]
    pub const fn new(connections: ConnectionRegistry) -> Self {
        Self {
            connections,
            send_timeout: Self::DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Sets the per-send timeout.
    #[must_use]
    pub const fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Returns the connection table.
    #[must_use]
    pub const fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    /// Returns the per-send timeout.
    #[must_use]
    pub const fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Delivers `notification` to every subscription.
    ///
    /// Never fails as a whole; inspect the returned report for per-subscriber
    /// results. Failures are also logged here.
    pub async fn dispatch(
        &self,
        subscriptions: &[Subscription],
        notification: &Notification,
    ) -> DispatchReport {
        let deliveries = subscriptions
            .iter()
            .map(|subscription| self.deliver(subscription, notification));
        let results = join_all(deliveries).await;

        let outcomes = subscriptions
            .iter()
            .cloned()
            .zip(results)
            .map(|(subscription, result)| {
                if let Err(e) = &result {
                    tracing::error!(
                        recipient = %subscription.recipient_id,
                        platform = %subscription.platform,
                        "Delivery failed: {e}"
                    );
                }
                DeliveryOutcome {
                    subscription,
                    result,
                }
            })
            .collect();

        DispatchReport { outcomes }
    }

    async fn deliver(
        &self,
        subscription: &Subscription,
        notification: &Notification,
    ) -> Result<(), DeliveryFailure> {
        let transport =
            self.connections
                .get(&subscription.platform)
                .ok_or_else(|| DeliveryFailure::Unreachable {
                    platform: subscription.platform.clone(),
                })?;

        let send = AssertUnwindSafe(transport.send(&subscription.recipient_id, notification))
            .catch_unwind();

        match tokio::time::timeout(self.send_timeout, send).await {
            Ok(Ok(result)) => result.map_err(DeliveryFailure::from),
            Ok(Err(_panic)) => Err(DeliveryFailure::Panicked),
            Err(_elapsed) => Err(DeliveryFailure::TimedOut(self.send_timeout)),
        }
    }
}
