//! Outbound transports and the table of live connections.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::BoxFuture;

use crate::event::Notification;

use super::TransportError;

/// A live connection to one chat platform.
///
/// Sends a notification to a recipient (a group id) on that platform.
/// Transports with rich content support deliver the attachments as well;
/// others may send the text alone.
///
/// The method returns a boxed future so transports of different types can
/// share one [`ConnectionRegistry`].
pub trait Transport: Send + Sync {
    /// Sends `notification` to `recipient_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the platform cannot be reached or
    /// refuses the message.
    fn send<'a>(
        &'a self,
        recipient_id: &'a str,
        notification: &'a Notification,
    ) -> BoxFuture<'a, Result<(), TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send<'a>(
        &'a self,
        recipient_id: &'a str,
        notification: &'a Notification,
    ) -> BoxFuture<'a, Result<(), TransportError>> {
        (**self).send(recipient_id, notification)
    }
}

type ConnectionTable = HashMap<String, Arc<dyn Transport>>;

/// Live connections keyed by platform name.
///
/// Platform names are matched case-insensitively. Cloning yields a handle
/// to the same table, so the owner can refresh connections while a
/// [`Dispatcher`](super::Dispatcher) keeps using them.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    table: Arc<RwLock<ConnectionTable>>,
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("platforms", &self.platforms())
            .finish()
    }
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `transport` for `platform`, replacing any previous one.
    ///
    /// Returns the replaced transport, if any.
    pub fn register(
        &self,
        platform: &str,
        transport: impl Transport + 'static,
    ) -> Option<Arc<dyn Transport>> {
        self.register_shared(platform, Arc::new(transport))
    }

    /// Registers an already shared transport for `platform`.
    pub fn register_shared(
        &self,
        platform: &str,
        transport: Arc<dyn Transport>,
    ) -> Option<Arc<dyn Transport>> {
        self.write().insert(normalize(platform), transport)
    }

    /// Drops the connection for `platform`. Returns whether one existed.
    pub fn unregister(&self, platform: &str) -> bool {
        self.write().remove(&normalize(platform)).is_some()
    }

    /// Replaces the whole table with `connections`.
    pub fn replace_all(&self, connections: impl IntoIterator<Item = (String, Arc<dyn Transport>)>) {
        let table = connections
            .into_iter()
            .map(|(platform, transport)| (normalize(&platform), transport))
            .collect();
        *self.write() = table;
    }

    /// Returns the live connection for `platform`, if any.
    #[must_use]
    pub fn get(&self, platform: &str) -> Option<Arc<dyn Transport>> {
        self.read().get(&normalize(platform)).cloned()
    }

    /// Returns the registered platform names, sorted.
    #[must_use]
    pub fn platforms(&self) -> Vec<String> {
        let mut platforms: Vec<String> = self.read().keys().cloned().collect();
        platforms.sort();
        platforms
    }

    /// Number of live connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no connection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ConnectionTable> {
        // The table holds no invariants a panicking writer could break.
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ConnectionTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn normalize(platform: &str) -> String {
    platform.trim().to_lowercase()
}

/// Transports for testing.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// How a [`RecordingTransport`] answers.
    #[derive(Debug, Clone, Copy)]
    pub enum Behavior {
        /// Record the message and succeed.
        Succeed,
        /// Record the message and fail with `UnknownRecipient`.
        Fail,
        /// Never complete.
        Hang,
        /// Panic while sending.
        Panic,
    }

    /// Records every send; optionally fails for chosen recipients.
    #[derive(Debug)]
    pub struct RecordingTransport {
        behavior: Behavior,
        failing_recipients: Vec<String>,
        sent: Mutex<Vec<(String, Notification)>>,
    }

    impl RecordingTransport {
        /// Transport that succeeds for every recipient.
        #[must_use]
        pub fn new() -> Self {
            Self::with_behavior(Behavior::Succeed)
        }

        /// Transport that answers every send with `behavior`.
        #[must_use]
        pub fn with_behavior(behavior: Behavior) -> Self {
            Self {
                behavior,
                failing_recipients: Vec::new(),
                sent: Mutex::new(Vec::new()),
            }
        }

        /// Transport that fails only for `recipients`.
        #[must_use]
        pub fn failing_for(recipients: &[&str]) -> Self {
            Self {
                behavior: Behavior::Succeed,
                failing_recipients: recipients.iter().map(ToString::to_string).collect(),
                sent: Mutex::new(Vec::new()),
            }
        }

        /// Recipients of every send attempt, in call order.
        pub fn recipients(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(r, _)| r.clone())
                .collect()
        }

        /// Every attempted send.
        pub fn sent(&self) -> Vec<(String, Notification)> {
            self.sent.lock().unwrap().clone()
        }

        /// Number of send attempts.
        pub fn calls(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl Transport for RecordingTransport {
        fn send<'a>(
            &'a self,
            recipient_id: &'a str,
            notification: &'a Notification,
        ) -> BoxFuture<'a, Result<(), TransportError>> {
            Box::pin(async move {
                self.sent
                    .lock()
                    .unwrap()
                    .push((recipient_id.to_string(), notification.clone()));

                let fails = self.failing_recipients.iter().any(|r| r == recipient_id);
                match self.behavior {
                    Behavior::Succeed if !fails => Ok(()),
                    Behavior::Succeed | Behavior::Fail => {
                        Err(TransportError::UnknownRecipient(recipient_id.to_string()))
                    }
                    Behavior::Hang => {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok(())
                    }
                    Behavior::Panic => panic!("transport exploded"),
                }
            })
        }
    }
}
