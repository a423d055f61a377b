//! Subscriber registry: which chat groups receive repository events.
//!
//! This module provides:
//! - The subscription record ([`Subscription`])
//! - The storage abstraction the registry runs on ([`SubscriptionStore`])
//! - A JSON file store ([`FileSubscriptionStore`])
//! - The registry itself with its subscribe/unsubscribe contract
//!   ([`SubscriberRegistry`])
//!
//! A group has at most one subscription: the recipient id is the key, and
//! subscribing again replaces the stored platform.

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileSubscriptionStore;

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One chat group subscribed to all repository events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Group identifier on its platform
    pub recipient_id: String,
    /// Chat platform name, e.g. `onebot` or `discord`
    pub platform: String,
}

impl Subscription {
    /// Creates a subscription record.
    #[must_use]
    pub fn new(recipient_id: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            platform: platform.into(),
        }
    }
}

/// Errors raised by a [`SubscriptionStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the backing file.
    #[error("Failed to read subscription store: {0}")]
    Read(#[source] io::Error),

    /// Failed to write the backing file.
    #[error("Failed to write subscription store: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize subscriptions.
    #[error("Failed to serialize subscriptions: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The backing file exists but cannot be understood.
    ///
    /// The store refuses to overwrite it so that no subscriptions are lost.
    #[error("Subscription store is corrupted: {reason}")]
    Corrupted {
        /// What was wrong with the contents
        reason: String,
    },

    /// The blocking I/O task did not complete.
    #[error("Subscription store task failed: {0}")]
    Task(String),
}

/// Errors raised by [`SubscriberRegistry`] operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Subscriptions need a non-empty recipient id.
    #[error("Recipient id must not be empty")]
    EmptyRecipient,

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of removing a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// A subscription existed and was removed.
    Removed,
    /// There was nothing to remove.
    NotSubscribed,
}

/// Persistent key-value storage of subscriptions keyed by recipient id.
///
/// The registry relies on read-your-writes semantics; locking is up to the
/// implementation.
pub trait SubscriptionStore: Send + Sync {
    /// Inserts or replaces the record for `subscription.recipient_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    fn upsert(
        &self,
        subscription: Subscription,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Looks up the record for `recipient_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(
        &self,
        recipient_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Subscription>, StoreError>> + Send;

    /// Removes the records for `recipient_ids`, returning how many existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    fn remove(
        &self,
        recipient_ids: &[&str],
    ) -> impl std::future::Future<Output = Result<usize, StoreError>> + Send;

    /// Returns every record, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Subscription>, StoreError>> + Send;
}

/// Subscribe/unsubscribe contract over a [`SubscriptionStore`].
#[derive(Debug)]
pub struct SubscriberRegistry<S> {
    store: S,
}

impl<S: SubscriptionStore> SubscriberRegistry<S> {
    /// Creates a registry over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Subscribes `recipient_id` on `platform`, replacing any previous platform.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyRecipient`] for a blank id, or the
    /// store's error.
    pub async fn add(&self, recipient_id: &str, platform: &str) -> Result<(), RegistryError> {
        let recipient_id = recipient_id.trim();
        if recipient_id.is_empty() {
            return Err(RegistryError::EmptyRecipient);
        }

        self.store
            .upsert(Subscription::new(recipient_id, platform))
            .await?;
        Ok(())
    }

    /// Unsubscribes `recipient_id`.
    ///
    /// Looks the id up first and only asks the store to remove it when a
    /// record exists.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn remove(&self, recipient_id: &str) -> Result<RemoveOutcome, RegistryError> {
        let recipient_id = recipient_id.trim();
        if self.store.get(recipient_id).await?.is_none() {
            return Ok(RemoveOutcome::NotSubscribed);
        }

        self.store.remove(&[recipient_id]).await?;
        Ok(RemoveOutcome::Removed)
    }

    /// Returns every current subscription, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn list_all(&self) -> Result<Vec<Subscription>, RegistryError> {
        Ok(self.store.list().await?)
    }
}
