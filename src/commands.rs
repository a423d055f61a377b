//! Chat command front end: `subscribe`, `unsubscribe`, and `list`.
//!
//! A chat bot calls these with the context of the message that carried the
//! command and sends the returned reply back to the same chat. The CLI
//! drives the same functions for operators.

use crate::registry::{RemoveOutcome, SubscriberRegistry, Subscription, SubscriptionStore};

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

/// Reply for commands issued outside a group chat.
pub const GROUP_ONLY: &str = "This command can only be used in a group chat.";
/// Reply after a successful subscribe.
pub const SUBSCRIBED: &str = "Subscribed this group to repository events.";
/// Reply when the subscription could not be stored.
pub const SUBSCRIBE_FAILED: &str = "Failed to save the subscription.";
/// Reply to unsubscribe from a group that never subscribed.
pub const NOT_SUBSCRIBED: &str = "This group is not subscribed to repository events.";
/// Reply after a successful unsubscribe.
pub const UNSUBSCRIBED: &str = "Unsubscribed this group from repository events.";
/// Reply when the subscription could not be removed.
pub const UNSUBSCRIBE_FAILED: &str = "Failed to remove the subscription.";

/// Where a command was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    /// Platform the message arrived on
    pub platform: String,
    /// Group the message was sent in; `None` for direct messages
    pub group_id: Option<String>,
}

impl CommandContext {
    /// Context for a message sent in `group_id`.
    #[must_use]
    pub fn group(platform: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            group_id: Some(group_id.into()),
        }
    }

    /// Context for a direct message.
    #[must_use]
    pub fn direct(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            group_id: None,
        }
    }

    fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Subscribes the group in `ctx` to repository events.
///
/// Subscribing again from another platform moves the subscription there.
pub async fn subscribe<S: SubscriptionStore>(
    registry: &SubscriberRegistry<S>,
    ctx: &CommandContext,
) -> &'static str {
    let Some(group_id) = ctx.group_id() else {
        return GROUP_ONLY;
    };

    match registry.add(group_id, &ctx.platform).await {
        Ok(()) => {
            tracing::info!(group = group_id, platform = %ctx.platform, "Group subscribed");
            SUBSCRIBED
        }
        Err(e) => {
            tracing::error!(group = group_id, "Failed to subscribe: {e}");
            SUBSCRIBE_FAILED
        }
    }
}

/// Removes the subscription of the group in `ctx`.
pub async fn unsubscribe<S: SubscriptionStore>(
    registry: &SubscriberRegistry<S>,
    ctx: &CommandContext,
) -> &'static str {
    let Some(group_id) = ctx.group_id() else {
        return GROUP_ONLY;
    };

    match registry.remove(group_id).await {
        Ok(RemoveOutcome::Removed) => {
            tracing::info!(group = group_id, "Group unsubscribed");
            UNSUBSCRIBED
        }
        Ok(RemoveOutcome::NotSubscribed) => NOT_SUBSCRIBED,
        Err(e) => {
            tracing::error!(group = group_id, "Failed to unsubscribe: {e}");
            UNSUBSCRIBE_FAILED
        }
    }
}

/// Returns every subscription sorted by platform, then recipient.
///
/// # Errors
///
/// Returns the registry's error when the store cannot be read.
pub async fn list<S: SubscriptionStore>(
    registry: &SubscriberRegistry<S>,
) -> Result<Vec<Subscription>, crate::registry::RegistryError> {
    let mut subscriptions = registry.list_all().await?;
    subscriptions.sort_by(|a, b| {
        a.platform
            .cmp(&b.platform)
            .then_with(|| a.recipient_id.cmp(&b.recipient_id))
    });
    Ok(subscriptions)
}
