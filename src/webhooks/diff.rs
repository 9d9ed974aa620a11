//! Pure diff between desired and registered webhook subscriptions.
//!
//! This module computes the plan the reconciler applies. The diff is a pure
//! function over two in-memory lists; it performs no I/O and never consults
//! the network.
//!
//! # Matching Rules
//!
//! - One subscription per topic. When Shopify holds several subscriptions
//!   for the same topic, the first listed wins and the rest are scheduled
//!   for deletion.
//! - Addresses are compared as exact strings, case sensitive, with no URL
//!   normalization. A trailing slash or a scheme case difference is a real
//!   difference and produces an update.
//! - A desired list containing the same topic twice keeps the first spec
//!   and ignores the rest.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhook_sync::webhooks::{diff, RegisteredWebhook, WebhookSpec, WebhookTopic};
//!
//! let desired = vec![WebhookSpec::new(
//!     WebhookTopic::OrdersCreate,
//!     "https://example.com/orders",
//! )];
//! let registered = vec![RegisteredWebhook::new(
//!     "gid://shopify/WebhookSubscription/1",
//!     WebhookTopic::OrdersCreate,
//!     "https://example.com/old-orders",
//! )];
//!
//! let plan = diff(&desired, &registered);
//! assert_eq!(plan.to_update.len(), 1);
//! assert!(plan.to_create.is_empty());
//! assert!(plan.to_delete.is_empty());
//! ```

use std::collections::{HashMap, HashSet};

use crate::webhooks::{RegisteredWebhook, WebhookSpec, WebhookTopic};

/// A registered subscription whose address must change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookUpdate {
    /// The subscription as currently registered.
    pub current: RegisteredWebhook,
    /// The desired state for the same topic.
    pub desired: WebhookSpec,
}

/// The plan produced by [`diff`].
///
/// Every desired spec and every registered subscription lands in exactly one
/// bucket: create, update, delete, or unchanged. Applying the plan in full
/// makes the registered set equal to the desired set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Desired topics with no registered subscription.
    pub to_create: Vec<WebhookSpec>,
    /// Registered subscriptions whose address differs from the desired one.
    pub to_update: Vec<WebhookUpdate>,
    /// Registered subscriptions to remove: duplicates first, then topics no
    /// longer desired.
    pub to_delete: Vec<RegisteredWebhook>,
    /// Desired topics already registered at the right address.
    pub unchanged: usize,
}

impl DiffResult {
    /// Returns `true` when the plan contains no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Returns the total number of operations in the plan.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

/// Computes the operations needed to make `registered` match `desired`.
///
/// The result is deterministic: creates follow desired order, updates follow
/// desired order, and deletes list duplicate subscriptions (in registered
/// order) before stale topics (in registered order).
#[must_use]
pub fn diff(desired: &[WebhookSpec], registered: &[RegisteredWebhook]) -> DiffResult {
    let mut result = DiffResult::default();

    // First pass: index the first registered subscription per topic. Later
    // subscriptions for an already-seen topic are duplicates and get deleted
    // regardless of their address.
    let mut first_index: HashMap<&WebhookTopic, usize> = HashMap::new();
    for (i, registration) in registered.iter().enumerate() {
        if first_index.contains_key(&registration.topic) {
            result.to_delete.push(registration.clone());
        } else {
            first_index.insert(&registration.topic, i);
        }
    }

    // Second pass: match desired specs against the surviving subscription
    // for their topic. The first spec per topic wins.
    let mut desired_topics: HashSet<&WebhookTopic> = HashSet::new();
    for spec in desired {
        if !desired_topics.insert(&spec.topic) {
            continue;
        }

        match first_index.get(&spec.topic).map(|&i| &registered[i]) {
            None => result.to_create.push(spec.clone()),
            Some(current) if current.address == spec.address => result.unchanged += 1,
            Some(current) => result.to_update.push(WebhookUpdate {
                current: current.clone(),
                desired: spec.clone(),
            }),
        }
    }

    // Third pass: surviving subscriptions whose topic is no longer desired.
    for (i, registration) in registered.iter().enumerate() {
        if first_index.get(&registration.topic) == Some(&i)
            && !desired_topics.contains(&registration.topic)
        {
            result.to_delete.push(registration.clone());
        }
    }

    result
}
