//! Webhook subscription types.
//!
//! This module contains the two views of a webhook subscription used by the
//! reconciler: [`WebhookSpec`] is what the caller wants registered, and
//! [`RegisteredWebhook`] is what Shopify reports as currently registered.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhook_sync::webhooks::{WebhookSpec, WebhookTopic};
//!
//! let spec = WebhookSpec::new(
//!     WebhookTopic::OrdersCreate,
//!     "https://example.com/webhooks/orders",
//! );
//!
//! assert_eq!(spec.topic, WebhookTopic::OrdersCreate);
//! assert_eq!(spec.address, "https://example.com/webhooks/orders");
//! ```

use serde::{Deserialize, Serialize};

use crate::webhooks::WebhookTopic;

/// A desired webhook subscription.
///
/// Specs describe the target state of one topic: which callback address
/// should receive its deliveries. Addresses are compared exactly during
/// reconciliation, so `https://example.com/hook` and
/// `https://example.com/hook/` are different subscriptions.
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::webhooks::{WebhookSpec, WebhookTopic};
///
/// let spec = WebhookSpec::new(WebhookTopic::ProductsUpdate, "https://example.com/hooks");
/// assert_eq!(spec.topic.as_graphql(), "PRODUCTS_UPDATE");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSpec {
    /// The webhook topic to subscribe to.
    pub topic: WebhookTopic,

    /// The callback URL that should receive deliveries for this topic.
    pub address: String,
}

impl WebhookSpec {
    /// Creates a new webhook spec.
    #[must_use]
    pub fn new(topic: WebhookTopic, address: impl Into<String>) -> Self {
        Self {
            topic,
            address: address.into(),
        }
    }
}

/// A webhook subscription currently registered in Shopify.
///
/// This is the snapshot form returned by
/// [`fetch_registered`](crate::webhooks::fetch_registered): the subscription
/// id (a `gid://shopify/WebhookSubscription/...` value), its topic, and its
/// delivery address. Subscriptions with a non-HTTP delivery endpoint have an
/// empty address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredWebhook {
    /// The Shopify webhook subscription id.
    pub id: String,

    /// The topic this subscription delivers.
    pub topic: WebhookTopic,

    /// The callback URL, or an empty string for non-HTTP endpoints.
    pub address: String,
}

impl RegisteredWebhook {
    /// Creates a new registered webhook record.
    #[must_use]
    pub fn new(id: impl Into<String>, topic: WebhookTopic, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic,
            address: address.into(),
        }
    }
}
