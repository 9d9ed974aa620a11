//! Webhook handler registration and dispatch.
//!
//! This module maps webhook topics to handlers and drives the full
//! processing pipeline for an incoming delivery: verify the signature, look
//! up the handler for the topic, parse the payload, and invoke the handler.
//!
//! # Example
//!
//! ```rust
//! use serde_json::Value;
//! use shopify_webhook_sync::webhooks::{
//!     BoxFuture, HandlerRegistry, WebhookContext, WebhookError, WebhookHandler, WebhookTopic,
//! };
//!
//! struct OrderCreated;
//!
//! impl WebhookHandler for OrderCreated {
//!     fn handle(
//!         &self,
//!         context: WebhookContext,
//!         payload: Value,
//!     ) -> BoxFuture<'_, Result<(), WebhookError>> {
//!         Box::pin(async move {
//!             println!(
//!                 "order {} from {:?}",
//!                 payload["id"],
//!                 context.shop_domain()
//!             );
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.add_handler(WebhookTopic::OrdersCreate, Box::new(OrderCreated));
//! assert!(registry.contains(&WebhookTopic::OrdersCreate));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::config::SyncConfig;
use crate::webhooks::verification::{verify_webhook, WebhookContext, WebhookRequest};
use crate::webhooks::{WebhookError, WebhookTopic};

/// A boxed future returned by webhook handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A handler for one webhook topic.
///
/// Handlers receive the verified [`WebhookContext`] and the parsed JSON
/// payload. Returning an error signals that processing failed; the caller
/// should respond to Shopify with a non-2xx status so the delivery is
/// retried.
pub trait WebhookHandler: Send + Sync {
    /// Processes one verified webhook delivery.
    fn handle(
        &self,
        context: WebhookContext,
        payload: Value,
    ) -> BoxFuture<'_, Result<(), WebhookError>>;
}

/// Maps webhook topics to their handlers.
///
/// The registry is the explicit dispatch table for incoming webhooks: a
/// delivery is only processed when a handler was registered for its topic.
/// Registering a second handler for the same topic replaces the first.
///
/// # Thread Safety
///
/// `HandlerRegistry` is `Send + Sync`, making it safe to share across
/// async tasks.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<WebhookTopic, Box<dyn WebhookHandler>>,
}

// Verify HandlerRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HandlerRegistry>();
};

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field(
                "handlers",
                &format_args!("<{} handlers>", self.handlers.len()),
            )
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty handler registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a topic, replacing any existing handler.
    ///
    /// Returns `&mut Self` to allow chaining.
    pub fn add_handler(
        &mut self,
        topic: WebhookTopic,
        handler: Box<dyn WebhookHandler>,
    ) -> &mut Self {
        self.handlers.insert(topic, handler);
        self
    }

    /// Returns the handler registered for a topic, if any.
    #[must_use]
    pub fn handler_for(&self, topic: &WebhookTopic) -> Option<&dyn WebhookHandler> {
        self.handlers.get(topic).map(Box::as_ref)
    }

    /// Returns `true` when a handler is registered for the topic.
    #[must_use]
    pub fn contains(&self, topic: &WebhookTopic) -> bool {
        self.handlers.contains_key(topic)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns an iterator over the registered topics.
    pub fn topics(&self) -> impl Iterator<Item = &WebhookTopic> {
        self.handlers.keys()
    }

    /// Processes an incoming webhook delivery end to end.
    ///
    /// Verifies the signature, resolves the handler for the delivered topic,
    /// parses the body as JSON, and invokes the handler.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::InvalidHmac`] when signature verification fails.
    ///   The topic is not even looked at in this case.
    /// - [`WebhookError::NoHandlerForTopic`] when the topic is missing,
    ///   malformed, or has no registered handler
    /// - [`WebhookError::PayloadParse`] when the body is not valid JSON
    /// - Any error the handler itself returns
    pub async fn process(
        &self,
        config: &SyncConfig,
        request: &WebhookRequest,
    ) -> Result<(), WebhookError> {
        let context = verify_webhook(config, request)?;

        let handler = context
            .topic()
            .and_then(|topic| self.handler_for(topic))
            .ok_or_else(|| WebhookError::NoHandlerForTopic {
                topic: context.topic_raw().to_string(),
            })?;

        let payload: Value =
            serde_json::from_slice(request.body()).map_err(|e| WebhookError::PayloadParse {
                message: e.to_string(),
            })?;

        tracing::debug!(
            topic = context.topic_raw(),
            webhook_id = ?context.webhook_id(),
            "dispatching webhook"
        );
        handler.handle(context, payload).await
    }
}
