//! Webhook-specific error types.
//!
//! This module contains error types for webhook reconciliation and incoming
//! webhook processing.
//!
//! # Error Handling
//!
//! Reconciliation and processing fail in different ways, so they use
//! different types:
//!
//! - [`ReconciliationError`]: Reconciliation could not start because the
//!   registered subscriptions could not be fetched. Failures of individual
//!   create/update/delete operations are not errors at this level; they are
//!   collected in the reconciliation report instead.
//! - [`WebhookError::InvalidHmac`]: Webhook signature verification failed
//! - [`WebhookError::NoHandlerForTopic`]: No handler is registered for the
//!   delivered topic
//! - [`WebhookError::PayloadParse`]: The webhook body is not valid JSON
//! - [`WebhookError::Handler`]: A handler reported a failure
//!
//! # Example
//!
//! ```rust
//! use shopify_webhook_sync::webhooks::WebhookError;
//!
//! let error = WebhookError::NoHandlerForTopic {
//!     topic: "orders/create".to_string(),
//! };
//! println!("Error: {}", error);
//! ```

use crate::clients::GraphqlError;
use thiserror::Error;

/// Error type for incoming webhook processing.
///
/// This enum covers signature verification failures, handler dispatch
/// failures, and payload decoding failures.
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::webhooks::WebhookError;
///
/// let error = WebhookError::NoHandlerForTopic {
///     topic: "orders/create".to_string(),
/// };
/// assert!(error.to_string().contains("No handler registered"));
/// ```
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    ///
    /// This error occurs when the HMAC signature in the webhook request
    /// does not match the expected signature computed from the request body.
    /// The error message is intentionally generic to avoid leaking security details.
    #[error("Webhook signature verification failed")]
    InvalidHmac,

    /// No handler is registered for the delivered topic.
    ///
    /// This error occurs when a verified webhook arrives for a topic that
    /// was never added to the handler registry.
    #[error("No handler registered for webhook topic: {topic}")]
    NoHandlerForTopic {
        /// The raw topic string from the webhook headers.
        topic: String,
    },

    /// The webhook request body could not be parsed as JSON.
    #[error("Failed to parse webhook payload: {message}")]
    PayloadParse {
        /// Description of the parse failure.
        message: String,
    },

    /// A webhook handler reported a failure.
    ///
    /// Handlers return this to signal that processing failed and the
    /// delivery should be retried by Shopify (respond with a non-2xx status).
    #[error("Webhook handler failed: {message}")]
    Handler {
        /// Description of the handler failure.
        message: String,
    },
}

/// Error type for webhook reconciliation.
///
/// Reconciliation is all-or-nothing about reading the current state: if the
/// registered subscriptions cannot be fetched completely, no changes are
/// attempted and this error is returned. Individual mutation failures during
/// the apply phase do not produce this error; they are recorded in the
/// [`ReconciliationReport`](crate::webhooks::ReconciliationReport).
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::webhooks::ReconciliationError;
/// use shopify_webhook_sync::{ConnectionError, GraphqlError};
///
/// let error = ReconciliationError::from(GraphqlError::Connection(ConnectionError {
///     code: Some(500),
///     message: "Internal Server Error".to_string(),
///     error_reference: None,
/// }));
/// assert!(error.to_string().contains("Failed to fetch"));
/// ```
#[derive(Debug, Error)]
#[error("Failed to fetch registered webhook subscriptions: {source}")]
pub struct ReconciliationError {
    /// The underlying GraphQL error that aborted the fetch.
    #[from]
    pub source: GraphqlError,
}
