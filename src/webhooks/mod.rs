//! Webhook subscription reconciliation and incoming webhook processing.
//!
//! This module covers both directions of the webhook lifecycle:
//!
//! - **Outbound (reconciliation)**: declare the webhook subscriptions the app
//!   wants, and converge Shopify's registered subscriptions to match, via
//!   GraphQL Admin API mutations.
//! - **Inbound (processing)**: verify the HMAC signature of a delivered
//!   webhook and dispatch it to the handler registered for its topic.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`WebhookReconciler`]: Fetches, diffs, and applies subscription changes
//! - [`WebhookSpec`] / [`RegisteredWebhook`]: Desired and registered views of
//!   a subscription
//! - [`diff`] / [`DiffResult`]: The pure planning step
//! - [`ReconciliationReport`] / [`ReconciliationError`]: Reconciliation outcomes
//! - [`HandlerRegistry`] / [`WebhookHandler`]: Topic-to-handler dispatch
//! - [`verify_webhook`] / [`verify_hmac`]: Signature verification
//! - [`WebhookTopic`]: Topic names in both Shopify spellings
//!
//! # Reconciliation
//!
//! Reconciliation is declarative: the caller states the desired set and the
//! reconciler figures out the creates, updates, and deletes. Reconciling the
//! same set twice performs no mutations on the second run.
//!
//! ```rust,ignore
//! use shopify_webhook_sync::webhooks::{WebhookReconciler, WebhookSpec, WebhookTopic};
//!
//! let desired = vec![
//!     WebhookSpec::new(WebhookTopic::OrdersCreate, "https://example.com/hooks/orders"),
//!     WebhookSpec::new(WebhookTopic::AppUninstalled, "https://example.com/hooks/uninstall"),
//! ];
//!
//! let reconciler = WebhookReconciler::new(&session, Some(&config));
//! let report = reconciler.reconcile(&desired).await?;
//! println!(
//!     "created {}, updated {}, deleted {}, unchanged {}",
//!     report.created, report.updated, report.deleted, report.unchanged
//! );
//! ```
//!
//! # Processing Deliveries
//!
//! ```rust,ignore
//! use shopify_webhook_sync::webhooks::{HandlerRegistry, WebhookRequest, WebhookTopic};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.add_handler(WebhookTopic::OrdersCreate, Box::new(OrderCreated));
//!
//! // In the HTTP endpoint receiving deliveries:
//! let request = WebhookRequest::new(body, hmac, topic, shop, api_version, webhook_id);
//! registry.process(&config, &request).await?;
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are `Send + Sync`, making them safe to share
//! across async tasks.

mod diff;
mod errors;
mod fetch;
mod handlers;
mod manager;
mod topic;
mod types;
mod verification;

pub use diff::{diff, DiffResult, WebhookUpdate};
pub use errors::{ReconciliationError, WebhookError};
pub use fetch::fetch_registered;
pub use handlers::{BoxFuture, HandlerRegistry, WebhookHandler};
pub use manager::{ApplyFailure, ReconciliationReport, WebhookOperation, WebhookReconciler};
pub use topic::WebhookTopic;
pub use types::{RegisteredWebhook, WebhookSpec};
pub use verification::{
    compute_signature_base64, constant_time_compare, verify_hmac, verify_webhook, WebhookContext,
    WebhookRequest, HEADER_API_VERSION, HEADER_HMAC, HEADER_SHOP_DOMAIN, HEADER_TOPIC,
    HEADER_WEBHOOK_ID,
};
