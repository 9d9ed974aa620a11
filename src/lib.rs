//! # Shopify Webhook Sync
//!
//! Declarative webhook subscription management for the Shopify GraphQL Admin
//! API: state which webhooks an app wants, reconcile Shopify's registered
//! subscriptions to match, and verify and dispatch incoming deliveries.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`SyncConfig`] and [`SyncConfigBuilder`]
//! - Validated newtypes for secret keys and domain values
//! - A single-request GraphQL executor with typed error classification
//! - Declarative reconciliation: fetch, diff, apply, report
//! - HMAC signature verification with key rotation support
//! - Topic-to-handler dispatch for incoming deliveries
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_webhook_sync::{ApiSecretKey, ApiVersion, SyncConfig};
//!
//! // Create configuration using the builder pattern
//! let config = SyncConfig::builder()
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Reconciling Subscriptions
//!
//! Reconciliation is declarative: pass the full desired set each time and the
//! reconciler computes the creates, updates, and deletes. Topics appear at
//! most once in the registered set afterwards, and running the same set again
//! performs no mutations.
//!
//! ```rust,ignore
//! use shopify_webhook_sync::{Session, ShopDomain, WebhookReconciler, WebhookSpec, WebhookTopic};
//!
//! let session = Session::new(
//!     ShopDomain::new("my-store").unwrap(),
//!     "access-token".to_string(),
//!     None,
//! );
//!
//! let desired = vec![
//!     WebhookSpec::new(WebhookTopic::OrdersCreate, "https://my-app.com/hooks/orders"),
//!     WebhookSpec::new(WebhookTopic::AppUninstalled, "https://my-app.com/hooks/uninstall"),
//! ];
//!
//! let reconciler = WebhookReconciler::new(&session, Some(&config));
//! let report = reconciler.reconcile(&desired).await?;
//!
//! println!(
//!     "created {}, updated {}, deleted {}, unchanged {}",
//!     report.created, report.updated, report.deleted, report.unchanged
//! );
//! for failure in &report.failures {
//!     eprintln!(
//!         "{} {} failed: {}",
//!         failure.operation.kind(),
//!         failure.operation.topic(),
//!         failure.error
//!     );
//! }
//! ```
//!
//! ## Processing Incoming Webhooks
//!
//! ```rust,ignore
//! use shopify_webhook_sync::{HandlerRegistry, WebhookRequest, WebhookTopic};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.add_handler(WebhookTopic::OrdersCreate, Box::new(OrderCreated));
//!
//! // In the HTTP endpoint receiving deliveries:
//! let request = WebhookRequest::new(
//!     body_bytes,
//!     hmac_header,
//!     topic_header,
//!     shop_domain_header,
//!     api_version_header,
//!     webhook_id_header,
//! );
//! registry.process(&config, &request).await?;
//! ```
//!
//! ## Handling Throttling
//!
//! The GraphQL executor never retries. A throttled request surfaces as
//! [`TooManyRequestsError`] carrying the query cost and throttle status
//! Shopify reported, so the caller can decide when to try again:
//!
//! ```rust,ignore
//! use shopify_webhook_sync::GraphqlError;
//!
//! match client.execute(query, None, None).await {
//!     Err(GraphqlError::TooManyRequests(e)) => {
//!         if let Some(wait) = e.suggested_wait() {
//!             tokio::time::sleep(wait).await;
//!         }
//!     }
//!     other => { /* ... */ }
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **No hidden retries**: One request per call; throttling is reported, not absorbed
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod session;
pub mod webhooks;

// Re-export public types at crate root for convenience
pub use config::{ApiSecretKey, ApiVersion, HostUrl, ShopDomain, SyncConfig, SyncConfigBuilder};
pub use error::ConfigError;
pub use session::Session;

// Re-export GraphQL client types
pub use clients::{
    ConnectionError, GraphqlClient, GraphqlError, GraphqlResponse, TooManyRequestsError, UserError,
    SDK_VERSION,
};

// Re-export webhook types for convenience
pub use webhooks::{
    diff, fetch_registered, verify_hmac, verify_webhook, ApplyFailure, DiffResult, HandlerRegistry,
    ReconciliationError, ReconciliationReport, RegisteredWebhook, WebhookContext, WebhookError,
    WebhookHandler, WebhookOperation, WebhookReconciler, WebhookRequest, WebhookSpec, WebhookTopic,
};
