//! GraphQL API client for the Shopify Admin API.
//!
//! This module provides the executor the rest of the crate is built on: a
//! client that sends one GraphQL request per call and classifies the outcome
//! into typed errors.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`GraphqlClient`]: The GraphQL executor with an `execute()` method
//! - [`GraphqlResponse`]: Parsed response envelope with typed `decode_data()`
//! - [`GraphqlError`]: Classified error type for GraphQL API operations
//!
//! # Error Classification
//!
//! Shopify reports most failures inside an HTTP 200 response, so status codes
//! alone are not enough. Every call to [`GraphqlClient::execute`] ends in
//! exactly one of four outcomes:
//!
//! - `Ok(response)`: 2xx, no top-level `errors`, no `userErrors`
//! - [`GraphqlError::Connection`]: transport failure, non-2xx status,
//!   unparseable body, or top-level errors without a `THROTTLED` code
//! - [`GraphqlError::TooManyRequests`]: a top-level error with the
//!   `THROTTLED` extension code, carrying cost information when available
//! - [`GraphqlError::UserError`]: a mutation payload with non-empty
//!   `userErrors`
//!
//! # Retry Behavior
//!
//! There is none. Each `execute()` call sends exactly one request. Throttling
//! is reported as [`TooManyRequestsError`] with a
//! [`suggested_wait()`](TooManyRequestsError::suggested_wait) derived from the
//! throttle status, and the caller decides whether and when to retry.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_webhook_sync::{GraphqlClient, Session, ShopDomain};
//! use serde_json::json;
//!
//! let session = Session::new(
//!     ShopDomain::new("my-store").unwrap(),
//!     "access-token".to_string(),
//!     None,
//! );
//!
//! let client = GraphqlClient::new(&session, None);
//!
//! // Simple query
//! let response = client.execute("query { shop { name } }", None, None).await?;
//!
//! // Query with variables
//! let response = client.execute(
//!     "query Subscription($id: ID!) { webhookSubscription(id: $id) { topic } }",
//!     Some(json!({ "id": "gid://shopify/WebhookSubscription/123" })),
//!     None,
//! ).await?;
//! ```

mod client;
mod errors;
mod response;

pub use client::{GraphqlClient, SDK_VERSION};
pub use errors::{ConnectionError, GraphqlError, TooManyRequestsError, UserError};
pub use response::{
    GraphqlResponse, GraphqlResponseError, QueryCost, ThrottleStatus, UserErrorEntry,
};
