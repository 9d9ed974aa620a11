//! API client types for Shopify Admin API communication.
//!
//! This module provides the GraphQL client layer used for all Admin API
//! requests. It handles endpoint construction, authenticated headers, and
//! Shopify-specific error classification.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`graphql::GraphqlClient`]: The async GraphQL executor (Admin API)
//! - [`graphql::GraphqlResponse`]: Parsed response envelope
//! - [`graphql::GraphqlError`]: Classified GraphQL error types
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_webhook_sync::{GraphqlClient, Session, ShopDomain};
//!
//! // Create a session
//! let session = Session::new(
//!     ShopDomain::new("my-store").unwrap(),
//!     "access-token".to_string(),
//!     None,
//! );
//!
//! // Create a GraphQL client and send a request
//! let client = GraphqlClient::new(&session, None);
//! let response = client.execute("query { shop { name } }", None, None).await?;
//! ```

pub mod graphql;

// Re-export GraphQL client types at the clients module level
pub use graphql::{
    ConnectionError, GraphqlClient, GraphqlError, GraphqlResponse, TooManyRequestsError, UserError,
    SDK_VERSION,
};
