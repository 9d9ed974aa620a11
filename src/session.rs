//! Session type carrying per-shop API credentials.
//!
//! This module provides the [`Session`] type the GraphQL client uses to
//! authenticate Admin API calls. Acquiring a session (OAuth, token exchange)
//! is out of scope; a surrounding application supplies one.

use crate::config::ShopDomain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials for Admin API calls against one shop.
///
/// A session pairs a shop domain with an access token and an optional expiry.
/// The reconciler makes all of its GraphQL calls on behalf of the session's
/// shop.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync`, making it safe to share across threads.
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::{Session, ShopDomain};
///
/// let session = Session::new(
///     ShopDomain::new("my-store").unwrap(),
///     "access-token".to_string(),
///     None, // no expiration
/// );
///
/// assert!(session.is_active());
/// assert!(!session.expired());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// The shop this session is for.
    pub shop: ShopDomain,

    /// The access token for API authentication.
    pub access_token: String,

    /// When this session expires, if applicable.
    pub expires: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a new session with the specified parameters.
    #[must_use]
    pub const fn new(shop: ShopDomain, access_token: String, expires: Option<DateTime<Utc>>) -> Self {
        Self {
            shop,
            access_token,
            expires,
        }
    }

    /// Returns `true` if this session has expired.
    ///
    /// Sessions without an expiration time are considered never expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() > expires)
    }

    /// Returns `true` if this session is active (not expired and has access token).
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.access_token.is_empty() && !self.expired()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};
