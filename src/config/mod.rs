//! Configuration types for the webhook sync crate.
//!
//! This module provides the core configuration types used to initialize
//! the GraphQL client, the reconciler, and incoming-delivery verification.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`SyncConfig`]: The main configuration struct, passed explicitly into
//!   the client and reconciler (no ambient global configuration)
//! - [`SyncConfigBuilder`]: A builder for constructing [`SyncConfig`] instances
//! - [`ApiSecretKey`]: A validated API secret key newtype with masked debug output
//! - [`ShopDomain`]: A validated Shopify shop domain
//! - [`HostUrl`]: A validated Admin API host override
//! - [`ApiVersion`]: The Shopify API version to use
//!
//! # Example
//!
//! ```rust
//! use shopify_webhook_sync::{SyncConfig, ApiSecretKey, ApiVersion};
//!
//! let config = SyncConfig::builder()
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiSecretKey, HostUrl, ShopDomain};
pub use version::ApiVersion;

use crate::error::ConfigError;

/// Configuration for webhook reconciliation and delivery verification.
///
/// This struct holds everything the crate needs beyond a [`Session`]: the
/// secret that signs webhook deliveries, the API version to target, and
/// optional host/user-agent overrides.
///
/// # Thread Safety
///
/// `SyncConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Key Rotation
///
/// The `old_api_secret_key` field supports seamless key rotation. When
/// verifying webhook delivery signatures, the primary key is tried first,
/// then the old key if configured. This keeps deliveries signed with the
/// previous secret verifiable while the rotation propagates.
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::{SyncConfig, ApiSecretKey};
///
/// let config = SyncConfig::builder()
///     .api_secret_key(ApiSecretKey::new("your-secret").unwrap())
///     .build()
///     .unwrap();
///
/// assert!(config.host().is_none());
/// ```
///
/// [`Session`]: crate::Session
#[derive(Clone, Debug)]
pub struct SyncConfig {
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    host: Option<HostUrl>,
    api_version: ApiVersion,
    user_agent_prefix: Option<String>,
}

impl SyncConfig {
    /// Creates a new builder for constructing a `SyncConfig`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shopify_webhook_sync::{SyncConfig, ApiSecretKey};
    ///
    /// let config = SyncConfig::builder()
    ///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::new()
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the old API secret key, if configured.
    ///
    /// This is used during key rotation to verify delivery signatures
    /// created with the previous secret key.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the Admin API host override, if configured.
    #[must_use]
    pub const fn host(&self) -> Option<&HostUrl> {
        self.host.as_ref()
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify SyncConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SyncConfig>();
};

/// Builder for constructing [`SyncConfig`] instances.
///
/// This builder provides a fluent API for configuration. The only required
/// field is `api_secret_key`. All other fields have sensible defaults.
///
/// # Defaults
///
/// - `api_version`: Latest stable version
/// - `host`: `None` (requests go to the shop's own domain)
/// - `user_agent_prefix`: `None`
/// - `old_api_secret_key`: `None`
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::{SyncConfig, ApiSecretKey, ApiVersion, HostUrl};
///
/// let config = SyncConfig::builder()
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .api_version(ApiVersion::V2024_10)
///     .host(HostUrl::new("https://proxy.example.com").unwrap())
///     .user_agent_prefix("MyApp/1.0")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    host: Option<HostUrl>,
    api_version: Option<ApiVersion>,
    user_agent_prefix: Option<String>,
}

impl SyncConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the old API secret key for key rotation support.
    ///
    /// When verifying delivery signatures, the primary secret key is tried
    /// first, then this old key if verification fails. This keeps deliveries
    /// signed with the previous secret verifiable during rotation.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shopify_webhook_sync::{SyncConfig, ApiSecretKey};
    ///
    /// // During key rotation, configure both keys
    /// let config = SyncConfig::builder()
    ///     .api_secret_key(ApiSecretKey::new("new-secret").unwrap())
    ///     .old_api_secret_key(ApiSecretKey::new("old-secret").unwrap())
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the Admin API host override.
    ///
    /// When set, requests go to this URL (scheme and port preserved) instead
    /// of `https://{shop}.myshopify.com`. Useful for proxies and local mock
    /// servers.
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`SyncConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_secret_key` is
    /// not set.
    pub fn build(self) -> Result<SyncConfig, ConfigError> {
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;

        Ok(SyncConfig {
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            host: self.host,
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_api_secret_key() {
        let result = SyncConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "api_secret_key"
            })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = SyncConfig::builder()
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .build()
            .unwrap();

        assert_eq!(config.api_version(), &ApiVersion::latest());
        assert!(config.host().is_none());
        assert!(config.user_agent_prefix().is_none());
        assert!(config.old_api_secret_key().is_none());
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncConfig>();
    }

    #[test]
    fn test_config_is_clone_and_debug() {
        let config = SyncConfig::builder()
            .api_secret_key(ApiSecretKey::new("hush-7f2a9c").unwrap())
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(
            cloned.api_secret_key().as_ref(),
            config.api_secret_key().as_ref()
        );

        // Debug must not leak the secret value
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("SyncConfig"));
        assert!(!debug_str.contains("hush-7f2a9c"));
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let host = HostUrl::new("https://proxy.example.com").unwrap();

        let config = SyncConfig::builder()
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .host(host.clone())
            .api_version(ApiVersion::V2024_10)
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();

        assert_eq!(config.api_version(), &ApiVersion::V2024_10);
        assert_eq!(config.host(), Some(&host));
        assert_eq!(config.user_agent_prefix(), Some("MyApp/1.0"));
    }

    #[test]
    fn test_old_api_secret_key_configuration() {
        let config = SyncConfig::builder()
            .api_secret_key(ApiSecretKey::new("new-secret").unwrap())
            .old_api_secret_key(ApiSecretKey::new("old-secret").unwrap())
            .build()
            .unwrap();

        assert!(config.old_api_secret_key().is_some());
        assert_eq!(config.old_api_secret_key().unwrap().as_ref(), "old-secret");
    }

    #[test]
    fn test_old_api_secret_key_is_optional() {
        let config = SyncConfig::builder()
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .build()
            .unwrap();

        assert!(config.old_api_secret_key().is_none());
    }
}
