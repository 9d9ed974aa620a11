//! Webhook signature verification.
//!
//! This module provides functions and types for verifying HMAC signatures on
//! incoming webhook requests from Shopify.
//!
//! # Overview
//!
//! Shopify signs webhook requests using HMAC-SHA256 with the app's API secret key.
//! This module provides both high-level and low-level verification functions:
//!
//! - [`verify_webhook`]: High-level function that uses [`SyncConfig`] and supports key rotation
//! - [`verify_hmac`]: Low-level function for custom integrations
//!
//! # Example
//!
//! ```rust
//! use shopify_webhook_sync::webhooks::{
//!     compute_signature_base64, verify_webhook, WebhookRequest,
//! };
//! use shopify_webhook_sync::{ApiSecretKey, SyncConfig};
//!
//! // Create a config with the API secret
//! let config = SyncConfig::builder()
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! // Compute a valid HMAC for testing
//! let body = b"webhook payload";
//! let hmac = compute_signature_base64(body, "my-secret");
//!
//! // Create a webhook request
//! let request = WebhookRequest::new(
//!     body.to_vec(),
//!     hmac,
//!     Some("orders/create".to_string()),
//!     Some("example.myshopify.com".to_string()),
//!     Some("2025-10".to_string()),
//!     Some("webhook-123".to_string()),
//! );
//!
//! // Verify the webhook
//! let context = verify_webhook(&config, &request).expect("verification failed");
//! assert_eq!(context.shop_domain(), Some("example.myshopify.com"));
//! ```
//!
//! # Security
//!
//! All HMAC comparisons use constant-time comparison to prevent timing attacks.
//! The high-level verification function also supports key rotation by trying
//! the primary secret key first, then falling back to the old secret key.

use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::SyncConfig;
use crate::webhooks::{WebhookError, WebhookTopic};

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// Header Constants
// ============================================================================

/// HTTP header name for the HMAC-SHA256 signature.
///
/// Shopify includes this header in all webhook requests. The value is a
/// base64-encoded HMAC-SHA256 signature of the request body.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-SHA256";

/// HTTP header name for the webhook topic.
///
/// Contains the topic string (e.g., "orders/create") that identifies
/// what event triggered the webhook.
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";

/// HTTP header name for the shop domain.
///
/// Contains the myshopify.com domain of the shop that triggered the webhook
/// (e.g., "example.myshopify.com").
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";

/// HTTP header name for the API version.
///
/// Contains the API version used for the webhook payload format
/// (e.g., "2025-10").
pub const HEADER_API_VERSION: &str = "X-Shopify-API-Version";

/// HTTP header name for the webhook ID.
///
/// Contains a unique identifier for the webhook delivery, useful for
/// idempotency and debugging.
pub const HEADER_WEBHOOK_ID: &str = "X-Shopify-Webhook-Id";

// ============================================================================
// WebhookRequest
// ============================================================================

/// Represents an incoming webhook request from Shopify.
///
/// This struct holds the raw request body and headers needed for verification.
/// The body is stored as raw bytes to preserve the exact payload for HMAC computation.
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::webhooks::WebhookRequest;
///
/// let request = WebhookRequest::new(
///     b"raw body bytes".to_vec(),
///     "hmac-signature".to_string(),
///     Some("orders/create".to_string()),
///     Some("example.myshopify.com".to_string()),
///     Some("2025-10".to_string()),
///     Some("webhook-123".to_string()),
/// );
///
/// assert_eq!(request.body(), b"raw body bytes");
/// assert_eq!(request.hmac_header(), "hmac-signature");
/// ```
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    /// Raw request body as bytes.
    body: Vec<u8>,
    /// HMAC signature from the X-Shopify-Hmac-SHA256 header.
    hmac_header: String,
    /// Webhook topic from the X-Shopify-Topic header.
    topic: Option<String>,
    /// Shop domain from the X-Shopify-Shop-Domain header.
    shop_domain: Option<String>,
    /// API version from the X-Shopify-API-Version header.
    api_version: Option<String>,
    /// Webhook ID from the X-Shopify-Webhook-Id header.
    webhook_id: Option<String>,
}

impl WebhookRequest {
    /// Creates a new webhook request with the given body and headers.
    ///
    /// # Arguments
    ///
    /// * `body` - Raw request body as bytes
    /// * `hmac_header` - Value of the X-Shopify-Hmac-SHA256 header
    /// * `topic` - Value of the X-Shopify-Topic header (optional)
    /// * `shop_domain` - Value of the X-Shopify-Shop-Domain header (optional)
    /// * `api_version` - Value of the X-Shopify-API-Version header (optional)
    /// * `webhook_id` - Value of the X-Shopify-Webhook-Id header (optional)
    #[must_use]
    pub fn new(
        body: Vec<u8>,
        hmac_header: String,
        topic: Option<String>,
        shop_domain: Option<String>,
        api_version: Option<String>,
        webhook_id: Option<String>,
    ) -> Self {
        Self {
            body,
            hmac_header,
            topic,
            shop_domain,
            api_version,
            webhook_id,
        }
    }

    /// Returns the raw request body as a byte slice.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the HMAC signature header value.
    #[must_use]
    pub fn hmac_header(&self) -> &str {
        &self.hmac_header
    }

    /// Returns the topic header value, if present.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Returns the shop domain header value, if present.
    #[must_use]
    pub fn shop_domain(&self) -> Option<&str> {
        self.shop_domain.as_deref()
    }

    /// Returns the API version header value, if present.
    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Returns the webhook ID header value, if present.
    #[must_use]
    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref()
    }
}

// ============================================================================
// WebhookContext
// ============================================================================

/// Represents verified webhook metadata after successful signature verification.
///
/// This struct is returned by [`verify_webhook`] and contains the parsed headers
/// from a verified webhook request. It provides both the parsed topic (when the
/// header holds a valid topic name) and the raw topic string (always available).
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::webhooks::{
///     compute_signature_base64, verify_webhook, WebhookRequest, WebhookTopic,
/// };
/// use shopify_webhook_sync::{ApiSecretKey, SyncConfig};
///
/// let config = SyncConfig::builder()
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .build()
///     .unwrap();
///
/// let body = b"test";
/// let hmac = compute_signature_base64(body, "secret");
/// let request = WebhookRequest::new(
///     body.to_vec(),
///     hmac,
///     Some("orders/create".to_string()),
///     Some("example.myshopify.com".to_string()),
///     None,
///     None,
/// );
///
/// let context = verify_webhook(&config, &request).unwrap();
/// assert_eq!(context.topic(), Some(&WebhookTopic::OrdersCreate));
/// assert_eq!(context.topic_raw(), "orders/create");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookContext {
    /// Parsed topic (None when the header is missing or invalid).
    topic: Option<WebhookTopic>,
    /// Raw topic string from the header.
    topic_raw: String,
    /// Shop domain from the header.
    shop_domain: Option<String>,
    /// API version from the header.
    api_version: Option<String>,
    /// Webhook ID from the header.
    webhook_id: Option<String>,
}

impl WebhookContext {
    /// Creates a new webhook context.
    fn new(
        topic: Option<WebhookTopic>,
        topic_raw: String,
        shop_domain: Option<String>,
        api_version: Option<String>,
        webhook_id: Option<String>,
    ) -> Self {
        Self {
            topic,
            topic_raw,
            shop_domain,
            api_version,
            webhook_id,
        }
    }

    /// Returns the parsed webhook topic, if the header held a valid name.
    ///
    /// Unknown but well-formed topics parse to [`WebhookTopic::Custom`];
    /// `None` means the header was missing or malformed.
    #[must_use]
    pub const fn topic(&self) -> Option<&WebhookTopic> {
        self.topic.as_ref()
    }

    /// Returns the raw topic string as received in the header.
    ///
    /// This is always available, even for unknown or malformed topics.
    #[must_use]
    pub fn topic_raw(&self) -> &str {
        &self.topic_raw
    }

    /// Returns the shop domain, if present in the webhook headers.
    #[must_use]
    pub fn shop_domain(&self) -> Option<&str> {
        self.shop_domain.as_deref()
    }

    /// Returns the API version, if present in the webhook headers.
    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Returns the webhook ID, if present in the webhook headers.
    #[must_use]
    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref()
    }
}

// ============================================================================
// Verification Functions
// ============================================================================

/// Computes an HMAC-SHA256 signature for raw bytes, returning base64-encoded output.
///
/// This matches the signature format Shopify sends in the
/// `X-Shopify-Hmac-SHA256` header (RFC 4648 standard base64).
///
/// # Arguments
///
/// * `message` - The raw message bytes to sign (webhook request body)
/// * `secret` - The secret key (API secret key)
///
/// # Note
///
/// This function accepts raw bytes (not strings) to preserve the exact webhook
/// payload without UTF-8 interpretation. HMAC-SHA256 accepts keys of any length,
/// so this function will never panic.
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::webhooks::compute_signature_base64;
///
/// let body = b"webhook payload";
/// let sig = compute_signature_base64(body, "secret-key");
/// assert_eq!(sig.len(), 44); // SHA256 produces 32 bytes = 44 base64 chars
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature_base64(message: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message);
    let result = mac.finalize();
    base64::engine::general_purpose::STANDARD.encode(result.into_bytes())
}

/// Performs constant-time comparison of two strings.
///
/// This function is used for security-sensitive comparisons like HMAC
/// verification to prevent timing attacks.
///
/// # Returns
///
/// `true` if the strings are equal, `false` otherwise.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // ConstantTimeEq handles different lengths securely
    a_bytes.ct_eq(b_bytes).into()
}

/// Verifies the HMAC signature of a webhook request body.
///
/// This is a low-level function that performs HMAC verification with a single
/// secret key. For most use cases, prefer [`verify_webhook`] which supports
/// key rotation.
///
/// # Arguments
///
/// * `raw_body` - The raw request body bytes
/// * `hmac_header` - The value of the X-Shopify-Hmac-SHA256 header
/// * `secret` - The API secret key to use for verification
///
/// # Returns
///
/// `true` if the signature is valid, `false` otherwise.
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::webhooks::{compute_signature_base64, verify_hmac};
///
/// let body = b"webhook payload";
/// let secret = "my-secret-key";
/// let hmac = compute_signature_base64(body, secret);
///
/// assert!(verify_hmac(body, &hmac, secret));
/// assert!(!verify_hmac(body, "invalid", secret));
/// ```
#[must_use]
pub fn verify_hmac(raw_body: &[u8], hmac_header: &str, secret: &str) -> bool {
    let computed = compute_signature_base64(raw_body, secret);
    constant_time_compare(&computed, hmac_header)
}

/// Verifies a webhook request and returns the verified context.
///
/// This function validates the HMAC signature using the config's API secret key,
/// with automatic fallback to the old API secret key for key rotation support.
///
/// # Arguments
///
/// * `config` - The configuration containing the API secret key(s)
/// * `request` - The webhook request to verify
///
/// # Errors
///
/// Returns [`WebhookError::InvalidHmac`] if neither the primary nor the old
/// secret key verifies the signature.
///
/// # Key Rotation
///
/// If the primary `api_secret_key` fails verification, the function will
/// automatically try `old_api_secret_key` if configured. This allows seamless
/// key rotation without breaking in-flight webhooks.
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::webhooks::{
///     compute_signature_base64, verify_webhook, WebhookRequest,
/// };
/// use shopify_webhook_sync::{ApiSecretKey, SyncConfig};
///
/// let config = SyncConfig::builder()
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .build()
///     .unwrap();
///
/// let body = b"test payload";
/// let hmac = compute_signature_base64(body, "secret");
/// let request = WebhookRequest::new(
///     body.to_vec(),
///     hmac,
///     Some("orders/create".to_string()),
///     None,
///     None,
///     None,
/// );
///
/// let context = verify_webhook(&config, &request).expect("verification should succeed");
/// assert_eq!(context.topic_raw(), "orders/create");
/// ```
pub fn verify_webhook(
    config: &SyncConfig,
    request: &WebhookRequest,
) -> Result<WebhookContext, WebhookError> {
    let body = request.body();
    let hmac_header = request.hmac_header();

    // Try primary secret key first
    let mut verified = verify_hmac(body, hmac_header, config.api_secret_key().as_ref());

    // Fall back to old secret key if configured and primary fails
    if !verified {
        if let Some(old_secret) = config.old_api_secret_key() {
            verified = verify_hmac(body, hmac_header, old_secret.as_ref());
        }
    }

    if !verified {
        return Err(WebhookError::InvalidHmac);
    }

    // Parse the topic header (None when missing or malformed)
    let topic_raw = request.topic().unwrap_or("").to_string();
    let topic = topic_raw.parse::<WebhookTopic>().ok();

    Ok(WebhookContext::new(
        topic,
        topic_raw,
        request.shop_domain().map(String::from),
        request.api_version().map(String::from),
        request.webhook_id().map(String::from),
    ))
}
