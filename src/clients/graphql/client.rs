//! GraphQL client for the Shopify Admin API.
//!
//! This module provides the [`GraphqlClient`] type: a single-request executor
//! that POSTs a query/variables payload to the version-scoped `graphql.json`
//! endpoint and classifies the outcome. It never retries; callers own retry
//! policy.

use std::collections::HashMap;

use serde_json::Value;

use crate::clients::graphql::errors::{
    ConnectionError, GraphqlError, TooManyRequestsError, UserError,
};
use crate::clients::graphql::response::GraphqlResponse;
use crate::config::{ApiVersion, SyncConfig};
use crate::session::Session;

/// Crate version from Cargo.toml, reported in the User-Agent header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extension code the Admin API uses for points-based throttling.
const THROTTLED_CODE: &str = "THROTTLED";

/// GraphQL executor for the Shopify Admin API.
///
/// The client handles:
/// - Endpoint construction from the session's shop domain (or a configured
///   host override, scheme and port preserved)
/// - Default headers including User-Agent and access token
/// - Response classification into connection, throttling, and user errors
///
/// It deliberately does not retry: throttling surfaces as
/// [`TooManyRequestsError`] with enough information for the caller's own
/// backoff policy.
///
/// # Thread Safety
///
/// `GraphqlClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use shopify_webhook_sync::{GraphqlClient, Session, ShopDomain};
///
/// let session = Session::new(
///     ShopDomain::new("my-store").unwrap(),
///     "access-token".to_string(),
///     None,
/// );
///
/// let client = GraphqlClient::new(&session, None);
/// let response = client.execute("query { shop { name } }", None, None).await?;
/// ```
#[derive(Debug)]
pub struct GraphqlClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Full endpoint URL (e.g. `https://my-store.myshopify.com/admin/api/2025-10/graphql.json`).
    endpoint: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// The API version being used.
    api_version: ApiVersion,
}

// Verify GraphqlClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlClient>();
};

impl GraphqlClient {
    /// Creates a new GraphQL client for the given session.
    ///
    /// Uses the API version from the configuration, or the latest stable
    /// version if no configuration is given.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    ///
    /// # Example
    ///
    /// ```rust
    /// use shopify_webhook_sync::{GraphqlClient, Session, ShopDomain};
    ///
    /// let session = Session::new(
    ///     ShopDomain::new("my-store").unwrap(),
    ///     "access-token".to_string(),
    ///     None,
    /// );
    ///
    /// let client = GraphqlClient::new(&session, None);
    /// ```
    #[must_use]
    pub fn new(session: &Session, config: Option<&SyncConfig>) -> Self {
        let api_version = config.map_or_else(ApiVersion::latest, |c| c.api_version().clone());
        Self::create_client(session, config, api_version)
    }

    /// Creates a new GraphQL client with a specific API version override.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    ///
    /// # Example
    ///
    /// ```rust
    /// use shopify_webhook_sync::{ApiVersion, GraphqlClient, Session, ShopDomain};
    ///
    /// let session = Session::new(
    ///     ShopDomain::new("my-store").unwrap(),
    ///     "access-token".to_string(),
    ///     None,
    /// );
    ///
    /// let client = GraphqlClient::with_version(&session, None, ApiVersion::V2024_10);
    /// ```
    #[must_use]
    pub fn with_version(
        session: &Session,
        config: Option<&SyncConfig>,
        version: ApiVersion,
    ) -> Self {
        if let Some(cfg_version) = config.map(SyncConfig::api_version) {
            if &version == cfg_version {
                tracing::debug!(
                    "GraphQL client has a redundant API version override to the default {}",
                    cfg_version
                );
            } else {
                tracing::debug!(
                    "GraphQL client overriding default API version {} with {}",
                    cfg_version,
                    version
                );
            }
        }

        Self::create_client(session, config, version)
    }

    /// Internal helper to create the client with shared logic.
    fn create_client(
        session: &Session,
        config: Option<&SyncConfig>,
        api_version: ApiVersion,
    ) -> Self {
        // Determine base URI - use the host override if configured, otherwise
        // the session shop. The override is used verbatim so scheme and port
        // survive (mock servers, proxies).
        let api_host = config.and_then(|c| c.host());
        let base_uri = api_host.map_or_else(
            || format!("https://{}", session.shop.as_ref()),
            |host| host.as_ref().trim_end_matches('/').to_string(),
        );
        let endpoint = format!("{base_uri}/admin/api/{api_version}/graphql.json");

        // Build User-Agent header
        let user_agent_prefix = config
            .and_then(SyncConfig::user_agent_prefix)
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!(
            "{user_agent_prefix}Shopify Webhook Sync v{SDK_VERSION} | Rust {rust_version}"
        );

        // Build default headers
        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        // Add Host header when using a host override (proxy scenario)
        if api_host.is_some() {
            default_headers.insert("Host".to_string(), session.shop.as_ref().to_string());
        }

        // Add access token header if present
        if !session.access_token.is_empty() {
            default_headers.insert(
                "X-Shopify-Access-Token".to_string(),
                session.access_token.clone(),
            );
        }

        // Create reqwest client
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint,
            default_headers,
            api_version,
        }
    }

    /// Returns the API version being used by this client.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the full GraphQL endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Executes a GraphQL request against the Admin API.
    ///
    /// Sends a single POST with body `{"query", "operationName", "variables"}`
    /// and classifies the outcome. Exactly one request goes out per call; a
    /// throttled request is not retried here.
    ///
    /// # Arguments
    ///
    /// * `query` - The GraphQL query or mutation string
    /// * `variables` - Optional variables for the query
    /// * `headers` - Optional extra headers, merged over the defaults
    ///
    /// # Errors
    ///
    /// - [`GraphqlError::Connection`] for transport failures, non-2xx
    ///   responses, unparseable bodies, and top-level GraphQL errors other
    ///   than throttling
    /// - [`GraphqlError::TooManyRequests`] when a top-level error carries the
    ///   `THROTTLED` code
    /// - [`GraphqlError::UserError`] when a mutation payload reports
    ///   non-empty `userErrors`
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use serde_json::json;
    ///
    /// let response = client.execute(
    ///     "query Subscription($id: ID!) { webhookSubscription(id: $id) { topic } }",
    ///     Some(json!({ "id": "gid://shopify/WebhookSubscription/123" })),
    ///     None,
    /// ).await?;
    /// ```
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<Value>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<GraphqlResponse, GraphqlError> {
        // Construct the request body
        let body = serde_json::json!({
            "query": query,
            "operationName": null,
            "variables": variables,
        });

        // Merge headers
        let mut merged = self.default_headers.clone();
        if let Some(extra) = headers {
            merged.extend(extra);
        }

        // Build and send the request
        let mut req_builder = self.client.post(&self.endpoint);
        for (key, value) in &merged {
            req_builder = req_builder.header(key, value);
        }
        let res = req_builder.body(body.to_string()).send().await?;

        let code = res.status().as_u16();
        let is_success = res.status().is_success();
        let request_id = res
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body_text = res.text().await.map_err(ConnectionError::from)?;

        if !is_success {
            let body_json: Value = serde_json::from_str(&body_text)
                .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }));
            return Err(ConnectionError {
                code: Some(code),
                message: Self::serialize_error(&body_json, request_id.as_deref()),
                error_reference: request_id,
            }
            .into());
        }

        let response: GraphqlResponse =
            serde_json::from_str(&body_text).map_err(|e| ConnectionError {
                code: Some(code),
                message: format!("Failed to parse GraphQL response: {e}"),
                error_reference: request_id.clone(),
            })?;

        Self::classify(response, code, request_id)
    }

    /// Sorts a parsed response into success, throttling, unclassified error,
    /// or user error. The classes are checked in that order, so they stay
    /// mutually exclusive per call.
    fn classify(
        response: GraphqlResponse,
        code: u16,
        request_id: Option<String>,
    ) -> Result<GraphqlResponse, GraphqlError> {
        if !response.errors.is_empty() {
            if let Some(throttled) = response
                .errors
                .iter()
                .find(|error| error.code() == Some(THROTTLED_CODE))
            {
                let cost = response.cost();
                return Err(TooManyRequestsError {
                    message: throttled.message.clone(),
                    requested_query_cost: cost.and_then(|c| c.requested_query_cost),
                    throttle_status: cost.and_then(|c| c.throttle_status),
                }
                .into());
            }

            let message = response
                .errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ConnectionError {
                code: Some(code),
                message,
                error_reference: request_id,
            }
            .into());
        }

        if let Some(first) = response.user_errors().into_iter().next() {
            return Err(UserError {
                field: first.field_path(),
                message: first.message,
            }
            .into());
        }

        Ok(response)
    }

    /// Serializes an error response body to JSON for the connection error
    /// message, keeping only the fields Shopify populates.
    fn serialize_error(body: &Value, request_id: Option<&str>) -> String {
        let mut error_body = serde_json::Map::new();

        if let Some(errors) = body.get("errors") {
            error_body.insert("errors".to_string(), errors.clone());
        }
        if let Some(error) = body.get("error") {
            error_body.insert("error".to_string(), error.clone());
            if let Some(desc) = body.get("error_description") {
                error_body.insert("error_description".to_string(), desc.clone());
            }
        }
        if let Some(raw) = body.get("raw_body") {
            error_body.insert("raw_body".to_string(), raw.clone());
        }

        if let Some(request_id) = request_id {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiSecretKey, HostUrl, ShopDomain};

    fn create_test_session() -> Session {
        Session::new(
            ShopDomain::new("test-shop").unwrap(),
            "test-access-token".to_string(),
            None,
        )
    }

    // === Construction Tests ===

    #[test]
    fn test_client_new_uses_latest_version() {
        let session = create_test_session();
        let client = GraphqlClient::new(&session, None);

        assert_eq!(client.api_version(), &ApiVersion::latest());
        assert_eq!(
            client.endpoint(),
            format!(
                "https://test-shop.myshopify.com/admin/api/{}/graphql.json",
                ApiVersion::latest()
            )
        );
    }

    #[test]
    fn test_client_with_version_overrides_config() {
        let session = create_test_session();
        let config = SyncConfig::builder()
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .api_version(ApiVersion::V2024_10)
            .build()
            .unwrap();

        let client = GraphqlClient::with_version(&session, Some(&config), ApiVersion::V2024_07);
        assert_eq!(client.api_version(), &ApiVersion::V2024_07);
    }

    #[test]
    fn test_client_uses_config_version() {
        let session = create_test_session();
        let config = SyncConfig::builder()
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .api_version(ApiVersion::V2024_10)
            .build()
            .unwrap();

        let client = GraphqlClient::new(&session, Some(&config));
        assert_eq!(client.api_version(), &ApiVersion::V2024_10);
        assert!(client.endpoint().contains("/admin/api/2024-10/"));
    }

    #[test]
    fn test_host_override_keeps_scheme_and_port() {
        let session = create_test_session();
        let config = SyncConfig::builder()
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .host(HostUrl::new("http://127.0.0.1:8080").unwrap())
            .build()
            .unwrap();

        let client = GraphqlClient::new(&session, Some(&config));
        assert!(client
            .endpoint()
            .starts_with("http://127.0.0.1:8080/admin/api/"));

        // Host header points at the real shop when proxying
        assert_eq!(
            client.default_headers().get("Host"),
            Some(&"test-shop.myshopify.com".to_string())
        );
    }

    #[test]
    fn test_access_token_header_injection() {
        let session = create_test_session();
        let client = GraphqlClient::new(&session, None);

        assert_eq!(
            client.default_headers().get("X-Shopify-Access-Token"),
            Some(&"test-access-token".to_string())
        );
    }

    #[test]
    fn test_no_access_token_header_when_empty() {
        let session = Session::new(ShopDomain::new("test-shop").unwrap(), String::new(), None);
        let client = GraphqlClient::new(&session, None);

        assert!(client
            .default_headers()
            .get("X-Shopify-Access-Token")
            .is_none());
    }

    #[test]
    fn test_user_agent_header_format() {
        let session = create_test_session();
        let client = GraphqlClient::new(&session, None);

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.contains("Shopify Webhook Sync v"));
        assert!(user_agent.contains("Rust"));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let session = create_test_session();
        let config = SyncConfig::builder()
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();

        let client = GraphqlClient::new(&session, Some(&config));

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("MyApp/1.0 | "));
        assert!(user_agent.contains("Shopify Webhook Sync"));
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GraphqlClient>();
    }
}
