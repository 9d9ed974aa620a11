//! Typed GraphQL response envelope.
//!
//! This module models the Admin API's response shape
//! (`{data, errors, extensions}`) as explicit structs instead of navigating
//! raw JSON at call sites. Per-query payloads are decoded out of `data` with
//! [`GraphqlResponse::decode_data`], so missing fields surface as decode
//! errors rather than silent nulls.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::clients::graphql::errors::ConnectionError;

/// A parsed GraphQL response.
///
/// Carries the raw `data` payload plus the typed `errors` and `extensions`
/// blocks. The executor classifies errors before handing a response back, so
/// a response obtained from [`GraphqlClient::execute`] has no top-level
/// errors and no user errors.
///
/// [`GraphqlClient::execute`]: crate::GraphqlClient::execute
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphqlResponse {
    /// The `data` payload, if the server returned one.
    #[serde(default)]
    pub data: Option<Value>,

    /// Top-level GraphQL errors, in server order.
    #[serde(default)]
    pub errors: Vec<GraphqlResponseError>,

    /// The `extensions` block (query cost accounting).
    #[serde(default)]
    pub extensions: Option<ResponseExtensions>,
}

impl GraphqlResponse {
    /// Decodes the `data` payload into a typed per-query struct.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] if the payload is absent or does not match
    /// the expected shape.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, ConnectionError> {
        let data = self.data.clone().unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| ConnectionError {
            code: None,
            message: format!("Failed to decode GraphQL response data: {e}"),
            error_reference: None,
        })
    }

    /// Returns the query cost block, if the server reported one.
    #[must_use]
    pub fn cost(&self) -> Option<&QueryCost> {
        self.extensions.as_ref().and_then(|e| e.cost.as_ref())
    }

    /// Collects `userErrors` entries from every mutation payload in `data`,
    /// in payload order.
    ///
    /// Mutation payloads carry field-validation failures inline rather than
    /// as top-level errors; this scans each top-level object in `data` for a
    /// non-empty `userErrors` array.
    #[must_use]
    pub fn user_errors(&self) -> Vec<UserErrorEntry> {
        let Some(Value::Object(data)) = &self.data else {
            return Vec::new();
        };

        let mut entries = Vec::new();
        for payload in data.values() {
            let Some(Value::Array(raw)) = payload.get("userErrors") else {
                continue;
            };
            for item in raw {
                if let Ok(entry) = serde_json::from_value::<UserErrorEntry>(item.clone()) {
                    entries.push(entry);
                }
            }
        }
        entries
    }
}

/// A top-level GraphQL error.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphqlResponseError {
    /// Human-readable error message.
    pub message: String,

    /// Error extensions (`code`, `documentation`).
    #[serde(default)]
    pub extensions: Option<GraphqlErrorExtensions>,
}

impl GraphqlResponseError {
    /// Returns the machine-readable error code, if present.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref().and_then(|e| e.code.as_deref())
    }

    /// Returns the documentation link, if present.
    #[must_use]
    pub fn documentation(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|e| e.documentation.as_deref())
    }
}

/// Extensions attached to a single top-level error.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphqlErrorExtensions {
    /// Machine-readable error code (e.g. `THROTTLED`).
    #[serde(default)]
    pub code: Option<String>,

    /// Link to relevant API documentation.
    #[serde(default)]
    pub documentation: Option<String>,
}

/// The response-level `extensions` block.
#[derive(Clone, Debug, Deserialize)]
pub struct ResponseExtensions {
    /// Query cost accounting.
    #[serde(default)]
    pub cost: Option<QueryCost>,
}

/// Query cost accounting reported by the Admin API.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryCost {
    /// Points the query was estimated to cost.
    #[serde(default)]
    pub requested_query_cost: Option<f64>,

    /// Points the query actually cost, when executed.
    #[serde(default)]
    pub actual_query_cost: Option<f64>,

    /// Bucket state at the time of the request.
    #[serde(default)]
    pub throttle_status: Option<ThrottleStatus>,
}

/// Rate-limit bucket state.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleStatus {
    /// Bucket capacity in points.
    pub maximum_available: f64,

    /// Points currently available.
    pub currently_available: f64,

    /// Points restored per second.
    pub restore_rate: f64,
}

/// One entry of a mutation payload's `userErrors` array.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct UserErrorEntry {
    /// Path to the input field that failed validation, if the server
    /// attributed the error to one.
    #[serde(default)]
    pub field: Option<Vec<String>>,

    /// Human-readable validation message.
    pub message: String,
}

impl UserErrorEntry {
    /// Returns the field path joined with `.`, if present.
    #[must_use]
    pub fn field_path(&self) -> Option<String> {
        self.field.as_ref().map(|parts| parts.join("."))
    }
}
