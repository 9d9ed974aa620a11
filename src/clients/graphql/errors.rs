//! Error classification for GraphQL execution.
//!
//! The executor sorts every failure into one of three classes:
//!
//! - [`ConnectionError`]: transport failures, non-2xx responses, unparseable
//!   bodies, and top-level GraphQL errors with no more specific meaning.
//! - [`TooManyRequestsError`]: points-based throttling (`THROTTLED`); carries
//!   the cost block so callers can back off.
//! - [`UserError`]: mutation payload field-validation failures.
//!
//! The classes are mutually exclusive per call. The executor performs no
//! retries; a caller that wants retry-on-throttle matches
//! [`GraphqlError::TooManyRequests`] and sleeps for
//! [`TooManyRequestsError::suggested_wait`].

use std::time::Duration;

use thiserror::Error;

use crate::clients::graphql::response::ThrottleStatus;

/// Transport/HTTP-level failure or unclassified GraphQL error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConnectionError {
    /// HTTP status code, when the failure produced one.
    pub code: Option<u16>,

    /// Error message.
    pub message: String,

    /// Request id for error reporting (from the `x-request-id` header).
    pub error_reference: Option<String>,
}

impl From<reqwest::Error> for ConnectionError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            code: err.status().map(|status| status.as_u16()),
            message: format!("Network error: {err}"),
            error_reference: None,
        }
    }
}

/// The API throttled the request (points-based rate limiting).
///
/// Carries the cost block from the response so callers can derive a backoff.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct TooManyRequestsError {
    /// The server's error message (typically just `Throttled`).
    pub message: String,

    /// Points the rejected query would have cost.
    pub requested_query_cost: Option<f64>,

    /// Rate-limit bucket state at rejection time.
    pub throttle_status: Option<ThrottleStatus>,
}

impl TooManyRequestsError {
    /// Time until the bucket restores enough points to run the rejected
    /// query, derived from the restore rate.
    ///
    /// Returns `None` when the response did not carry enough cost
    /// information to compute one.
    #[must_use]
    pub fn suggested_wait(&self) -> Option<Duration> {
        let status = self.throttle_status?;
        let requested = self.requested_query_cost?;
        if status.restore_rate <= 0.0 {
            return None;
        }

        let deficit = requested - status.currently_available;
        if deficit <= 0.0 {
            return Some(Duration::ZERO);
        }
        Some(Duration::from_secs_f64(deficit / status.restore_rate))
    }
}

/// A mutation payload reported field-validation failures.
///
/// Surfaces the first entry of the payload's `userErrors` array.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (field: {})", .field.as_deref().unwrap_or("unknown"))]
pub struct UserError {
    /// Dot-joined path of the input field the server attributed the failure
    /// to, when it named one.
    pub field: Option<String>,

    /// Human-readable validation message.
    pub message: String,
}

/// Errors returned by [`GraphqlClient`](crate::GraphqlClient).
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// Transport failure, non-2xx status, or unclassified GraphQL error.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Points-based throttling; retry is the caller's decision.
    #[error(transparent)]
    TooManyRequests(#[from] TooManyRequestsError),

    /// Mutation-level field validation failure.
    #[error(transparent)]
    UserError(#[from] UserError),
}

impl From<reqwest::Error> for GraphqlError {
    fn from(err: reqwest::Error) -> Self {
        Self::Connection(err.into())
    }
}
