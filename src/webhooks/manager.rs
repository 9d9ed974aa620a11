//! Webhook subscription reconciliation.
//!
//! This module drives the full sync: fetch what is registered, diff against
//! the desired set, and apply the resulting plan one mutation at a time.
//!
//! # Phases
//!
//! Reconciliation runs through fixed phases: fetch, diff, apply, done. The
//! fetch phase is all-or-nothing; if it fails, nothing has been mutated and
//! [`ReconciliationError`] is returned. Once the apply phase starts, each
//! operation stands alone: a failed create does not stop the remaining
//! updates and deletes, and every failure is recorded in the report.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_webhook_sync::webhooks::{WebhookReconciler, WebhookSpec, WebhookTopic};
//! use shopify_webhook_sync::{Session, ShopDomain};
//!
//! let session = Session::new(
//!     ShopDomain::new("my-store").unwrap(),
//!     "access-token".to_string(),
//!     None,
//! );
//!
//! let desired = vec![
//!     WebhookSpec::new(WebhookTopic::OrdersCreate, "https://example.com/orders"),
//!     WebhookSpec::new(WebhookTopic::AppUninstalled, "https://example.com/uninstall"),
//! ];
//!
//! let reconciler = WebhookReconciler::new(&session, None);
//! let report = reconciler.reconcile(&desired).await?;
//!
//! if !report.is_success() {
//!     for failure in &report.failures {
//!         eprintln!("{} {} failed: {}", failure.operation.kind(),
//!             failure.operation.topic(), failure.error);
//!     }
//! }
//! ```

use serde::Deserialize;

use crate::clients::graphql::{ConnectionError, GraphqlClient, GraphqlError};
use crate::config::SyncConfig;
use crate::session::Session;
use crate::webhooks::diff::diff;
use crate::webhooks::errors::ReconciliationError;
use crate::webhooks::fetch::fetch_registered;
use crate::webhooks::{RegisteredWebhook, WebhookSpec, WebhookTopic};

const CREATE_MUTATION: &str = "\
mutation CreateWebhookSubscription($topic: WebhookSubscriptionTopic!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionCreate(topic: $topic, webhookSubscription: $webhookSubscription) {
    webhookSubscription {
      id
    }
    userErrors {
      field
      message
    }
  }
}";

const UPDATE_MUTATION: &str = "\
mutation UpdateWebhookSubscription($id: ID!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionUpdate(id: $id, webhookSubscription: $webhookSubscription) {
    webhookSubscription {
      id
    }
    userErrors {
      field
      message
    }
  }
}";

const DELETE_MUTATION: &str = "\
mutation DeleteWebhookSubscription($id: ID!) {
  webhookSubscriptionDelete(id: $id) {
    deletedWebhookSubscriptionId
    userErrors {
      field
      message
    }
  }
}";

#[derive(Debug, Deserialize)]
struct SubscriptionRef {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MutationPayload {
    webhook_subscription: Option<SubscriptionRef>,
    deleted_webhook_subscription_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateData {
    webhook_subscription_create: Option<MutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateData {
    webhook_subscription_update: Option<MutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteData {
    webhook_subscription_delete: Option<MutationPayload>,
}

/// One mutation in the apply phase.
///
/// Used in [`ApplyFailure`] to report which operation failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookOperation {
    /// Create a subscription for a topic with no registered counterpart.
    Create(WebhookSpec),
    /// Point an existing subscription at a new address.
    Update {
        /// The subscription as currently registered.
        current: RegisteredWebhook,
        /// The desired state for the same topic.
        desired: WebhookSpec,
    },
    /// Remove a subscription that is duplicated or no longer desired.
    Delete(RegisteredWebhook),
}

impl WebhookOperation {
    /// Returns the operation kind as a short name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete(_) => "delete",
        }
    }

    /// Returns the topic this operation acts on.
    #[must_use]
    pub const fn topic(&self) -> &WebhookTopic {
        match self {
            Self::Create(spec) => &spec.topic,
            Self::Update { desired, .. } => &desired.topic,
            Self::Delete(registration) => &registration.topic,
        }
    }
}

/// A single failed operation from the apply phase.
#[derive(Debug)]
pub struct ApplyFailure {
    /// The operation that failed.
    pub operation: WebhookOperation,
    /// The error the operation failed with.
    pub error: GraphqlError,
}

/// The outcome of one reconciliation run.
///
/// Counts cover the operations that succeeded plus the subscriptions that
/// needed no change. Failed operations appear in `failures` with the error
/// each one hit.
#[derive(Debug, Default)]
pub struct ReconciliationReport {
    /// Subscriptions created.
    pub created: usize,
    /// Subscriptions updated to a new address.
    pub updated: usize,
    /// Subscriptions deleted.
    pub deleted: usize,
    /// Desired subscriptions that were already correct.
    pub unchanged: usize,
    /// Operations that failed, in apply order.
    pub failures: Vec<ApplyFailure>,
}

impl ReconciliationReport {
    /// Returns `true` when every planned operation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the number of successful mutations in this run.
    #[must_use]
    pub const fn total_applied(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

/// Reconciles webhook subscriptions against a desired set.
///
/// The reconciler owns a [`GraphqlClient`] and can be reused across runs;
/// each call to [`reconcile`](Self::reconcile) fetches a fresh snapshot.
///
/// # Thread Safety
///
/// `WebhookReconciler` is `Send + Sync`, making it safe to share across
/// async tasks.
#[derive(Debug)]
pub struct WebhookReconciler {
    client: GraphqlClient,
}

// Verify WebhookReconciler is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<WebhookReconciler>();
};

impl WebhookReconciler {
    /// Creates a reconciler for the given session.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new(session: &Session, config: Option<&SyncConfig>) -> Self {
        Self {
            client: GraphqlClient::new(session, config),
        }
    }

    /// Creates a reconciler around an existing client.
    ///
    /// Useful when the client needs an API version override.
    #[must_use]
    pub const fn with_client(client: GraphqlClient) -> Self {
        Self { client }
    }

    /// Returns the underlying GraphQL client.
    #[must_use]
    pub const fn client(&self) -> &GraphqlClient {
        &self.client
    }

    /// Brings the registered webhook subscriptions in line with `desired`.
    ///
    /// Fetches the full registered set, diffs it against `desired`, and
    /// applies the plan: creates first, then updates, then deletes. Running
    /// the same desired set twice in a row performs no mutations on the
    /// second run.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError`] only when the registered set cannot
    /// be fetched; in that case nothing has been changed. Failures while
    /// applying individual operations do not abort the run and are returned
    /// inside the [`ReconciliationReport`].
    pub async fn reconcile(
        &self,
        desired: &[WebhookSpec],
    ) -> Result<ReconciliationReport, ReconciliationError> {
        tracing::debug!("fetching registered webhook subscriptions");
        let registered = fetch_registered(&self.client).await?;

        tracing::debug!(
            registered = registered.len(),
            desired = desired.len(),
            "diffing webhook subscriptions"
        );
        let plan = diff(desired, &registered);

        let mut report = ReconciliationReport {
            unchanged: plan.unchanged,
            ..ReconciliationReport::default()
        };

        if plan.is_empty() {
            tracing::debug!(unchanged = report.unchanged, "webhook subscriptions already in sync");
            return Ok(report);
        }

        tracing::debug!(
            create = plan.to_create.len(),
            update = plan.to_update.len(),
            delete = plan.to_delete.len(),
            "applying webhook operations"
        );

        for spec in plan.to_create {
            match self.create_subscription(&spec).await {
                Ok(id) => {
                    tracing::debug!(topic = %spec.topic, %id, "created webhook subscription");
                    report.created += 1;
                }
                Err(error) => {
                    tracing::warn!(topic = %spec.topic, %error, "failed to create webhook subscription");
                    report.failures.push(ApplyFailure {
                        operation: WebhookOperation::Create(spec),
                        error,
                    });
                }
            }
        }

        for update in plan.to_update {
            match self
                .update_subscription(&update.current.id, &update.desired)
                .await
            {
                Ok(id) => {
                    tracing::debug!(topic = %update.desired.topic, %id, "updated webhook subscription");
                    report.updated += 1;
                }
                Err(error) => {
                    tracing::warn!(topic = %update.desired.topic, %error, "failed to update webhook subscription");
                    report.failures.push(ApplyFailure {
                        operation: WebhookOperation::Update {
                            current: update.current,
                            desired: update.desired,
                        },
                        error,
                    });
                }
            }
        }

        for registration in plan.to_delete {
            match self.delete_subscription(&registration.id).await {
                Ok(id) => {
                    tracing::debug!(topic = %registration.topic, %id, "deleted webhook subscription");
                    report.deleted += 1;
                }
                Err(error) => {
                    tracing::warn!(topic = %registration.topic, %error, "failed to delete webhook subscription");
                    report.failures.push(ApplyFailure {
                        operation: WebhookOperation::Delete(registration),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            unchanged = report.unchanged,
            failures = report.failures.len(),
            "webhook reconciliation finished"
        );

        Ok(report)
    }

    /// Creates a subscription and returns its id.
    async fn create_subscription(&self, spec: &WebhookSpec) -> Result<String, GraphqlError> {
        let variables = serde_json::json!({
            "topic": spec.topic.as_graphql(),
            "webhookSubscription": { "uri": spec.address },
        });

        let response = self
            .client
            .execute(CREATE_MUTATION, Some(variables), None)
            .await?;
        let data: CreateData = response.decode_data()?;

        data.webhook_subscription_create
            .and_then(|payload| payload.webhook_subscription)
            .map(|subscription| subscription.id)
            .ok_or_else(|| missing_payload("webhookSubscriptionCreate"))
    }

    /// Points an existing subscription at a new address and returns its id.
    async fn update_subscription(
        &self,
        id: &str,
        spec: &WebhookSpec,
    ) -> Result<String, GraphqlError> {
        let variables = serde_json::json!({
            "id": id,
            "webhookSubscription": { "uri": spec.address },
        });

        let response = self
            .client
            .execute(UPDATE_MUTATION, Some(variables), None)
            .await?;
        let data: UpdateData = response.decode_data()?;

        data.webhook_subscription_update
            .and_then(|payload| payload.webhook_subscription)
            .map(|subscription| subscription.id)
            .ok_or_else(|| missing_payload("webhookSubscriptionUpdate"))
    }

    /// Deletes a subscription and returns the deleted id.
    async fn delete_subscription(&self, id: &str) -> Result<String, GraphqlError> {
        let variables = serde_json::json!({ "id": id });

        let response = self
            .client
            .execute(DELETE_MUTATION, Some(variables), None)
            .await?;
        let data: DeleteData = response.decode_data()?;

        data.webhook_subscription_delete
            .and_then(|payload| payload.deleted_webhook_subscription_id)
            .ok_or_else(|| missing_payload("webhookSubscriptionDelete"))
    }
}

/// Error for a 2xx mutation response that carries neither a payload nor a
/// user error.
fn missing_payload(mutation: &str) -> GraphqlError {
    ConnectionError {
        code: None,
        message: format!("Mutation {mutation} returned no subscription payload"),
        error_reference: None,
    }
    .into()
}
