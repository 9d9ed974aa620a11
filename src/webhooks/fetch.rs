//! Fetching the registered webhook subscriptions from Shopify.
//!
//! The reconciler needs a complete snapshot of what is currently registered
//! before it can plan any changes. This module pages through the
//! `webhookSubscriptions` connection and returns every subscription, or
//! fails without returning a partial list.

use std::collections::HashSet;

use serde::Deserialize;

use crate::clients::graphql::{ConnectionError, GraphqlClient, GraphqlError};
use crate::webhooks::{RegisteredWebhook, WebhookTopic};

/// Page size for the subscriptions connection.
const PAGE_SIZE: u32 = 100;

const REGISTERED_WEBHOOKS_QUERY: &str = "\
query RegisteredWebhooks($first: Int!, $after: String) {
  webhookSubscriptions(first: $first, after: $after) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        topic
        endpoint {
          __typename
          ... on WebhookHttpEndpoint {
            callbackUrl
          }
        }
      }
    }
  }
}";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionsData {
    webhook_subscriptions: SubscriptionConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionConnection {
    page_info: PageInfo,
    edges: Vec<SubscriptionEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionEdge {
    node: SubscriptionNode,
}

#[derive(Debug, Deserialize)]
struct SubscriptionNode {
    id: String,
    topic: String,
    #[serde(default)]
    endpoint: Option<SubscriptionEndpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionEndpoint {
    #[serde(default)]
    callback_url: Option<String>,
}

/// Fetches every registered webhook subscription.
///
/// Pages through the connection in order, following `endCursor` until
/// `hasNextPage` is false. The returned list preserves the server's listing
/// order. Subscriptions reported more than once across pages (the connection
/// is not a stable snapshot while pages are being read) are kept once, at
/// their first position.
///
/// Subscriptions delivered to a non-HTTP endpoint (EventBridge, Pub/Sub)
/// have no callback URL; their address is the empty string.
///
/// # Errors
///
/// Returns the underlying [`GraphqlError`] if any page fails to fetch or
/// decode. No partial list is ever returned: the caller either gets the
/// complete snapshot or an error.
pub async fn fetch_registered(
    client: &GraphqlClient,
) -> Result<Vec<RegisteredWebhook>, GraphqlError> {
    let mut webhooks: Vec<RegisteredWebhook> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut after: Option<String> = None;

    loop {
        let variables = serde_json::json!({ "first": PAGE_SIZE, "after": after });
        let response = client
            .execute(REGISTERED_WEBHOOKS_QUERY, Some(variables), None)
            .await?;

        let data: SubscriptionsData = response.decode_data()?;
        let connection = data.webhook_subscriptions;

        for edge in connection.edges {
            let node = edge.node;
            if !seen_ids.insert(node.id.clone()) {
                tracing::debug!(id = %node.id, "skipping webhook subscription repeated across pages");
                continue;
            }

            let topic: WebhookTopic = node.topic.parse().map_err(|_| ConnectionError {
                code: None,
                message: format!("Server returned an invalid webhook topic: '{}'", node.topic),
                error_reference: None,
            })?;

            let address = node
                .endpoint
                .and_then(|endpoint| endpoint.callback_url)
                .unwrap_or_default();

            webhooks.push(RegisteredWebhook {
                id: node.id,
                topic,
                address,
            });
        }

        if !connection.page_info.has_next_page {
            break;
        }
        match connection.page_info.end_cursor {
            Some(cursor) => after = Some(cursor),
            None => {
                return Err(ConnectionError {
                    code: None,
                    message:
                        "Server reported another page of webhook subscriptions without an end cursor"
                            .to_string(),
                    error_reference: None,
                }
                .into());
            }
        }
    }

    tracing::debug!(count = webhooks.len(), "fetched registered webhook subscriptions");
    Ok(webhooks)
}
