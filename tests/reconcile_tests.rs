//! Integration tests for webhook subscription reconciliation.
//!
//! Each test stands up a mock Admin API, seeds it with a registered state,
//! runs a reconciliation pass, and asserts on both the returned report and
//! the mutations the server actually received.

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopify_webhook_sync::{
    ApiSecretKey, ApiVersion, GraphqlClient, GraphqlError, HostUrl, Session, ShopDomain,
    SyncConfig, WebhookReconciler, WebhookSpec, WebhookTopic,
};

fn graphql_path() -> String {
    format!("/admin/api/{}/graphql.json", ApiVersion::latest())
}

/// Builds a reconciler whose client targets the given mock server.
fn reconciler_for(mock_server: &MockServer) -> WebhookReconciler {
    let session = Session::new(
        ShopDomain::new("test-shop").unwrap(),
        "test-token".to_string(),
        None,
    );
    let config = SyncConfig::builder()
        .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
        .host(HostUrl::new(&mock_server.uri()).unwrap())
        .build()
        .unwrap();
    WebhookReconciler::with_client(GraphqlClient::new(&session, Some(&config)))
}

fn gid(n: u64) -> String {
    format!("gid://shopify/WebhookSubscription/{n}")
}

/// A `webhookSubscriptions` node with an HTTP endpoint.
fn http_node(id: &str, topic: &str, callback_url: &str) -> Value {
    json!({
        "node": {
            "id": id,
            "topic": topic,
            "endpoint": {
                "__typename": "WebhookHttpEndpoint",
                "callbackUrl": callback_url
            }
        }
    })
}

/// A single-page `webhookSubscriptions` response body.
fn subscriptions_page(edges: Vec<Value>, end_cursor: Option<&str>) -> Value {
    json!({
        "data": {
            "webhookSubscriptions": {
                "pageInfo": {
                    "hasNextPage": end_cursor.is_some(),
                    "endCursor": end_cursor
                },
                "edges": edges
            }
        }
    })
}

fn create_success(id: &str) -> Value {
    json!({
        "data": {
            "webhookSubscriptionCreate": {
                "webhookSubscription": { "id": id },
                "userErrors": []
            }
        }
    })
}

fn update_success(id: &str) -> Value {
    json!({
        "data": {
            "webhookSubscriptionUpdate": {
                "webhookSubscription": { "id": id },
                "userErrors": []
            }
        }
    })
}

fn delete_success(id: &str) -> Value {
    json!({
        "data": {
            "webhookSubscriptionDelete": {
                "deletedWebhookSubscriptionId": id,
                "userErrors": []
            }
        }
    })
}

/// Mounts the registered-subscriptions query mock for a single page.
async fn mount_fetch(mock_server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("query RegisteredWebhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

// ============================================================================
// Create Scenarios
// ============================================================================

#[tokio::test]
async fn test_creates_all_subscriptions_when_none_registered() {
    let mock_server = MockServer::start().await;

    mount_fetch(&mock_server, subscriptions_page(vec![], None)).await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation CreateWebhookSubscription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_success(&gid(1))))
        .expect(2)
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let desired = vec![
        WebhookSpec::new(WebhookTopic::OrdersCreate, "https://app.example.com/hooks"),
        WebhookSpec::new(WebhookTopic::AppUninstalled, "https://app.example.com/hooks"),
    ];

    let report = reconciler.reconcile(&desired).await.unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.updated, 0);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.unchanged, 0);
    assert!(report.is_success());
    assert_eq!(report.total_applied(), 2);
}

#[tokio::test]
async fn test_create_sends_topic_and_uri_variables() {
    let mock_server = MockServer::start().await;

    mount_fetch(&mock_server, subscriptions_page(vec![], None)).await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation CreateWebhookSubscription"))
        .and(body_partial_json(json!({
            "variables": {
                "topic": "ORDERS_CREATE",
                "webhookSubscription": { "uri": "https://app.example.com/hooks/orders" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_success(&gid(1))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let desired = vec![WebhookSpec::new(
        WebhookTopic::OrdersCreate,
        "https://app.example.com/hooks/orders",
    )];

    let report = reconciler.reconcile(&desired).await.unwrap();
    assert_eq!(report.created, 1);
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
async fn test_reconcile_is_idempotent_when_already_in_sync() {
    let mock_server = MockServer::start().await;

    mount_fetch(
        &mock_server,
        subscriptions_page(
            vec![
                http_node(&gid(1), "ORDERS_CREATE", "https://app.example.com/hooks"),
                http_node(&gid(2), "APP_UNINSTALLED", "https://app.example.com/hooks"),
            ],
            None,
        ),
    )
    .await;

    // No mutation of any kind may be issued
    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let desired = vec![
        WebhookSpec::new(WebhookTopic::OrdersCreate, "https://app.example.com/hooks"),
        WebhookSpec::new(WebhookTopic::AppUninstalled, "https://app.example.com/hooks"),
    ];

    let report = reconciler.reconcile(&desired).await.unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(report.updated, 0);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.unchanged, 2);
    assert!(report.is_success());
    assert_eq!(report.total_applied(), 0);
}

// ============================================================================
// Update Scenarios
// ============================================================================

#[tokio::test]
async fn test_changed_address_produces_update_not_recreate() {
    let mock_server = MockServer::start().await;

    mount_fetch(
        &mock_server,
        subscriptions_page(
            vec![http_node(
                &gid(7),
                "ORDERS_CREATE",
                "https://old.example.com/hooks",
            )],
            None,
        ),
    )
    .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation UpdateWebhookSubscription"))
        .and(body_partial_json(json!({
            "variables": {
                "id": gid(7),
                "webhookSubscription": { "uri": "https://new.example.com/hooks" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(update_success(&gid(7))))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation CreateWebhookSubscription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_success(&gid(99))))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation DeleteWebhookSubscription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(delete_success(&gid(7))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let desired = vec![WebhookSpec::new(
        WebhookTopic::OrdersCreate,
        "https://new.example.com/hooks",
    )];

    let report = reconciler.reconcile(&desired).await.unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.created, 0);
    assert_eq!(report.deleted, 0);
}

#[tokio::test]
async fn test_non_http_endpoint_address_is_treated_as_empty() {
    let mock_server = MockServer::start().await;

    // An EventBridge subscription has no callbackUrl, so any desired HTTP
    // address for the same topic differs and forces an update.
    mount_fetch(
        &mock_server,
        subscriptions_page(
            vec![json!({
                "node": {
                    "id": gid(3),
                    "topic": "ORDERS_CREATE",
                    "endpoint": { "__typename": "WebhookEventBridgeEndpoint" }
                }
            })],
            None,
        ),
    )
    .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation UpdateWebhookSubscription"))
        .and(body_partial_json(json!({ "variables": { "id": gid(3) } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(update_success(&gid(3))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let desired = vec![WebhookSpec::new(
        WebhookTopic::OrdersCreate,
        "https://app.example.com/hooks",
    )];

    let report = reconciler.reconcile(&desired).await.unwrap();
    assert_eq!(report.updated, 1);
}

// ============================================================================
// Delete Scenarios
// ============================================================================

#[tokio::test]
async fn test_empty_desired_set_deletes_everything() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("query RegisteredWebhooks"))
        .and(body_partial_json(json!({ "variables": { "after": null } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscriptions_page(
            vec![
                http_node(&gid(1), "ORDERS_CREATE", "https://app.example.com/hooks"),
                http_node(&gid(2), "APP_UNINSTALLED", "https://app.example.com/hooks"),
            ],
            Some("cursor-1"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("query RegisteredWebhooks"))
        .and(body_partial_json(json!({ "variables": { "after": "cursor-1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscriptions_page(
            vec![
                http_node(&gid(3), "PRODUCTS_UPDATE", "https://app.example.com/hooks"),
                http_node(&gid(4), "SHOP_UPDATE", "https://app.example.com/hooks"),
            ],
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation DeleteWebhookSubscription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(delete_success(&gid(1))))
        .expect(4)
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let report = reconciler.reconcile(&[]).await.unwrap();

    assert_eq!(report.deleted, 4);
    assert_eq!(report.created, 0);
    assert_eq!(report.unchanged, 0);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_subscription_repeated_across_pages_is_deleted_once() {
    let mock_server = MockServer::start().await;

    // gid(2) appears on both pages; it must be counted once
    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("query RegisteredWebhooks"))
        .and(body_partial_json(json!({ "variables": { "after": null } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscriptions_page(
            vec![
                http_node(&gid(1), "ORDERS_CREATE", "https://app.example.com/hooks"),
                http_node(&gid(2), "APP_UNINSTALLED", "https://app.example.com/hooks"),
            ],
            Some("cursor-1"),
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("query RegisteredWebhooks"))
        .and(body_partial_json(json!({ "variables": { "after": "cursor-1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscriptions_page(
            vec![
                http_node(&gid(2), "APP_UNINSTALLED", "https://app.example.com/hooks"),
                http_node(&gid(3), "PRODUCTS_UPDATE", "https://app.example.com/hooks"),
            ],
            None,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation DeleteWebhookSubscription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(delete_success(&gid(1))))
        .expect(3)
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let report = reconciler.reconcile(&[]).await.unwrap();

    assert_eq!(report.deleted, 3);
}

#[tokio::test]
async fn test_duplicate_topic_registrations_keep_first_delete_rest() {
    let mock_server = MockServer::start().await;

    // Two registrations for ORDERS_CREATE; the first matches the desired
    // address, so only the second may be deleted.
    mount_fetch(
        &mock_server,
        subscriptions_page(
            vec![
                http_node(&gid(1), "ORDERS_CREATE", "https://app.example.com/hooks"),
                http_node(&gid(2), "ORDERS_CREATE", "https://stale.example.com/hooks"),
            ],
            None,
        ),
    )
    .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation DeleteWebhookSubscription"))
        .and(body_partial_json(json!({ "variables": { "id": gid(2) } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(delete_success(&gid(2))))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation DeleteWebhookSubscription"))
        .and(body_partial_json(json!({ "variables": { "id": gid(1) } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(delete_success(&gid(1))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let desired = vec![WebhookSpec::new(
        WebhookTopic::OrdersCreate,
        "https://app.example.com/hooks",
    )];

    let report = reconciler.reconcile(&desired).await.unwrap();

    assert_eq!(report.unchanged, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.created, 0);
    assert_eq!(report.updated, 0);
    assert!(report.is_success());
}

// ============================================================================
// Failure Handling
// ============================================================================

#[tokio::test]
async fn test_one_failed_operation_does_not_stop_the_rest() {
    let mock_server = MockServer::start().await;

    mount_fetch(&mock_server, subscriptions_page(vec![], None)).await;

    for topic in ["ORDERS_CREATE", "APP_UNINSTALLED"] {
        Mock::given(method("POST"))
            .and(path(graphql_path()))
            .and(body_string_contains("mutation CreateWebhookSubscription"))
            .and(body_partial_json(json!({ "variables": { "topic": topic } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_success(&gid(1))))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation CreateWebhookSubscription"))
        .and(body_partial_json(
            json!({ "variables": { "topic": "PRODUCTS_UPDATE" } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "webhookSubscriptionCreate": {
                    "webhookSubscription": null,
                    "userErrors": [{
                        "field": ["webhookSubscription", "uri"],
                        "message": "Address is not allowed"
                    }]
                }
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let desired = vec![
        WebhookSpec::new(WebhookTopic::OrdersCreate, "https://app.example.com/hooks"),
        WebhookSpec::new(WebhookTopic::ProductsUpdate, "https://app.example.com/hooks"),
        WebhookSpec::new(WebhookTopic::AppUninstalled, "https://app.example.com/hooks"),
    ];

    let report = reconciler.reconcile(&desired).await.unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(!report.is_success());

    let failure = &report.failures[0];
    assert_eq!(failure.operation.kind(), "create");
    assert_eq!(failure.operation.topic(), &WebhookTopic::ProductsUpdate);
    assert!(matches!(failure.error, GraphqlError::UserError(_)));
}

#[tokio::test]
async fn test_fetch_failure_aborts_before_any_mutation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("query RegisteredWebhooks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("mutation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let desired = vec![WebhookSpec::new(
        WebhookTopic::OrdersCreate,
        "https://app.example.com/hooks",
    )];

    let error = reconciler.reconcile(&desired).await.unwrap_err();
    assert!(matches!(error.source, GraphqlError::Connection(_)));
}

#[tokio::test]
async fn test_throttled_fetch_surfaces_too_many_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("query RegisteredWebhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{
                "message": "Throttled",
                "extensions": { "code": "THROTTLED" }
            }]
        })))
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let desired = vec![WebhookSpec::new(
        WebhookTopic::OrdersCreate,
        "https://app.example.com/hooks",
    )];

    let error = reconciler.reconcile(&desired).await.unwrap_err();
    assert!(matches!(error.source, GraphqlError::TooManyRequests(_)));
    assert!(error
        .to_string()
        .contains("Failed to fetch registered webhook subscriptions"));
}

#[tokio::test]
async fn test_missing_end_cursor_with_more_pages_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_string_contains("query RegisteredWebhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "webhookSubscriptions": {
                    "pageInfo": { "hasNextPage": true, "endCursor": null },
                    "edges": []
                }
            }
        })))
        .mount(&mock_server)
        .await;

    let reconciler = reconciler_for(&mock_server);
    let error = reconciler.reconcile(&[]).await.unwrap_err();

    assert!(matches!(error.source, GraphqlError::Connection(_)));
    assert!(error.to_string().contains("end cursor"));
}

// ============================================================================
// Fetch Pagination
// ============================================================================

#[tokio::test]
async fn test_fetch_registered_walks_all_pages_in_order() {
    use shopify_webhook_sync::fetch_registered;

    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_partial_json(json!({ "variables": { "after": null } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscriptions_page(
            vec![
                http_node(&gid(1), "ORDERS_CREATE", "https://app.example.com/a"),
                http_node(&gid(2), "APP_UNINSTALLED", "https://app.example.com/b"),
            ],
            Some("cursor-1"),
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(graphql_path()))
        .and(body_partial_json(json!({ "variables": { "after": "cursor-1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscriptions_page(
            vec![http_node(&gid(3), "SHOP_UPDATE", "https://app.example.com/c")],
            None,
        )))
        .mount(&mock_server)
        .await;

    let session = Session::new(
        ShopDomain::new("test-shop").unwrap(),
        "test-token".to_string(),
        None,
    );
    let config = SyncConfig::builder()
        .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
        .host(HostUrl::new(&mock_server.uri()).unwrap())
        .build()
        .unwrap();
    let client = GraphqlClient::new(&session, Some(&config));

    let registered = fetch_registered(&client).await.unwrap();

    assert_eq!(registered.len(), 3);
    assert_eq!(registered[0].id, gid(1));
    assert_eq!(registered[0].topic, WebhookTopic::OrdersCreate);
    assert_eq!(registered[1].id, gid(2));
    assert_eq!(registered[2].id, gid(3));
    assert_eq!(registered[2].address, "https://app.example.com/c");
}
