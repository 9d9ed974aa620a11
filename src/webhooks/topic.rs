//! Webhook topic identifiers.
//!
//! Shopify spells webhook topics two ways: the GraphQL Admin API uses enum
//! names like `ORDERS_CREATE`, while webhook delivery headers use the REST
//! form `orders/create`. [`WebhookTopic`] parses both spellings into one
//! value so that a topic read from a delivery header compares equal to the
//! same topic read from a GraphQL response.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhook_sync::webhooks::WebhookTopic;
//!
//! let from_graphql: WebhookTopic = "ORDERS_CREATE".parse().unwrap();
//! let from_header: WebhookTopic = "orders/create".parse().unwrap();
//!
//! assert_eq!(from_graphql, from_header);
//! assert_eq!(from_graphql.as_graphql(), "ORDERS_CREATE");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// A webhook topic.
///
/// Known topics have dedicated variants; any other valid topic name is
/// carried as [`WebhookTopic::Custom`] with its canonical GraphQL spelling.
/// Two topics are equal when their canonical spellings are equal, regardless
/// of which input spelling produced them.
///
/// # Example
///
/// ```rust
/// use shopify_webhook_sync::webhooks::WebhookTopic;
///
/// let topic = WebhookTopic::ProductsUpdate;
/// assert_eq!(topic.as_graphql(), "PRODUCTS_UPDATE");
/// assert_eq!(topic.as_header(), "products/update");
///
/// let custom: WebhookTopic = "fulfillments/create".parse().unwrap();
/// assert_eq!(custom, WebhookTopic::Custom("FULFILLMENTS_CREATE".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WebhookTopic {
    /// `APP_UNINSTALLED` / `app/uninstalled`
    AppUninstalled,
    /// `CUSTOMERS_CREATE` / `customers/create`
    CustomersCreate,
    /// `CUSTOMERS_UPDATE` / `customers/update`
    CustomersUpdate,
    /// `CUSTOMERS_DELETE` / `customers/delete`
    CustomersDelete,
    /// `ORDERS_CREATE` / `orders/create`
    OrdersCreate,
    /// `ORDERS_UPDATED` / `orders/updated`
    OrdersUpdated,
    /// `ORDERS_CANCELLED` / `orders/cancelled`
    OrdersCancelled,
    /// `ORDERS_FULFILLED` / `orders/fulfilled`
    OrdersFulfilled,
    /// `PRODUCTS_CREATE` / `products/create`
    ProductsCreate,
    /// `PRODUCTS_UPDATE` / `products/update`
    ProductsUpdate,
    /// `PRODUCTS_DELETE` / `products/delete`
    ProductsDelete,
    /// `SHOP_UPDATE` / `shop/update`
    ShopUpdate,
    /// Any other topic, stored in canonical GraphQL spelling.
    Custom(String),
}

impl WebhookTopic {
    /// Returns the canonical GraphQL enum spelling (e.g. `ORDERS_CREATE`).
    #[must_use]
    pub fn as_graphql(&self) -> &str {
        match self {
            Self::AppUninstalled => "APP_UNINSTALLED",
            Self::CustomersCreate => "CUSTOMERS_CREATE",
            Self::CustomersUpdate => "CUSTOMERS_UPDATE",
            Self::CustomersDelete => "CUSTOMERS_DELETE",
            Self::OrdersCreate => "ORDERS_CREATE",
            Self::OrdersUpdated => "ORDERS_UPDATED",
            Self::OrdersCancelled => "ORDERS_CANCELLED",
            Self::OrdersFulfilled => "ORDERS_FULFILLED",
            Self::ProductsCreate => "PRODUCTS_CREATE",
            Self::ProductsUpdate => "PRODUCTS_UPDATE",
            Self::ProductsDelete => "PRODUCTS_DELETE",
            Self::ShopUpdate => "SHOP_UPDATE",
            Self::Custom(name) => name,
        }
    }

    /// Returns the delivery header spelling (e.g. `orders/create`).
    ///
    /// The first underscore separates the resource from the event, matching
    /// the `X-Shopify-Topic` header format.
    #[must_use]
    pub fn as_header(&self) -> String {
        let graphql = self.as_graphql().to_ascii_lowercase();
        match graphql.split_once('_') {
            Some((resource, event)) => format!("{resource}/{event}"),
            None => graphql,
        }
    }

    /// Returns `true` when every character is valid in a GraphQL topic name.
    fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    }
}

impl fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_graphql())
    }
}

impl FromStr for WebhookTopic {
    type Err = ConfigError;

    /// Parses a topic from either spelling.
    ///
    /// `orders/create`, `ORDERS_CREATE`, and `orders_create` all parse to
    /// [`WebhookTopic::OrdersCreate`]. Unknown names that are valid GraphQL
    /// identifiers become [`WebhookTopic::Custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = s.replace('/', "_").to_ascii_uppercase();

        let topic = match canonical.as_str() {
            "APP_UNINSTALLED" => Self::AppUninstalled,
            "CUSTOMERS_CREATE" => Self::CustomersCreate,
            "CUSTOMERS_UPDATE" => Self::CustomersUpdate,
            "CUSTOMERS_DELETE" => Self::CustomersDelete,
            "ORDERS_CREATE" => Self::OrdersCreate,
            "ORDERS_UPDATED" => Self::OrdersUpdated,
            "ORDERS_CANCELLED" => Self::OrdersCancelled,
            "ORDERS_FULFILLED" => Self::OrdersFulfilled,
            "PRODUCTS_CREATE" => Self::ProductsCreate,
            "PRODUCTS_UPDATE" => Self::ProductsUpdate,
            "PRODUCTS_DELETE" => Self::ProductsDelete,
            "SHOP_UPDATE" => Self::ShopUpdate,
            _ => {
                if !Self::is_valid_name(&canonical) {
                    return Err(ConfigError::InvalidWebhookTopic {
                        topic: s.to_string(),
                    });
                }
                Self::Custom(canonical)
            }
        };

        Ok(topic)
    }
}

impl Serialize for WebhookTopic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_graphql())
    }
}

impl<'de> Deserialize<'de> for WebhookTopic {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_graphql_spelling() {
        assert_eq!(
            "ORDERS_CREATE".parse::<WebhookTopic>().unwrap(),
            WebhookTopic::OrdersCreate
        );
        assert_eq!(
            "APP_UNINSTALLED".parse::<WebhookTopic>().unwrap(),
            WebhookTopic::AppUninstalled
        );
    }

    #[test]
    fn test_parse_header_spelling() {
        assert_eq!(
            "orders/create".parse::<WebhookTopic>().unwrap(),
            WebhookTopic::OrdersCreate
        );
        assert_eq!(
            "products/delete".parse::<WebhookTopic>().unwrap(),
            WebhookTopic::ProductsDelete
        );
    }

    #[test]
    fn test_both_spellings_are_equal() {
        let from_graphql: WebhookTopic = "CUSTOMERS_UPDATE".parse().unwrap();
        let from_header: WebhookTopic = "customers/update".parse().unwrap();
        assert_eq!(from_graphql, from_header);
    }

    #[test]
    fn test_parse_unknown_topic_becomes_custom() {
        let topic: WebhookTopic = "fulfillments/create".parse().unwrap();
        assert_eq!(
            topic,
            WebhookTopic::Custom("FULFILLMENTS_CREATE".to_string())
        );
        assert_eq!(topic.as_graphql(), "FULFILLMENTS_CREATE");
    }

    #[test]
    fn test_parse_rejects_invalid_names() {
        assert!("".parse::<WebhookTopic>().is_err());
        assert!("orders create".parse::<WebhookTopic>().is_err());
        assert!("orders-create".parse::<WebhookTopic>().is_err());

        let error = "bad topic!".parse::<WebhookTopic>().unwrap_err();
        assert!(error.to_string().contains("bad topic!"));
    }

    #[test]
    fn test_display_uses_graphql_spelling() {
        assert_eq!(WebhookTopic::OrdersCreate.to_string(), "ORDERS_CREATE");
        assert_eq!(
            WebhookTopic::Custom("CARTS_UPDATE".to_string()).to_string(),
            "CARTS_UPDATE"
        );
    }

    #[test]
    fn test_as_header_spelling() {
        assert_eq!(WebhookTopic::OrdersCreate.as_header(), "orders/create");
        assert_eq!(WebhookTopic::AppUninstalled.as_header(), "app/uninstalled");
        assert_eq!(
            WebhookTopic::Custom("FULFILLMENTS_CREATE".to_string()).as_header(),
            "fulfillments/create"
        );
    }

    #[test]
    fn test_topic_usable_as_hash_map_key() {
        let mut map = HashMap::new();
        map.insert(WebhookTopic::OrdersCreate, "orders handler");
        map.insert(
            WebhookTopic::Custom("CARTS_UPDATE".to_string()),
            "carts handler",
        );

        let looked_up: WebhookTopic = "orders/create".parse().unwrap();
        assert_eq!(map.get(&looked_up), Some(&"orders handler"));

        let custom: WebhookTopic = "carts/update".parse().unwrap();
        assert_eq!(map.get(&custom), Some(&"carts handler"));
    }

    #[test]
    fn test_serialization_uses_graphql_spelling() {
        let topic = WebhookTopic::ProductsUpdate;
        let json = serde_json::to_string(&topic).unwrap();
        assert_eq!(json, "\"PRODUCTS_UPDATE\"");
    }

    #[test]
    fn test_deserialization_accepts_both_spellings() {
        let topic: WebhookTopic = serde_json::from_str("\"ORDERS_CREATE\"").unwrap();
        assert_eq!(topic, WebhookTopic::OrdersCreate);

        let topic: WebhookTopic = serde_json::from_str("\"orders/create\"").unwrap();
        assert_eq!(topic, WebhookTopic::OrdersCreate);
    }

    #[test]
    fn test_deserialization_rejects_invalid_topic() {
        let result: Result<WebhookTopic, _> = serde_json::from_str("\"not a topic\"");
        assert!(result.is_err());
    }
}
