//! REST client for the catalog and order-placement collaborators.
//!
//! The engine and store never call the backend themselves: items are handed
//! to `dispatch` already resolved by the caller, and placing an order is the
//! caller's step too. This client is that caller-side plumbing.
//!
//! Catalog reads are cached with `moka` (5-minute TTL); order placement is
//! never cached. Collaborator failures are the caller's to catch and
//! present - they do not flow into the collection store.

use std::sync::Arc;
use std::time::Duration;

use basket_core::{CurrencyCode, Item, ItemId, OrderId, Price, Snapshot, UserId, totals};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from the shop backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with a non-success status.
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

// =============================================================================
// Wire types
// =============================================================================

/// Product record as served by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiProduct {
    id: ItemId,
    name: String,
    price: Decimal,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    stock: Option<u32>,
}

impl From<ApiProduct> for Item {
    fn from(product: ApiProduct) -> Self {
        Self {
            id: product.id,
            name: product.name,
            unit_price: Price::new(product.price, CurrencyCode::default()),
            image_ref: product.image,
            category: product.category,
            stock_limit: product.stock,
        }
    }
}

/// Shipping address collected at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderLine {
    id: ItemId,
    name: String,
    unit_price: Decimal,
    quantity: u32,
    line_total: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    items: Vec<OrderLine>,
    subtotal: Decimal,
    tax: Decimal,
    shipping: Decimal,
    total: Decimal,
    shipping_address: ShippingAddress,
    payment_method: String,
    status: &'static str,
    created_at: DateTime<Utc>,
}

/// Order as confirmed by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// ShopClient
// =============================================================================

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Catalog,
    Category(String),
    Search(String),
    Item(ItemId),
}

#[derive(Debug, Clone)]
enum CacheValue {
    Items(Arc<Vec<Item>>),
    Item(Box<Item>),
}

/// Client for the shop backend (catalog reads and order placement).
#[derive(Clone)]
pub struct ShopClient {
    inner: Arc<ShopClientInner>,
}

struct ShopClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl ShopClient {
    /// Create a client for the given backend base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(ShopClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.into().trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    fn get_request(&self, path: &str, query: &[(&str, &str)]) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let mut request = self.inner.client.get(&url);
        if !query.is_empty() {
            // Let reqwest percent-encode the parameters; user-typed search
            // terms can carry '&', '#', or spaces.
            request = request.query(query);
        }
        request
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let response = self.get_request(path, query).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(path.to_string()));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "shop backend returned non-success status"
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn cached_items(
        &self,
        key: CacheKey,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Arc<Vec<Item>>, ClientError> {
        if let Some(CacheValue::Items(items)) = self.inner.cache.get(&key).await {
            debug!(?key, "catalog cache hit");
            return Ok(items);
        }

        let products: Vec<ApiProduct> = self.get_json(path, query).await?;
        let items: Arc<Vec<Item>> = Arc::new(products.into_iter().map(Item::from).collect());
        self.inner
            .cache
            .insert(key, CacheValue::Items(Arc::clone(&items)))
            .await;
        Ok(items)
    }

    /// Fetch the full catalog.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Result<Arc<Vec<Item>>, ClientError> {
        self.cached_items(CacheKey::Catalog, "/products", &[]).await
    }

    /// Fetch the products in one category.
    #[instrument(skip(self))]
    pub async fn fetch_by_category(&self, category: &str) -> Result<Arc<Vec<Item>>, ClientError> {
        self.cached_items(
            CacheKey::Category(category.to_string()),
            "/products",
            &[("category", category)],
        )
        .await
    }

    /// Full-text search over the catalog.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Arc<Vec<Item>>, ClientError> {
        self.cached_items(
            CacheKey::Search(query.to_string()),
            "/products",
            &[("q", query)],
        )
        .await
    }

    /// Fetch a single item by id.
    #[instrument(skip(self))]
    pub async fn fetch_item(&self, id: ItemId) -> Result<Item, ClientError> {
        let key = CacheKey::Item(id);
        if let Some(CacheValue::Item(item)) = self.inner.cache.get(&key).await {
            debug!(%id, "item cache hit");
            return Ok(*item);
        }

        let product: ApiProduct = self.get_json(&format!("/products/{id}"), &[]).await?;
        let item = Item::from(product);
        self.inner
            .cache
            .insert(key, CacheValue::Item(Box::new(item.clone())))
            .await;
        Ok(item)
    }

    /// Submit an order built from a snapshot.
    ///
    /// Totals are computed here with the same [`totals`] helpers the cart
    /// summary uses. On success the caller is responsible for clearing the
    /// cart store; order placement never clears anything by itself.
    #[instrument(skip(self, snapshot, shipping))]
    pub async fn submit_order(
        &self,
        snapshot: &Snapshot,
        shipping: ShippingAddress,
        payment_method: &str,
        tax_rate: Decimal,
        shipping_flat: Decimal,
        user_id: Option<UserId>,
    ) -> Result<Order, ClientError> {
        let order = NewOrder {
            user_id,
            items: snapshot
                .lines()
                .iter()
                .map(|line| OrderLine {
                    id: line.item.id,
                    name: line.item.name.clone(),
                    unit_price: line.item.unit_price.amount,
                    quantity: line.quantity,
                    line_total: line.line_total().amount,
                })
                .collect(),
            subtotal: totals::subtotal(snapshot).amount,
            tax: totals::tax(snapshot, tax_rate).amount,
            shipping: shipping_flat,
            total: totals::grand_total(snapshot, shipping_flat, tax_rate).amount,
            shipping_address: shipping,
            payment_method: payment_method.to_string(),
            status: "pending",
            created_at: Utc::now(),
        };

        let url = format!("{}/orders", self.inner.base_url);
        let response = self.inner.client.post(&url).json(&order).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "order submission failed"
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
