//! `reqwest` implementation of [`ShopApi`].

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use web_larek_core::{OrderRequest, OrderResult, Product, ProductId};

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, ApiErrorBody, ApiListResponse, ShopApi};
use crate::config::ApiConfig;

/// Client for the Web Larek API.
///
/// Catalog reads are cached for the configured TTL; orders are never
/// cached.
#[derive(Clone)]
pub struct LarekApi {
    inner: Arc<LarekApiInner>,
}

struct LarekApiInner {
    client: reqwest::Client,
    base_url: String,
    cdn_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for LarekApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LarekApi")
            .field("base_url", &self.inner.base_url)
            .field("cdn_url", &self.inner.cdn_url)
            .finish_non_exhaustive()
    }
}

impl LarekApi {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(LarekApiInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.as_str().trim_end_matches('/').to_owned(),
                cdn_url: config.cdn_url.as_str().trim_end_matches('/').to_owned(),
                cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn with_cdn(&self, mut product: Product) -> Product {
        product.image = prefix_image(&self.inner.cdn_url, &product.image);
        product
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint(path))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        handle_response(response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Invalidate every cached response.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl ShopApi for LarekApi {
    #[instrument(skip(self))]
    async fn product_list(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::ProductList(items)) =
            self.inner.cache.get(&CacheKey::ProductList).await
        {
            debug!("Cache hit for product list");
            return Ok(items);
        }

        let list: ApiListResponse<Product> = self.get("/product").await?;
        let items: Vec<Product> = list.items.into_iter().map(|p| self.with_cdn(p)).collect();
        debug!(total = list.total, count = items.len(), "Fetched product list");

        self.inner
            .cache
            .insert(CacheKey::ProductList, CacheValue::ProductList(items.clone()))
            .await;

        Ok(items)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product_item(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get(&format!("/product/{id}")).await?;
        let product = self.with_cdn(product);

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total))]
    async fn order_products(&self, order: &OrderRequest) -> Result<OrderResult, ApiError> {
        let result: OrderResult = self.post("/order", order).await?;
        debug!(order_id = %result.id, "Order accepted");
        Ok(result)
    }

    async fn invalidate(&self) {
        self.invalidate_all().await;
    }
}

/// Parse a response, turning non-success statuses into [`ApiError`]s.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = error_message(status, &body);
        tracing::warn!(
            status = %status,
            message = %message,
            "API returned non-success status"
        );
        return Err(ApiError::from_status(status.as_u16(), message));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse API response"
        );
        ApiError::Parse(e)
    })
}

/// The body's `error` field, falling back to the status text.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_owned()
        })
}

fn prefix_image(cdn_url: &str, image: &str) -> String {
    format!("{cdn_url}/{}", image.trim_start_matches('/'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            api_url: "https://larek.example.com/api/weblarek/".parse().unwrap(),
            cdn_url: "https://larek.example.com/content/weblarek".parse().unwrap(),
            cache_ttl: Duration::from_secs(300),
        }
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let api = LarekApi::new(&config());
        assert_eq!(
            api.endpoint("/product"),
            "https://larek.example.com/api/weblarek/product"
        );
    }

    #[test]
    fn test_prefix_image() {
        assert_eq!(
            prefix_image("https://cdn.example.com/content", "/5_Dots.svg"),
            "https://cdn.example.com/content/5_Dots.svg"
        );
        assert_eq!(
            prefix_image("https://cdn.example.com/content", "Shell.svg"),
            "https://cdn.example.com/content/Shell.svg"
        );
    }

    #[test]
    fn test_with_cdn_rewrites_image() {
        let api = LarekApi::new(&config());
        let product: Product = serde_json::from_str(
            r#"{"id": "p1", "title": "T", "price": null, "category": "другое", "image": "/Asterisk_2.svg"}"#,
        )
        .unwrap();

        let product = api.with_cdn(product);
        assert_eq!(
            product.image,
            "https://larek.example.com/content/weblarek/Asterisk_2.svg"
        );
    }

    #[test]
    fn test_error_message_prefers_body() {
        let message = error_message(StatusCode::BAD_REQUEST, r#"{"error": "Неверная сумма заказа"}"#);
        assert_eq!(message, "Неверная сумма заказа");
    }

    #[test]
    fn test_error_message_falls_back_to_status_text() {
        assert_eq!(error_message(StatusCode::NOT_FOUND, "<html>"), "Not Found");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "{}"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_cache_serves_inserted_catalog() {
        let api = LarekApi::new(&config());
        let product: Product = serde_json::from_str(
            r#"{"id": "p1", "title": "T", "price": 10, "category": "кнопка", "image": "/a.svg"}"#,
        )
        .unwrap();
        api.inner
            .cache
            .insert(CacheKey::ProductList, CacheValue::ProductList(vec![product]))
            .await;

        let items = api.product_list().await.unwrap();
        assert_eq!(items.len(), 1);

        api.invalidate_all().await;
        assert!(api.inner.cache.get(&CacheKey::ProductList).await.is_none());
    }
}
