//! Web Larek REST API.
//!
//! # Endpoints
//!
//! - `GET /product` - catalog list as `{total, items}`
//! - `GET /product/{id}` - a single product
//! - `POST /order` - place an order, returns `{id, total}`
//!
//! Product image paths come back relative; [`LarekApi`] prefixes them with
//! the CDN URL. Both `GET` responses are cached in memory via `moka`.
//!
//! [`ShopApi`] is the seam the rest of the storefront depends on, so tests
//! can swap in an in-memory implementation.

mod cache;
mod client;

pub use client::LarekApi;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_larek_core::{OrderRequest, OrderResult, Product, ProductId};

/// Rejections meaning the basket no longer matches what the server sells:
/// an unknown or unsold product, or a total that disagrees with the
/// server's prices.
static STALE_ORDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)товар.*не найден|не продается|неверная сумма заказа").expect("Invalid regex")
});

/// Errors that can occur when talking to the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The order references products or prices the server no longer
    /// accepts.
    #[error("Order is stale: {0}")]
    StaleOrder(String),
}

impl ApiError {
    /// Classify a non-success response.
    ///
    /// A 4xx whose message names a missing or unsold product, or a wrong
    /// total, becomes [`ApiError::StaleOrder`].
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) && STALE_ORDER_PATTERN.is_match(&message) {
            Self::StaleOrder(message)
        } else {
            Self::Api { status, message }
        }
    }

    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleOrder(_))
    }

    /// Whether the failure lies outside the shopper's control.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::StaleOrder(_) => false,
        }
    }
}

/// List response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiListResponse<T> {
    pub total: u64,
    pub items: Vec<T>,
}

/// Error body returned by the API on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
}

/// Catalog and order operations the storefront needs from the backend.
#[async_trait]
pub trait ShopApi: Send + Sync {
    /// Fetch the whole catalog.
    async fn product_list(&self) -> Result<Vec<Product>, ApiError>;

    /// Fetch one product.
    async fn product_item(&self, id: &ProductId) -> Result<Product, ApiError>;

    /// Place an order.
    async fn order_products(&self, order: &OrderRequest) -> Result<OrderResult, ApiError>;

    /// Drop cached responses so the next read goes to the server.
    async fn invalidate(&self) {}
}
