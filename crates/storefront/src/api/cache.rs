//! Cache types for API responses.

use web_larek_core::{Product, ProductId};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    ProductList,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    ProductList(Vec<Product>),
    Product(Box<Product>),
}
