//! `AppError` and Sentry reporting.
//!
//! Failures outside the shopper's control are captured to Sentry when
//! reported. Everything else is only logged.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Top-level error for the `larek` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Unknown product id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the shopper.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error should be captured to Sentry.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) | Self::Checkout(CheckoutError::Api(err)) => err.is_server_error(),
            _ => false,
        }
    }

    /// Log the error, capturing server errors to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Storefront error");
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Record a shopper action. Sentry attaches the trail to later reports.
///
/// ```rust,ignore
/// add_breadcrumb("basket", "Added to basket", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let data = data
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| ((*key).to_owned(), serde_json::Value::from(*value)))
        .collect();

    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        data,
        ..Default::default()
    });
}
