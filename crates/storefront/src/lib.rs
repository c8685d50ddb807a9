//! Web Larek Storefront library.
//!
//! The event-driven core of the storefront: a synchronous [`EventBus`], the
//! shared [`AppState`], the two checkout form controllers, the REST API
//! client and the [`Checkout`] workflow that ties them together.
//!
//! # Wiring
//!
//! ```rust,ignore
//! let bus = EventBus::new();
//! let state = AppState::new(bus.clone());
//! let checkout = Checkout::new(state.clone(), Arc::new(LarekApi::new(&config.api)));
//! checkout.wire(&bus);
//! checkout.load_catalog().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod events;
pub mod forms;
pub mod state;

pub use api::{ApiError, LarekApi, ShopApi};
pub use checkout::{Checkout, CheckoutError};
pub use config::{ApiConfig, ConfigError, LarekConfig};
pub use error::AppError;
pub use events::{Event, EventBus, EventPattern};
pub use forms::{AddressForm, ContactForm};
pub use state::AppState;
