//! Typed storefront events and the bus that carries them.
//!
//! Every event has a stable string name (see [`names`]) so subscribers can
//! match by exact name, by regular expression, or with the `*` wildcard.
//! The payload is part of the variant, so a handler never has to guess the
//! shape of the data it receives.

mod bus;

pub use bus::{EventBus, EventPattern, Handler, Merge, handler};

use rust_decimal::Decimal;
use serde::Serialize;
use web_larek_core::{
    Order, OrderField, OrderId, Product, ProductId, ValidationResult, ValidationScope,
};

use crate::forms::{AddressFields, ContactFields};

/// Stable event names.
pub mod names {
    pub const ITEMS_CHANGED: &str = "items:changed";
    pub const BASKET_CHANGED: &str = "basket:changed";
    pub const PREVIEW_CHANGED: &str = "preview:changed";
    pub const ORDER_FIELD_CHANGED: &str = "order:field-changed";
    pub const ORDER_READY: &str = "order:ready";
    pub const VALIDATION_RESULT: &str = "validation:result";
    pub const ORDER_RESET: &str = "order:reset";
    pub const CARD_SELECT: &str = "card:select";
    pub const BASKET_OPEN: &str = "basket:open";
    pub const ORDER_OPEN: &str = "order:open";
    pub const ORDER_ADDRESS_SUBMIT: &str = "orderAddress:submit";
    pub const ORDER_CONTACT_SUBMIT: &str = "orderContact:submit";
    pub const ORDER_SUBMITTED: &str = "order:submitted";
    pub const ORDER_FAILED: &str = "order:failed";
    pub const MODAL_OPEN: &str = "modal:open";
    pub const MODAL_CLOSE: &str = "modal:close";
}

/// An event published on the [`EventBus`].
///
/// Serializes as `{"event": "<name>", "data": {...}}`, which is also the
/// shape wildcard subscribers log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum Event {
    /// The catalog was replaced.
    #[serde(rename = "items:changed")]
    CatalogChanged { items: Vec<Product> },

    /// The basket changed (or a basket mutation was requested).
    #[serde(rename = "basket:changed")]
    BasketChanged { items: Vec<ProductId>, total: Decimal },

    /// A product was selected for the detail view.
    #[serde(rename = "preview:changed")]
    PreviewChanged { item: Product },

    /// An order field was written.
    #[serde(rename = "order:field-changed")]
    OrderFieldChanged { field: OrderField, value: String },

    /// Every order field validates and the basket is not empty.
    #[serde(rename = "order:ready")]
    OrderReady { order: Order },

    /// A validation pass finished.
    #[serde(rename = "validation:result")]
    ValidationResult {
        scope: ValidationScope,
        result: ValidationResult,
    },

    /// The order draft was cleared.
    #[serde(rename = "order:reset")]
    OrderReset,

    /// A catalog card was clicked.
    #[serde(rename = "card:select")]
    CardSelect { id: ProductId },

    #[serde(rename = "basket:open")]
    BasketOpen,

    #[serde(rename = "order:open")]
    OrderOpen,

    /// The address step was submitted with a valid snapshot.
    #[serde(rename = "orderAddress:submit")]
    OrderAddressSubmit(AddressFields),

    /// The contact step was submitted with a valid snapshot.
    #[serde(rename = "orderContact:submit")]
    OrderContactSubmit(ContactFields),

    /// The API accepted the order.
    #[serde(rename = "order:submitted")]
    OrderSubmitted { id: OrderId, total: Decimal },

    /// The API rejected the order or could not be reached.
    #[serde(rename = "order:failed")]
    OrderFailed { message: String },

    #[serde(rename = "modal:open")]
    ModalOpen,

    #[serde(rename = "modal:close")]
    ModalClose,
}

impl Event {
    /// The stable name this event is published under.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CatalogChanged { .. } => names::ITEMS_CHANGED,
            Self::BasketChanged { .. } => names::BASKET_CHANGED,
            Self::PreviewChanged { .. } => names::PREVIEW_CHANGED,
            Self::OrderFieldChanged { .. } => names::ORDER_FIELD_CHANGED,
            Self::OrderReady { .. } => names::ORDER_READY,
            Self::ValidationResult { .. } => names::VALIDATION_RESULT,
            Self::OrderReset => names::ORDER_RESET,
            Self::CardSelect { .. } => names::CARD_SELECT,
            Self::BasketOpen => names::BASKET_OPEN,
            Self::OrderOpen => names::ORDER_OPEN,
            Self::OrderAddressSubmit(_) => names::ORDER_ADDRESS_SUBMIT,
            Self::OrderContactSubmit(_) => names::ORDER_CONTACT_SUBMIT,
            Self::OrderSubmitted { .. } => names::ORDER_SUBMITTED,
            Self::OrderFailed { .. } => names::ORDER_FAILED,
            Self::ModalOpen => names::MODAL_OPEN,
            Self::ModalClose => names::MODAL_CLOSE,
        }
    }
}
