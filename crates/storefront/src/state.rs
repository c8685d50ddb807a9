//! Application state shared by every controller and view.
//!
//! `AppState` owns the catalog, the basket, the order draft and the current
//! form errors. Every mutation publishes a change event on the bus so views
//! can re-render from fresh state.
//!
//! The state lock is held only for the mutation itself and released before
//! anything is published. Handlers may therefore read or write the state
//! from inside a publish.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use web_larek_core::{
    FormErrors, Order, OrderField, OrderStage, Payment, Product, ProductId, ValidationResult,
    ValidationScope, validate_scope,
};

use crate::error::add_breadcrumb;
use crate::events::{Event, EventBus};

/// Application state shared across the storefront.
///
/// This struct is cheaply cloneable via `Arc`; every clone sees the same
/// data and publishes on the same bus.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    bus: EventBus,
    data: RwLock<StateData>,
}

#[derive(Debug, Default)]
struct StateData {
    catalog: Vec<Product>,
    /// Unique ids in the order they were added.
    basket: Vec<ProductId>,
    preview: Option<ProductId>,
    /// `items` is unused here; it is filled from the resolved basket on
    /// every read.
    order: Order,
    form_errors: FormErrors,
}

impl StateData {
    fn product(&self, id: &ProductId) -> Option<&Product> {
        self.catalog.iter().find(|p| &p.id == id)
    }

    fn basket_items(&self) -> Vec<Product> {
        self.basket
            .iter()
            .filter_map(|id| self.product(id))
            .cloned()
            .collect()
    }

    fn total(&self) -> Decimal {
        self.basket
            .iter()
            .filter_map(|id| self.product(id))
            .map(|p| p.price.amount_or_zero())
            .sum()
    }

    /// Basket ids that resolve to a catalog product, in basket order.
    fn resolved_basket(&self) -> Vec<ProductId> {
        self.basket
            .iter()
            .filter(|id| self.product(id).is_some())
            .cloned()
            .collect()
    }

    fn order(&self) -> Order {
        Order {
            items: self.resolved_basket(),
            ..self.order.clone()
        }
    }

    fn basket_changed(&self) -> Event {
        Event::BasketChanged {
            items: self.basket.clone(),
            total: self.total(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.read();
        f.debug_struct("AppState")
            .field("catalog", &data.catalog.len())
            .field("basket", &data.basket)
            .field("order", &data.order)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create empty state publishing on `bus`.
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                bus,
                data: RwLock::new(StateData::default()),
            }),
        }
    }

    /// The bus this state publishes on.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Replace the catalog and publish `items:changed`.
    pub fn set_catalog(&self, products: Vec<Product>) {
        info!(count = products.len(), "Catalog replaced");
        let items = {
            let mut data = self.write();
            data.catalog = products;
            data.catalog.clone()
        };
        self.publish(Event::CatalogChanged { items });
    }

    /// Replace the catalog after a stale-basket rejection.
    ///
    /// Drops every basket id that is no longer in the catalog or no longer
    /// has a price, publishes `items:changed` and `basket:changed`, and
    /// returns the dropped ids.
    pub fn reconcile_catalog(&self, products: Vec<Product>) -> Vec<ProductId> {
        let (items, removed, basket_event) = {
            let mut guard = self.write();
            let data = &mut *guard;
            data.catalog = products;

            let (kept, removed): (Vec<_>, Vec<_>) = data
                .basket
                .iter()
                .cloned()
                .partition(|id| data.product(id).is_some_and(|p| !p.price.is_priceless()));
            data.basket = kept;

            (data.catalog.clone(), removed, data.basket_changed())
        };

        if !removed.is_empty() {
            warn!(removed = ?removed, "Dropped unavailable products from basket");
        }

        self.publish(Event::CatalogChanged { items });
        self.publish(basket_event);
        removed
    }

    /// A copy of the catalog.
    #[must_use]
    pub fn catalog(&self) -> Vec<Product> {
        self.read().catalog.clone()
    }

    /// Look up a catalog product.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.read().product(id).cloned()
    }

    /// Select a product for the detail view.
    ///
    /// Publishes `preview:changed` and returns the product when `id` is in
    /// the catalog; otherwise changes nothing.
    pub fn set_preview(&self, id: &ProductId) -> Option<Product> {
        let item = {
            let mut data = self.write();
            let item = data.product(id).cloned()?;
            data.preview = Some(id.clone());
            item
        };
        self.publish(Event::PreviewChanged { item: item.clone() });
        Some(item)
    }

    /// The product currently previewed.
    #[must_use]
    pub fn preview(&self) -> Option<Product> {
        let data = self.read();
        data.preview.as_ref().and_then(|id| data.product(id)).cloned()
    }

    // =========================================================================
    // Basket
    // =========================================================================

    /// Append `id` to the basket and publish `basket:changed`.
    ///
    /// Adding an id that is already present does nothing and publishes
    /// nothing. Returns whether the basket changed.
    pub fn add_to_basket(&self, id: &ProductId) -> bool {
        let event = {
            let mut data = self.write();
            if data.basket.contains(id) {
                return false;
            }
            data.basket.push(id.clone());
            data.basket_changed()
        };

        debug!(product_id = %id, "Added to basket");
        add_breadcrumb("basket", "Added to basket", Some(&[("product_id", id.as_str())]));
        self.publish(event);
        true
    }

    /// Remove `id` from the basket. Always publishes `basket:changed`.
    pub fn remove_from_basket(&self, id: &ProductId) {
        let event = {
            let mut data = self.write();
            data.basket.retain(|b| b != id);
            data.basket_changed()
        };

        debug!(product_id = %id, "Removed from basket");
        add_breadcrumb("basket", "Removed from basket", Some(&[("product_id", id.as_str())]));
        self.publish(event);
    }

    /// Empty the basket. Always publishes `basket:changed`.
    pub fn clear_basket(&self) {
        let event = {
            let mut data = self.write();
            data.basket.clear();
            data.basket_changed()
        };

        debug!("Basket cleared");
        add_breadcrumb("basket", "Cleared basket", None);
        self.publish(event);
    }

    /// Basket products in basket order. Ids missing from the catalog are
    /// skipped.
    #[must_use]
    pub fn basket_items(&self) -> Vec<Product> {
        self.read().basket_items()
    }

    /// Sum of basket prices. A priceless product counts as zero.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.read().total()
    }

    #[must_use]
    pub fn is_in_basket(&self, id: &ProductId) -> bool {
        self.read().basket.contains(id)
    }

    #[must_use]
    pub fn basket_ids(&self) -> Vec<ProductId> {
        self.read().basket.clone()
    }

    // =========================================================================
    // Order
    // =========================================================================

    /// Write one order field.
    ///
    /// Publishes `order:field-changed`, runs full order validation, and
    /// publishes `order:ready` only when the whole order validates. Once the
    /// order is complete every further write publishes `order:ready` again,
    /// even one that stores the same value. The payment field takes `card`
    /// or `cash`; anything else clears it. `items` always follows the basket
    /// and cannot be written.
    pub fn set_order_field(&self, field: OrderField, value: impl Into<String>) {
        let value = value.into();
        {
            let mut data = self.write();
            match field {
                OrderField::Payment => {
                    let payment = value.parse::<Payment>().ok();
                    if payment.is_none() && !value.trim().is_empty() {
                        warn!(value = %value, "Unknown payment method");
                    }
                    data.order.payment = payment;
                }
                OrderField::Address => data.order.address.clone_from(&value),
                OrderField::Email => data.order.email.clone_from(&value),
                OrderField::Phone => data.order.phone.clone_from(&value),
                OrderField::Items => {
                    warn!("Order items follow the basket and cannot be set");
                    return;
                }
            }
        }

        debug!(field = %field, "Order field changed");
        self.publish(Event::OrderFieldChanged { field, value });

        if self.validate_order().valid {
            info!("Order ready");
            self.publish(Event::OrderReady {
                order: self.order(),
            });
        }
    }

    /// Validate every field and the basket.
    pub fn validate_order(&self) -> ValidationResult {
        self.validate(ValidationScope::Order)
    }

    /// Validate payment and address.
    pub fn validate_order_address(&self) -> ValidationResult {
        self.validate(ValidationScope::Address)
    }

    /// Validate email and phone.
    pub fn validate_order_contact(&self) -> ValidationResult {
        self.validate(ValidationScope::Contact)
    }

    /// Errors from the most recent validation pass.
    #[must_use]
    pub fn form_errors(&self) -> FormErrors {
        self.read().form_errors.clone()
    }

    /// Clear the order draft and form errors and publish `order:reset`.
    ///
    /// The catalog and basket are left alone.
    pub fn reset_order(&self) {
        {
            let mut data = self.write();
            data.order = Order::default();
            data.form_errors = FormErrors::default();
        }

        debug!("Order reset");
        self.publish(Event::OrderReset);
    }

    /// Snapshot of the order. `items` holds the basket ids that resolve in
    /// the catalog.
    #[must_use]
    pub fn order(&self) -> Order {
        self.read().order()
    }

    #[must_use]
    pub fn order_stage(&self) -> OrderStage {
        self.order().stage()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn validate(&self, scope: ValidationScope) -> ValidationResult {
        let result = {
            let mut data = self.write();
            let result = validate_scope(&data.order(), scope);
            data.form_errors = FormErrors::from(&result);
            result
        };

        self.publish(Event::ValidationResult {
            scope,
            result: result.clone(),
        });
        result
    }

    fn publish(&self, event: Event) {
        self.inner.bus.publish(&event);
    }

    fn read(&self) -> RwLockReadGuard<'_, StateData> {
        self.inner
            .data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StateData> {
        self.inner
            .data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
