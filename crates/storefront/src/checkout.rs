//! Checkout workflow: catalog loading, step submission and order placement.
//!
//! # Submission
//!
//! [`Checkout::submit_order`] checks the draft, builds the request with the
//! locally computed total and posts it. Then:
//!
//! - **Accepted**: the basket is cleared, the draft reset and
//!   `order:submitted` published.
//! - **Stale** (unknown/unsold product or wrong total): the catalog is
//!   refetched past the cache, the basket reconciled against it, and
//!   [`CheckoutError::StaleBasket`] returned so the shopper re-confirms.
//! - **Any other failure**: state is left alone and `order:failed`
//!   published.
//!
//! Only one submission runs at a time; a second call while one is in flight
//! fails with [`CheckoutError::SubmissionInFlight`]. Catalog loads are not
//! de-duplicated.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use web_larek_core::{
    OrderField, OrderRequest, OrderResult, ProductId, ValidationResult, validate_address,
    validate_email, validate_payment, validate_phone,
};

use crate::api::{ApiError, ShopApi};
use crate::error::add_breadcrumb;
use crate::events::{Event, EventBus, names};
use crate::state::AppState;

/// Errors from the checkout workflow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The API returned no products.
    #[error("Catalog is empty")]
    EmptyCatalog,

    /// A required order field is missing or malformed.
    #[error("Order is incomplete: {}", .0.messages().join(", "))]
    IncompleteOrder(ValidationResult),

    /// Nothing in the basket resolves to a catalog product.
    #[error("Basket is empty")]
    EmptyBasket,

    /// The server rejected the basket; it has been reconciled with a fresh
    /// catalog.
    #[error("Basket changed: {} item(s) removed, new total {total}", .removed.len())]
    StaleBasket {
        removed: Vec<ProductId>,
        total: Decimal,
    },

    /// Another submission has not finished yet.
    #[error("An order submission is already in progress")]
    SubmissionInFlight,

    /// API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Drives checkout against a [`ShopApi`].
pub struct Checkout<A> {
    state: AppState,
    api: Arc<A>,
    in_flight: Arc<AtomicBool>,
}

impl<A> Clone for Checkout<A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            api: Arc::clone(&self.api),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<A> std::fmt::Debug for Checkout<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout")
            .field("state", &self.state)
            .field("in_flight", &self.in_flight.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<A: ShopApi> Checkout<A> {
    #[must_use]
    pub fn new(state: AppState, api: Arc<A>) -> Self {
        Self {
            state,
            api,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch the catalog and install it. Returns the product count.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Api`] if the fetch fails and
    /// [`CheckoutError::EmptyCatalog`] if it returns nothing. The current
    /// catalog is kept in both cases.
    #[instrument(skip(self))]
    pub async fn load_catalog(&self) -> Result<usize, CheckoutError> {
        let products = self.api.product_list().await.map_err(|e| {
            error!(error = %e, "Failed to load catalog");
            e
        })?;

        if products.is_empty() {
            warn!("API returned an empty catalog");
            return Err(CheckoutError::EmptyCatalog);
        }

        let count = products.len();
        self.state.set_catalog(products);
        Ok(count)
    }

    /// Copy submitted step snapshots into the order draft.
    ///
    /// Subscribes to `orderAddress:submit` and `orderContact:submit`. The
    /// handlers hold a clone of the state, so they live as long as the bus
    /// registration does.
    pub fn wire(&self, bus: &EventBus) {
        let state = self.state.clone();
        bus.on(names::ORDER_ADDRESS_SUBMIT, move |event| {
            if let Event::OrderAddressSubmit(fields) = event {
                let payment = fields.payment.map_or("", |p| p.as_str());
                state.set_order_field(OrderField::Payment, payment);
                state.set_order_field(OrderField::Address, fields.address.as_str());
            }
        });

        let state = self.state.clone();
        bus.on(names::ORDER_CONTACT_SUBMIT, move |event| {
            if let Event::OrderContactSubmit(fields) = event {
                state.set_order_field(OrderField::Email, fields.email.as_str());
                state.set_order_field(OrderField::Phone, fields.phone.as_str());
            }
        });
    }

    /// Place the current order.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SubmissionInFlight`] if another submission is running
    /// - [`CheckoutError::IncompleteOrder`] / [`CheckoutError::EmptyBasket`]
    ///   if the draft cannot be sent
    /// - [`CheckoutError::StaleBasket`] after a stale rejection
    /// - [`CheckoutError::Api`] for any other API failure
    #[instrument(skip(self))]
    pub async fn submit_order(&self) -> Result<OrderResult, CheckoutError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("Order submission already in progress");
            return Err(CheckoutError::SubmissionInFlight);
        };

        let request = self.build_request()?;
        let total = request.total.to_string();
        add_breadcrumb("checkout", "Submitting order", Some(&[("total", total.as_str())]));
        info!(items = request.items.len(), total = %request.total, "Submitting order");

        match self.api.order_products(&request).await {
            Ok(result) => {
                info!(order_id = %result.id, total = %result.total, "Order placed");
                self.state.clear_basket();
                self.state.reset_order();
                self.state.bus().publish(&Event::OrderSubmitted {
                    id: result.id.clone(),
                    total: result.total,
                });
                Ok(result)
            }
            Err(e) if e.is_stale() => {
                warn!(error = %e, "Order rejected as stale, refreshing catalog");
                self.recover_stale().await
            }
            Err(e) => {
                error!(error = %e, "Order submission failed");
                self.state.bus().publish(&Event::OrderFailed {
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Drop the order draft without touching the basket.
    pub fn abandon(&self) {
        add_breadcrumb("checkout", "Abandoned checkout", None);
        self.state.reset_order();
    }

    fn build_request(&self) -> Result<OrderRequest, CheckoutError> {
        let order = self.state.order();

        let fields = (
            validate_payment(order.payment),
            validate_address(&order.address).map(str::to_owned),
            validate_email(&order.email),
            validate_phone(&order.phone),
        );
        let (payment, address, email, phone) = match fields {
            (Ok(payment), Ok(address), Ok(email), Ok(phone)) => (payment, address, email, phone),
            (payment, address, email, phone) => {
                let errors = [payment.err(), address.err(), email.err(), phone.err()]
                    .into_iter()
                    .flatten()
                    .collect();
                let result = ValidationResult::from_errors(errors);
                error!(errors = ?result.messages(), "Refusing to submit incomplete order");
                return Err(CheckoutError::IncompleteOrder(result));
            }
        };

        let items = order.items;
        if items.is_empty() {
            error!("Refusing to submit order with an empty basket");
            return Err(CheckoutError::EmptyBasket);
        }

        Ok(OrderRequest {
            payment,
            address,
            email: email.into_inner(),
            phone: phone.as_str().to_owned(),
            items,
            total: self.state.total(),
        })
    }

    async fn recover_stale(&self) -> Result<OrderResult, CheckoutError> {
        self.api.invalidate().await;
        let products = self.api.product_list().await.map_err(|e| {
            error!(error = %e, "Failed to refresh catalog after stale order");
            e
        })?;

        let removed = self.state.reconcile_catalog(products);
        let total = self.state.total();
        Err(CheckoutError::StaleBasket { removed, total })
    }
}

/// Holds the in-flight flag for the duration of one submission.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use web_larek_core::{Category, OrderId, OrderStage, Price, Product};

    use super::*;
    use crate::forms::{AddressForm, ContactForm};

    #[derive(Default)]
    struct StubApi {
        catalog: Mutex<Vec<Product>>,
        reject_with: Mutex<Option<(u16, String)>>,
        orders: Mutex<Vec<OrderRequest>>,
    }

    #[async_trait]
    impl ShopApi for StubApi {
        async fn product_list(&self) -> Result<Vec<Product>, ApiError> {
            Ok(self.catalog.lock().unwrap().clone())
        }

        async fn product_item(&self, id: &ProductId) -> Result<Product, ApiError> {
            self.catalog
                .lock()
                .unwrap()
                .iter()
                .find(|p| &p.id == id)
                .cloned()
                .ok_or_else(|| ApiError::from_status(404, "Not Found"))
        }

        async fn order_products(&self, order: &OrderRequest) -> Result<OrderResult, ApiError> {
            self.orders.lock().unwrap().push(order.clone());
            if let Some((status, message)) = self.reject_with.lock().unwrap().clone() {
                return Err(ApiError::from_status(status, message));
            }
            Ok(OrderResult {
                id: OrderId::new("order-1"),
                total: order.total,
            })
        }
    }

    fn product(id: &str, price: Option<i64>) -> Product {
        Product {
            id: ProductId::new(id),
            title: id.to_string(),
            description: String::new(),
            price: price.map_or(Price::PRICELESS, Price::from_units),
            category: Category::SoftSkill,
            image: format!("/{id}.svg"),
        }
    }

    async fn checkout_with(products: Vec<Product>) -> Checkout<StubApi> {
        let api = Arc::new(StubApi::default());
        *api.catalog.lock().unwrap() = products;
        let checkout = Checkout::new(AppState::new(EventBus::new()), api);
        checkout.load_catalog().await.unwrap();
        checkout
    }

    fn fill_order(state: &AppState) {
        state.set_order_field(OrderField::Payment, "card");
        state.set_order_field(OrderField::Address, "Main St 1");
        state.set_order_field(OrderField::Email, "a@b.com");
        state.set_order_field(OrderField::Phone, "+79998887766");
    }

    #[tokio::test]
    async fn test_load_catalog_rejects_empty_catalog() {
        let checkout = Checkout::new(AppState::new(EventBus::new()), Arc::new(StubApi::default()));
        let err = checkout.load_catalog().await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCatalog));
        assert!(checkout.state().catalog().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_order_is_refused() {
        let checkout = checkout_with(vec![product("p1", Some(500))]).await;
        checkout.state().add_to_basket(&ProductId::new("p1"));
        checkout.state().set_order_field(OrderField::Email, "a@b.com");

        let err = checkout.submit_order().await.unwrap_err();
        let CheckoutError::IncompleteOrder(result) = err else {
            panic!("expected IncompleteOrder, got {err:?}");
        };
        assert_eq!(result.errors.len(), 3);
        assert!(checkout.api().orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_basket_is_refused() {
        let checkout = checkout_with(vec![product("p1", Some(500))]).await;
        fill_order(checkout.state());

        let err = checkout.submit_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyBasket));
    }

    #[tokio::test]
    async fn test_unknown_ids_agree_with_stage() {
        let checkout = checkout_with(vec![product("p1", Some(500))]).await;
        let state = checkout.state();
        state.add_to_basket(&ProductId::new("ghost"));
        fill_order(state);

        assert_ne!(state.order_stage(), OrderStage::Ready);
        let err = checkout.submit_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyBasket));
        assert!(checkout.api().orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_order_clears_basket_and_draft() {
        let checkout = checkout_with(vec![product("p1", Some(500)), product("p2", Some(250))]).await;
        let state = checkout.state();
        state.add_to_basket(&ProductId::new("p1"));
        state.add_to_basket(&ProductId::new("p2"));
        fill_order(state);

        let submitted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&submitted);
        state.bus().on(names::ORDER_SUBMITTED, move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        let result = checkout.submit_order().await.unwrap();
        assert_eq!(result.total, Decimal::from(750));

        let sent = checkout.api().orders.lock().unwrap()[0].clone();
        assert_eq!(sent.items, vec![ProductId::new("p1"), ProductId::new("p2")]);
        assert_eq!(sent.total, Decimal::from(750));
        assert_eq!(sent.address, "Main St 1");

        assert!(state.basket_ids().is_empty());
        assert_eq!(state.order().email, "");
        assert_eq!(submitted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejection_leaves_state_and_publishes_failure() {
        let checkout = checkout_with(vec![product("p1", Some(500))]).await;
        let state = checkout.state();
        state.add_to_basket(&ProductId::new("p1"));
        fill_order(state);
        *checkout.api().reject_with.lock().unwrap() = Some((500, "Internal Server Error".to_string()));

        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&failures);
        state.bus().on(names::ORDER_FAILED, move |event| {
            if let Event::OrderFailed { message } = event {
                sink.lock().unwrap().push(message.clone());
            }
        });

        let err = checkout.submit_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Api(ApiError::Api { status: 500, .. })));
        assert_eq!(state.basket_ids(), vec![ProductId::new("p1")]);
        assert_eq!(state.order().address, "Main St 1");
        assert_eq!(
            failures.lock().unwrap().as_slice(),
            ["API error (500): Internal Server Error"]
        );
    }

    #[tokio::test]
    async fn test_stale_rejection_reconciles_basket() {
        let checkout = checkout_with(vec![product("p1", Some(500)), product("p2", Some(250))]).await;
        let state = checkout.state();
        state.add_to_basket(&ProductId::new("p1"));
        state.add_to_basket(&ProductId::new("p2"));
        fill_order(state);

        *checkout.api().catalog.lock().unwrap() = vec![product("p1", Some(500))];
        *checkout.api().reject_with.lock().unwrap() =
            Some((400, "Товар с id p2 не найден".to_string()));

        let err = checkout.submit_order().await.unwrap_err();
        let CheckoutError::StaleBasket { removed, total } = err else {
            panic!("expected StaleBasket, got {err:?}");
        };
        assert_eq!(removed, vec![ProductId::new("p2")]);
        assert_eq!(total, Decimal::from(500));
        assert_eq!(state.basket_ids(), vec![ProductId::new("p1")]);
        // The draft survives so the shopper only has to re-confirm.
        assert_eq!(state.order().address, "Main St 1");
    }

    #[tokio::test]
    async fn test_wired_forms_fill_the_order() {
        let checkout = checkout_with(vec![product("p1", Some(500))]).await;
        let bus = checkout.state().bus().clone();
        checkout.wire(&bus);
        checkout.state().add_to_basket(&ProductId::new("p1"));

        let mut address = AddressForm::new(bus.clone());
        address.select_payment(web_larek_core::Payment::Cash);
        address.set_address("Main St 1");
        address.submit().unwrap();

        let mut contact = ContactForm::new(bus);
        contact.set_email("a@b.com");
        contact.set_phone("89998887766");
        contact.submit().unwrap();

        assert_eq!(checkout.state().order_stage(), OrderStage::Ready);
        let result = checkout.submit_order().await.unwrap();
        assert_eq!(result.total, Decimal::from(500));
    }

    #[tokio::test]
    async fn test_abandon_keeps_basket() {
        let checkout = checkout_with(vec![product("p1", Some(500))]).await;
        checkout.state().add_to_basket(&ProductId::new("p1"));
        fill_order(checkout.state());

        checkout.abandon();

        assert_eq!(checkout.state().order().payment, None);
        assert_eq!(checkout.state().basket_ids(), vec![ProductId::new("p1")]);
    }

    #[test]
    fn test_in_flight_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = InFlightGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(InFlightGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }
}
