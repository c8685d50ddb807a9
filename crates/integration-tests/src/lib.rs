//! Integration tests for Web Larek.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p web-larek-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - catalog to submitted order through the public API
//! - `stale_recovery` - server rejects a stale basket
//! - `concurrency` - duplicate catalog loads and order submissions
//! - `event_bus` - failure semantics seen from the state layer
//!
//! Everything runs against [`FakeApi`], an in-memory [`ShopApi`]; no
//! network or backend is needed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;
use web_larek_core::{Category, OrderId, OrderRequest, OrderResult, Price, Product, ProductId};
use web_larek_storefront::{ApiError, AppState, Checkout, Event, EventBus, ShopApi};

/// How the fake answers the next `POST /order`.
#[derive(Debug, Clone)]
pub enum OrderOutcome {
    Accept,
    Reject { status: u16, message: String },
}

/// In-memory backend.
///
/// Orders are accepted unless an outcome has been queued with
/// [`FakeApi::queue_order_outcome`].
#[derive(Debug, Default)]
pub struct FakeApi {
    catalog: Mutex<Vec<Product>>,
    outcomes: Mutex<VecDeque<OrderOutcome>>,
    orders: Mutex<Vec<OrderRequest>>,
    order_gate: Mutex<Option<Arc<Notify>>>,
    list_calls: AtomicUsize,
    invalidations: AtomicUsize,
}

impl FakeApi {
    #[must_use]
    pub fn with_catalog(products: Vec<Product>) -> Self {
        let api = Self::default();
        api.set_catalog(products);
        api
    }

    /// Replace what `GET /product` returns.
    pub fn set_catalog(&self, products: Vec<Product>) {
        *lock(&self.catalog) = products;
    }

    pub fn queue_order_outcome(&self, outcome: OrderOutcome) {
        lock(&self.outcomes).push_back(outcome);
    }

    /// Make order submissions wait until the returned handle is notified.
    #[must_use]
    pub fn hold_orders(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.order_gate) = Some(Arc::clone(&gate));
        gate
    }

    /// Every order request received, in arrival order.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRequest> {
        lock(&self.orders).clone()
    }

    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShopApi for FakeApi {
    async fn product_list(&self) -> Result<Vec<Product>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(lock(&self.catalog).clone())
    }

    async fn product_item(&self, id: &ProductId) -> Result<Product, ApiError> {
        lock(&self.catalog)
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::from_status(404, "Not Found"))
    }

    async fn order_products(&self, order: &OrderRequest) -> Result<OrderResult, ApiError> {
        lock(&self.orders).push(order.clone());

        let gate = lock(&self.order_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let outcome = lock(&self.outcomes)
            .pop_front()
            .unwrap_or(OrderOutcome::Accept);
        match outcome {
            OrderOutcome::Accept => Ok(OrderResult {
                id: OrderId::new(format!("order-{}", lock(&self.orders).len())),
                total: order.total,
            }),
            OrderOutcome::Reject { status, message } => Err(ApiError::from_status(status, message)),
        }
    }

    async fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

/// A catalog product with a whole-number price, or priceless for `None`.
#[must_use]
pub fn product(id: &str, price: Option<i64>) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        description: String::new(),
        price: price.map_or(Price::PRICELESS, Price::from_units),
        category: Category::SoftSkill,
        image: format!("https://cdn.example.com/{id}.svg"),
    }
}

/// Every event published on a bus, in publish order.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Event>>>);

impl Recorder {
    /// Start recording everything published on `bus`.
    #[must_use]
    pub fn attach(bus: &EventBus) -> Self {
        let recorder = Self::default();
        let events = Arc::clone(&recorder.0);
        bus.on("*", move |event| lock(&events).push(event.clone()));
        recorder
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        lock(&self.0).clone()
    }

    /// Events named `name`.
    #[must_use]
    pub fn named(&self, name: &str) -> Vec<Event> {
        lock(&self.0)
            .iter()
            .filter(|e| e.name() == name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.0).clear();
    }
}

/// A bus, state and checkout wired together over `api`, with a recorder
/// attached before anything else subscribes.
pub struct Harness {
    pub bus: EventBus,
    pub api: Arc<FakeApi>,
    pub checkout: Checkout<FakeApi>,
    pub events: Recorder,
}

impl Harness {
    #[must_use]
    pub fn new(api: FakeApi) -> Self {
        let bus = EventBus::new();
        let events = Recorder::attach(&bus);
        let api = Arc::new(api);
        let checkout = Checkout::new(AppState::new(bus.clone()), Arc::clone(&api));
        checkout.wire(&bus);
        Self {
            bus,
            api,
            checkout,
            events,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        self.checkout.state()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        // The wired handlers hold state clones.
        self.bus.off_all();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
