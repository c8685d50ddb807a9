//! CLI commands.

pub mod catalog;
pub mod checkout;
pub mod product;

use std::sync::Arc;

use web_larek_storefront::{AppState, Checkout, EventBus, LarekApi, LarekConfig};

use crate::view;

/// The single bus, state and API handle a command runs against.
pub struct Session {
    pub bus: EventBus,
    pub checkout: Checkout<LarekApi>,
}

impl Session {
    /// Build the storefront and attach the text view.
    pub fn new(config: &LarekConfig) -> Self {
        let bus = EventBus::new();
        let state = AppState::new(bus.clone());
        let checkout = Checkout::new(state.clone(), Arc::new(LarekApi::new(&config.api)));

        view::attach(&bus, &state);
        checkout.wire(&bus);

        Self { bus, checkout }
    }

    pub const fn state(&self) -> &AppState {
        self.checkout.state()
    }
}
