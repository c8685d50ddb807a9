//! Text view: renders storefront events as log lines.

use tracing::{debug, error, info, trace};
use web_larek_core::Price;
use web_larek_storefront::events::names;
use web_larek_storefront::{AppState, Event, EventBus};

/// Subscribe the view to `bus`.
pub fn attach(bus: &EventBus, state: &AppState) {
    bus.on("*", |event| trace!(event = event.name(), "Event"));

    bus.on(names::ITEMS_CHANGED, |event| {
        if let Event::CatalogChanged { items } = event {
            for product in items {
                info!(
                    id = %product.id,
                    category = product.category.label(),
                    price = %product.price,
                    "{}",
                    product.title
                );
            }
        }
    });

    let preview_state = state.clone();
    bus.on(names::CARD_SELECT, move |event| {
        if let Event::CardSelect { id } = event {
            preview_state.set_preview(id);
        }
    });

    bus.on(names::PREVIEW_CHANGED, |event| {
        if let Event::PreviewChanged { item } = event {
            debug!(id = %item.id, price = %item.price, "Previewing {}", item.title);
        }
    });

    let basket_state = state.clone();
    bus.on(names::BASKET_CHANGED, move |event| {
        if let Event::BasketChanged { total, .. } = event {
            info!(
                counter = basket_state.basket_items().len(),
                total = %Price::new(*total),
                "Basket updated"
            );
        }
    });

    bus.on(names::VALIDATION_RESULT, |event| {
        if let Event::ValidationResult { scope, result } = event
            && !result.errors.is_empty()
        {
            debug!(scope = ?scope, errors = %result.messages().join(", "), "Form errors");
        }
    });

    bus.on(names::ORDER_READY, |event| {
        if let Event::OrderReady { order } = event {
            info!(items = order.items.len(), "Order ready to submit");
        }
    });

    bus.on(names::ORDER_FAILED, |event| {
        if let Event::OrderFailed { message } = event {
            error!(message = %message, "Order failed");
        }
    });

    bus.on(names::ORDER_RESET, |_| debug!("Order form reset"));
    bus.on(names::MODAL_CLOSE, |_| debug!("Modal closed"));
    bus.on(names::ORDER_OPEN, |_| debug!("Checkout opened"));
    bus.on(names::BASKET_OPEN, |_| debug!("Basket opened"));
}

#[cfg(test)]
mod tests {
    use web_larek_core::ProductId;

    use super::*;

    #[test]
    fn test_card_select_sets_preview() {
        let bus = EventBus::new();
        let state = AppState::new(bus.clone());
        attach(&bus, &state);

        bus.publish(&Event::CardSelect {
            id: ProductId::new("missing"),
        });
        assert!(state.preview().is_none());
    }

    #[test]
    fn test_basket_render_reads_state_inside_publish() {
        let bus = EventBus::new();
        let state = AppState::new(bus.clone());
        attach(&bus, &state);

        // The basket handler calls back into the state while it publishes.
        state.clear_basket();
        bus.publish(&Event::ModalClose);
        assert!(state.basket_ids().is_empty());
    }
}
