//! Integration tests for overlapping async operations.
//!
//! Order submission is single-flight; catalog loads are not.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use web_larek_core::{OrderField, ProductId};
use web_larek_integration_tests::{FakeApi, Harness, product};
use web_larek_storefront::CheckoutError;
use web_larek_storefront::events::names;

async fn ready_order() -> Harness {
    let h = Harness::new(FakeApi::with_catalog(vec![product("p1", Some(500))]));
    h.checkout.load_catalog().await.unwrap();

    let state = h.state();
    state.add_to_basket(&ProductId::new("p1"));
    state.set_order_field(OrderField::Payment, "cash");
    state.set_order_field(OrderField::Address, "ул. Пушкина, д. 1");
    state.set_order_field(OrderField::Email, "buyer@example.com");
    state.set_order_field(OrderField::Phone, "+79991234567");
    h
}

#[tokio::test]
async fn test_concurrent_catalog_loads_both_reach_api() {
    let h = Harness::new(FakeApi::with_catalog(vec![product("p1", Some(500))]));

    let (first, second) = tokio::join!(h.checkout.load_catalog(), h.checkout.load_catalog());
    assert_eq!(first.unwrap(), 1);
    assert_eq!(second.unwrap(), 1);
    assert_eq!(h.api.list_calls(), 2);
    assert_eq!(h.events.named(names::ITEMS_CHANGED).len(), 2);
}

#[tokio::test]
async fn test_second_submission_rejected_while_first_in_flight() {
    let h = ready_order().await;
    let gate = h.api.hold_orders();

    let (first, second) = tokio::join!(h.checkout.submit_order(), async {
        // The first submission is parked on the gate by now.
        let second = h.checkout.submit_order().await;
        gate.notify_one();
        second
    });

    assert!(matches!(second, Err(CheckoutError::SubmissionInFlight)));
    assert_eq!(first.unwrap().total, Decimal::from(500));
    assert_eq!(h.api.orders().len(), 1);
    assert_eq!(h.events.named(names::ORDER_SUBMITTED).len(), 1);
}

#[tokio::test]
async fn test_guard_released_after_submission() {
    let h = ready_order().await;
    h.checkout.submit_order().await.unwrap();

    // The basket was cleared by the first order, so the next attempt fails
    // validation rather than the in-flight check.
    let err = h.checkout.submit_order().await.unwrap_err();
    assert!(!matches!(err, CheckoutError::SubmissionInFlight));
}

#[tokio::test]
async fn test_guard_released_after_failed_validation() {
    let h = Harness::new(FakeApi::with_catalog(vec![product("p1", Some(500))]));
    h.checkout.load_catalog().await.unwrap();

    let err = h.checkout.submit_order().await.unwrap_err();
    assert!(matches!(err, CheckoutError::IncompleteOrder(_)));
    let err = h.checkout.submit_order().await.unwrap_err();
    assert!(matches!(err, CheckoutError::IncompleteOrder(_)));
}

#[tokio::test]
async fn test_clones_share_the_guard() {
    let h = ready_order().await;
    let gate = h.api.hold_orders();
    let other = h.checkout.clone();

    let (first, second) = tokio::join!(h.checkout.submit_order(), async {
        let second = other.submit_order().await;
        gate.notify_one();
        second
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(CheckoutError::SubmissionInFlight)));
}
