//! Order types: the in-progress draft, the wire request and the API result.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId};
use crate::validation::{self, ValidationScope};

/// Errors that can occur when parsing a [`Payment`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid payment method: {0}")]
pub struct PaymentError(pub String);

/// Payment method chosen on the address step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payment {
    /// Pay online by card.
    Card,
    /// Pay in cash on delivery.
    Cash,
}

impl Payment {
    /// Wire name of the payment method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
        }
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Payment {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "card" => Ok(Self::Card),
            "cash" => Ok(Self::Cash),
            other => Err(PaymentError(other.to_owned())),
        }
    }
}

/// A field of the order, used both for writes and for keying form errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderField {
    Payment,
    Address,
    Email,
    Phone,
    /// The basket contents. Never written directly; it follows the basket.
    Items,
}

impl OrderField {
    /// Field name as used on the wire and in error maps.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Address => "address",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Items => "items",
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The order being assembled across the checkout steps.
///
/// `items` mirrors the basket at the moment the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Order {
    /// Selected payment method, if any.
    pub payment: Option<Payment>,
    /// Delivery address.
    pub address: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Product ids in basket order.
    pub items: Vec<ProductId>,
}

impl Order {
    /// Where this order is in the checkout lifecycle.
    ///
    /// Derived from the current field values on every call; nothing is
    /// stored, so the stage can never go stale.
    #[must_use]
    pub fn stage(&self) -> OrderStage {
        let address_set = validation::validate_scope(self, ValidationScope::Address).valid;
        let contact_set = validation::validate_scope(self, ValidationScope::Contact).valid;

        match (address_set, contact_set) {
            (true, true) if validation::validate_items(&self.items).is_ok() => OrderStage::Ready,
            (true, true) => OrderStage::ContactSet,
            (true, false) => OrderStage::AddressSet,
            _ => OrderStage::Empty,
        }
    }
}

/// Checkout lifecycle: `Empty → AddressSet → ContactSet → Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStage {
    /// Address step not yet valid.
    Empty,
    /// Payment and address are valid.
    AddressSet,
    /// Contact details are valid too, but the basket is empty.
    ContactSet,
    /// Everything validates; the order may be submitted.
    Ready,
}

/// Body of `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub payment: Payment,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub items: Vec<ProductId>,
    /// Locally computed basket total; the server rejects a mismatch.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Successful response of `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    /// Server-assigned order id.
    pub id: OrderId,
    /// Total charged.
    pub total: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled_order() -> Order {
        Order {
            payment: Some(Payment::Card),
            address: "Main St 1".to_string(),
            email: "a@b.com".to_string(),
            phone: "+79998887766".to_string(),
            items: vec![ProductId::new("p1")],
        }
    }

    #[test]
    fn test_payment_from_str() {
        assert_eq!("card".parse::<Payment>().unwrap(), Payment::Card);
        assert_eq!(" cash ".parse::<Payment>().unwrap(), Payment::Cash);
        assert_eq!(
            "online".parse::<Payment>(),
            Err(PaymentError("online".to_string()))
        );
    }

    #[test]
    fn test_stage_progression() {
        assert_eq!(Order::default().stage(), OrderStage::Empty);

        let mut order = Order {
            payment: Some(Payment::Cash),
            address: "Main St 1".to_string(),
            ..Order::default()
        };
        assert_eq!(order.stage(), OrderStage::AddressSet);

        order.email = "a@b.com".to_string();
        order.phone = "+79998887766".to_string();
        assert_eq!(order.stage(), OrderStage::ContactSet);

        order.items.push(ProductId::new("p1"));
        assert_eq!(order.stage(), OrderStage::Ready);
    }

    #[test]
    fn test_stage_drops_back_when_a_field_breaks() {
        let mut order = filled_order();
        order.phone = "12345".to_string();
        assert_eq!(order.stage(), OrderStage::AddressSet);
    }

    #[test]
    fn test_order_request_wire_format() {
        let order = filled_order();
        let request = OrderRequest {
            payment: order.payment.unwrap(),
            address: order.address,
            email: order.email,
            phone: order.phone,
            items: order.items,
            total: Decimal::from(500),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "payment": "card",
                "address": "Main St 1",
                "email": "a@b.com",
                "phone": "+79998887766",
                "items": ["p1"],
                "total": 500.0
            })
        );
    }

    #[test]
    fn test_order_result_from_api() {
        let result: OrderResult =
            serde_json::from_str(r#"{"id": "28c57cb4-3002-4445-8aa1-2a06a5055ae5", "total": 2200}"#)
                .unwrap();
        assert_eq!(result.id.as_str(), "28c57cb4-3002-4445-8aa1-2a06a5055ae5");
        assert_eq!(result.total, Decimal::from(2200));
    }
}
