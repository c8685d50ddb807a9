//! Checkout form controllers.
//!
//! Checkout has two steps, each owning two fields:
//!
//! - [`AddressForm`] - payment method and delivery address
//! - [`ContactForm`] - email and phone
//!
//! A controller validates on every field change and publishes
//! [`Event::ValidationResult`] for its own scope. It publishes its submit
//! event only when its fields validate. Neither controller ever looks at the
//! other step's fields, and both use the rules in
//! [`web_larek_core::validation`].

mod address;
mod contact;

pub use address::AddressForm;
pub use contact::ContactForm;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_larek_core::{Order, Payment, ValidationResult, ValidationScope, validate_scope};

use crate::events::{Event, EventBus, Merge};

/// Snapshot of the address step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub payment: Option<Payment>,
    pub address: String,
}

/// Snapshot of the contact step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub email: String,
    pub phone: String,
}

/// A submit was attempted while the form's fields fail validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("form is invalid: {}", .0.messages().join(", "))]
pub struct InvalidForm(pub ValidationResult);

/// Everything a view needs to render a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormState<F> {
    #[serde(flatten)]
    pub fields: F,
    pub valid: bool,
    pub errors: Vec<&'static str>,
}

/// The fields of one checkout step.
trait StepFields: Clone + Default + Into<Event> {
    const SCOPE: ValidationScope;

    /// An order holding only this step's fields.
    fn to_order(&self) -> Order;
}

impl StepFields for AddressFields {
    const SCOPE: ValidationScope = ValidationScope::Address;

    fn to_order(&self) -> Order {
        Order {
            payment: self.payment,
            address: self.address.clone(),
            ..Order::default()
        }
    }
}

impl StepFields for ContactFields {
    const SCOPE: ValidationScope = ValidationScope::Contact;

    fn to_order(&self) -> Order {
        Order {
            email: self.email.clone(),
            phone: self.phone.clone(),
            ..Order::default()
        }
    }
}

impl Merge for AddressFields {
    fn merge(self, payload: Self) -> Self {
        Self {
            payment: payload.payment.or(self.payment),
            address: non_empty_or(payload.address, self.address),
        }
    }
}

impl Merge for ContactFields {
    fn merge(self, payload: Self) -> Self {
        Self {
            email: non_empty_or(payload.email, self.email),
            phone: non_empty_or(payload.phone, self.phone),
        }
    }
}

impl From<AddressFields> for Event {
    fn from(fields: AddressFields) -> Self {
        Self::OrderAddressSubmit(fields)
    }
}

impl From<ContactFields> for Event {
    fn from(fields: ContactFields) -> Self {
        Self::OrderContactSubmit(fields)
    }
}

fn non_empty_or(value: String, fallback: String) -> String {
    if value.is_empty() { fallback } else { value }
}

/// Shared controller logic, parameterised by the step's fields.
#[derive(Debug)]
struct FormCore<F> {
    bus: EventBus,
    fields: F,
    last: ValidationResult,
}

impl<F: StepFields> FormCore<F> {
    fn new(bus: EventBus) -> Self {
        Self {
            bus,
            fields: F::default(),
            last: ValidationResult::pending(),
        }
    }

    fn validate(&mut self) -> &ValidationResult {
        self.last = validate_scope(&self.fields.to_order(), F::SCOPE);
        self.bus.publish(&Event::ValidationResult {
            scope: F::SCOPE,
            result: self.last.clone(),
        });
        &self.last
    }

    fn is_valid(&self) -> bool {
        validate_scope(&self.fields.to_order(), F::SCOPE).valid
    }

    fn state(&self) -> FormState<F> {
        FormState {
            fields: self.fields.clone(),
            valid: self.is_valid(),
            errors: self.last.messages(),
        }
    }

    fn errors(&self) -> String {
        self.last.messages().join(", ")
    }

    fn submit(&mut self) -> Result<F, InvalidForm> {
        if !self.validate().valid {
            return Err(InvalidForm(self.last.clone()));
        }

        let snapshot = self.fields.clone();
        self.bus.publish(&snapshot.clone().into());
        Ok(snapshot)
    }

    fn reset(&mut self) {
        self.fields = F::default();
        self.last = ValidationResult::pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_merge_keeps_defaults_for_unset_fields() {
        let defaults = AddressFields {
            payment: Some(Payment::Cash),
            address: "Default St".to_string(),
        };
        let merged = defaults.merge(AddressFields {
            payment: None,
            address: "Main St 1".to_string(),
        });

        assert_eq!(merged.payment, Some(Payment::Cash));
        assert_eq!(merged.address, "Main St 1");
    }

    #[test]
    fn test_contact_merge_payload_wins() {
        let defaults = ContactFields {
            email: "old@b.com".to_string(),
            phone: "+79990000000".to_string(),
        };
        let merged = defaults.merge(ContactFields {
            email: "a@b.com".to_string(),
            phone: String::new(),
        });

        assert_eq!(merged.email, "a@b.com");
        assert_eq!(merged.phone, "+79990000000");
    }

    #[test]
    fn test_invalid_form_display_joins_messages() {
        let result = validate_scope(&ContactFields::default().to_order(), ValidationScope::Contact);
        let err = InvalidForm(result);
        assert_eq!(
            err.to_string(),
            "form is invalid: Email не может быть пустым, Телефон не может быть пустым"
        );
    }
}
