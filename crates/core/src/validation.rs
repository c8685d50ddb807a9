//! Checkout field validation.
//!
//! Every rule for payment, address, email, phone and basket contents lives
//! here. The application state and both form controllers call these same
//! functions, so a field can never be valid in one place and invalid in
//! another.
//!
//! An empty field always yields [`ErrorCode::Required`]; a format error is
//! only ever reported for non-empty input.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Email, EmailError, Order, OrderField, Payment, Phone, PhoneError, ProductId};

const PAYMENT_REQUIRED: &str = "Выберите способ оплаты";
const ADDRESS_REQUIRED: &str = "Необходимо указать адрес";
const EMAIL_REQUIRED: &str = "Email не может быть пустым";
const EMAIL_INVALID: &str = "Некорректный формат Email";
const PHONE_REQUIRED: &str = "Телефон не может быть пустым";
const PHONE_INVALID: &str = "Некорректный формат телефона";
const ITEMS_REQUIRED: &str = "Корзина пуста";

/// Why a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The field is empty.
    Required,
    /// The field has a value of the wrong shape.
    InvalidFormat,
}

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: OrderField,
    pub code: ErrorCode,
    /// Message shown next to the form.
    pub message: &'static str,
}

impl FieldError {
    const fn required(field: OrderField, message: &'static str) -> Self {
        Self {
            field,
            code: ErrorCode::Required,
            message,
        }
    }

    const fn invalid(field: OrderField, message: &'static str) -> Self {
        Self {
            field,
            code: ErrorCode::InvalidFormat,
            message,
        }
    }
}

/// Which group of fields a validation pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationScope {
    /// Payment and address (first checkout step).
    Address,
    /// Email and phone (second checkout step).
    Contact,
    /// Every field plus a non-empty basket.
    Order,
}

impl ValidationScope {
    /// Fields checked in this scope, in display order.
    #[must_use]
    pub const fn fields(&self) -> &'static [OrderField] {
        match self {
            Self::Address => &[OrderField::Payment, OrderField::Address],
            Self::Contact => &[OrderField::Email, OrderField::Phone],
            Self::Order => &[
                OrderField::Payment,
                OrderField::Address,
                OrderField::Email,
                OrderField::Phone,
                OrderField::Items,
            ],
        }
    }
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Build a result from the collected errors.
    #[must_use]
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Result for a form nobody has typed into yet: not valid, nothing to
    /// show.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            valid: false,
            errors: Vec::new(),
        }
    }

    /// Messages in field order.
    #[must_use]
    pub fn messages(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.message).collect()
    }

    /// The error for `field`, if it failed.
    #[must_use]
    pub fn error_for(&self, field: OrderField) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

/// Current per-field failures, keyed by field.
///
/// Rebuilt from scratch on every validation pass. A key is present only
/// while that field fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<OrderField, FieldError>);

impl FormErrors {
    /// Whether no field currently fails.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The failure for `field`, if any.
    #[must_use]
    pub fn get(&self, field: OrderField) -> Option<&FieldError> {
        self.0.get(&field)
    }

    /// The message for `field`, if it fails.
    #[must_use]
    pub fn message(&self, field: OrderField) -> Option<&'static str> {
        self.0.get(&field).map(|e| e.message)
    }
}

impl From<&ValidationResult> for FormErrors {
    fn from(result: &ValidationResult) -> Self {
        Self(
            result
                .errors
                .iter()
                .map(|e| (e.field, e.clone()))
                .collect(),
        )
    }
}

/// A payment method must be chosen.
///
/// # Errors
///
/// Returns a `required` error when no method is selected.
pub const fn validate_payment(payment: Option<Payment>) -> Result<Payment, FieldError> {
    match payment {
        Some(payment) => Ok(payment),
        None => Err(FieldError::required(OrderField::Payment, PAYMENT_REQUIRED)),
    }
}

/// The address must be non-blank. Returns the trimmed address.
///
/// # Errors
///
/// Returns a `required` error for blank input.
pub fn validate_address(address: &str) -> Result<&str, FieldError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(FieldError::required(OrderField::Address, ADDRESS_REQUIRED));
    }
    Ok(address)
}

/// The email must be `local@domain.tld`.
///
/// # Errors
///
/// Returns `required` for blank input, `invalid_format` otherwise.
pub fn validate_email(email: &str) -> Result<Email, FieldError> {
    Email::parse(email).map_err(|e| match e {
        EmailError::Empty => FieldError::required(OrderField::Email, EMAIL_REQUIRED),
        EmailError::TooLong { .. } | EmailError::InvalidFormat => {
            FieldError::invalid(OrderField::Email, EMAIL_INVALID)
        }
    })
}

/// The phone must be a `+7`/`8` prefixed ten-digit number.
///
/// # Errors
///
/// Returns `required` for blank input, `invalid_format` otherwise.
pub fn validate_phone(phone: &str) -> Result<Phone, FieldError> {
    Phone::parse(phone).map_err(|e| match e {
        PhoneError::Empty => FieldError::required(OrderField::Phone, PHONE_REQUIRED),
        PhoneError::InvalidFormat => FieldError::invalid(OrderField::Phone, PHONE_INVALID),
    })
}

/// The basket must not be empty.
///
/// # Errors
///
/// Returns a `required` error for an empty basket.
pub const fn validate_items(items: &[ProductId]) -> Result<(), FieldError> {
    if items.is_empty() {
        return Err(FieldError::required(OrderField::Items, ITEMS_REQUIRED));
    }
    Ok(())
}

/// Validate every field of `order` that belongs to `scope`.
#[must_use]
pub fn validate_scope(order: &Order, scope: ValidationScope) -> ValidationResult {
    let errors = scope
        .fields()
        .iter()
        .filter_map(|field| match field {
            OrderField::Payment => validate_payment(order.payment).err(),
            OrderField::Address => validate_address(&order.address).err(),
            OrderField::Email => validate_email(&order.email).err(),
            OrderField::Phone => validate_phone(&order.phone).err(),
            OrderField::Items => validate_items(&order.items).err(),
        })
        .collect();

    ValidationResult::from_errors(errors)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_report_required_not_format() {
        assert_eq!(validate_email("").unwrap_err().code, ErrorCode::Required);
        assert_eq!(validate_phone("  ").unwrap_err().code, ErrorCode::Required);
        assert_eq!(validate_address("\t").unwrap_err().code, ErrorCode::Required);
        assert_eq!(validate_payment(None).unwrap_err().code, ErrorCode::Required);
    }

    #[test]
    fn test_malformed_phone_and_empty_phone_are_distinguishable() {
        let malformed = validate_phone("12345").unwrap_err();
        let empty = validate_phone("").unwrap_err();

        assert_eq!(malformed.code, ErrorCode::InvalidFormat);
        assert_eq!(malformed.message, "Некорректный формат телефона");
        assert_eq!(empty.code, ErrorCode::Required);
        assert_eq!(empty.message, "Телефон не может быть пустым");
        assert_ne!(malformed.message, empty.message);
    }

    #[test]
    fn test_validate_address_trims() {
        assert_eq!(validate_address("  Main St 1 ").unwrap(), "Main St 1");
    }

    #[test]
    fn test_contact_scope_ignores_address_fields() {
        let order = Order {
            email: "a@b.com".to_string(),
            phone: "+79998887766".to_string(),
            ..Order::default()
        };

        let result = validate_scope(&order, ValidationScope::Contact);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_order_scope_reports_every_field_in_order() {
        let result = validate_scope(&Order::default(), ValidationScope::Order);
        let fields: Vec<_> = result.errors.iter().map(|e| e.field).collect();

        assert!(!result.valid);
        assert_eq!(
            fields,
            vec![
                OrderField::Payment,
                OrderField::Address,
                OrderField::Email,
                OrderField::Phone,
                OrderField::Items,
            ]
        );
    }

    #[test]
    fn test_form_errors_from_result() {
        let order = Order {
            email: "bad".to_string(),
            ..Order::default()
        };
        let result = validate_scope(&order, ValidationScope::Contact);
        let errors = FormErrors::from(&result);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.message(OrderField::Email), Some("Некорректный формат Email"));
        assert_eq!(
            errors.get(OrderField::Phone).map(|e| e.code),
            Some(ErrorCode::Required)
        );
        assert!(errors.get(OrderField::Address).is_none());
    }

    #[test]
    fn test_validation_result_serializes_codes() {
        let result = ValidationResult::from_errors(vec![validate_phone("1").unwrap_err()]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["field"], "phone");
        assert_eq!(json["errors"][0]["code"], "invalid_format");
    }
}
