//! Address step: payment method and delivery address.

use web_larek_core::{Payment, ValidationResult};

use super::{AddressFields, FormCore, FormState, InvalidForm};
use crate::events::EventBus;

/// Controller for the first checkout step.
#[derive(Debug)]
pub struct AddressForm {
    core: FormCore<AddressFields>,
}

impl AddressForm {
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self {
            core: FormCore::new(bus),
        }
    }

    /// Select a payment method. Selecting one deselects the other.
    ///
    /// Reselecting the current method changes nothing, publishes nothing and
    /// returns `false`.
    pub fn select_payment(&mut self, payment: Payment) -> bool {
        if self.core.fields.payment == Some(payment) {
            return false;
        }

        tracing::debug!(payment = %payment, "Payment method selected");
        self.core.fields.payment = Some(payment);
        self.core.validate();
        true
    }

    /// Update the address and revalidate.
    pub fn set_address(&mut self, address: impl Into<String>) -> &ValidationResult {
        self.core.fields.address = address.into();
        self.core.validate()
    }

    #[must_use]
    pub const fn payment(&self) -> Option<Payment> {
        self.core.fields.payment
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.core.fields.address
    }

    #[must_use]
    pub fn state(&self) -> FormState<AddressFields> {
        self.core.state()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.core.is_valid()
    }

    /// Current error messages joined for display.
    #[must_use]
    pub fn errors(&self) -> String {
        self.core.errors()
    }

    /// Publish `orderAddress:submit` with the current fields.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidForm`] (and publishes nothing but the validation
    /// result) when payment or address fail.
    pub fn submit(&mut self) -> Result<AddressFields, InvalidForm> {
        self.core.submit()
    }

    /// Clear both fields and any shown errors.
    pub fn reset(&mut self) {
        self.core.reset();
    }
}
