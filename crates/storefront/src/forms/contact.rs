//! Contact step: email and phone.

use web_larek_core::ValidationResult;

use super::{ContactFields, FormCore, FormState, InvalidForm};
use crate::events::EventBus;

/// Controller for the second checkout step.
#[derive(Debug)]
pub struct ContactForm {
    core: FormCore<ContactFields>,
}

impl ContactForm {
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self {
            core: FormCore::new(bus),
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> &ValidationResult {
        self.core.fields.email = email.into();
        self.core.validate()
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) -> &ValidationResult {
        self.core.fields.phone = phone.into();
        self.core.validate()
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.core.fields.email
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.core.fields.phone
    }

    #[must_use]
    pub fn state(&self) -> FormState<ContactFields> {
        self.core.state()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.core.is_valid()
    }

    #[must_use]
    pub fn errors(&self) -> String {
        self.core.errors()
    }

    /// Publish `orderContact:submit` with the current fields.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidForm`] when email or phone fail.
    pub fn submit(&mut self) -> Result<ContactFields, InvalidForm> {
        self.core.submit()
    }

    pub fn reset(&mut self) {
        self.core.reset();
    }
}
