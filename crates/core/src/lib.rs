//! Web Larek Core - Shared types library.
//!
//! This crate provides the domain types used across all Web Larek components:
//! - `storefront` - Event bus, application state, checkout forms and API client
//! - `cli` - Command-line bootstrap that wires the storefront together
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no event bus. This keeps it lightweight and lets the same rules
//! run in the state layer and in every form controller.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, products, prices, orders, emails and phones
//! - [`validation`] - The single source of truth for checkout field rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{
    ErrorCode, FieldError, FormErrors, ValidationResult, ValidationScope, validate_address,
    validate_email, validate_items, validate_payment, validate_phone, validate_scope,
};
