//! Core types for Web Larek.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod email;
pub mod id;
pub mod order;
pub mod phone;
pub mod price;
pub mod product;

pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, OrderField, OrderRequest, OrderResult, OrderStage, Payment, PaymentError};
pub use phone::{Phone, PhoneError};
pub use price::Price;
pub use product::{Category, Product};
